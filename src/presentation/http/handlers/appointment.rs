//! Appointment Handlers
//!
//! Booking, listing, cancelling and rescheduling for the authenticated
//! owner. Dates are clinic-local.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;

use super::{appointment_service, today};
use crate::application::dto::request::{BookAppointmentRequest, SlotQuery};
use crate::application::dto::response::{
    AppointmentResponse, BookingViewResponse, EditAppointmentResponse, MessageResponse,
    MyAppointmentsResponse, NoticeResponse, PetResponse, ScheduledAppointmentResponse,
    SlotBoardResponse,
};
use crate::application::services::{AppointmentService, BookingInput, BookingView};
use crate::presentation::http::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::i18n::Locale;
use crate::startup::AppState;

impl From<BookAppointmentRequest> for BookingInput {
    fn from(body: BookAppointmentRequest) -> Self {
        Self {
            date: body.date,
            time: body.time,
            pet_id: body.pet_id,
            service_id: body.service_id,
        }
    }
}

impl From<BookingView> for BookingViewResponse {
    fn from(view: BookingView) -> Self {
        Self {
            pets: view.pets.into_iter().map(PetResponse::from).collect(),
            services: view.services,
            dates: view.dates,
        }
    }
}

/// Pets, active services and bookable dates
#[utoipa::path(
    get,
    path = "/citas/agendar",
    tag = "appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Booking choices", body = BookingViewResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn booking_view(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
) -> Result<Json<BookingViewResponse>, AppError> {
    let view = appointment_service(&state)
        .booking_view(auth.user_id, today())
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(BookingViewResponse::from(view)))
}

/// Free and taken slots of one day
#[utoipa::path(
    get,
    path = "/citas/horarios/{date}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(
        ("date" = NaiveDate, Path, description = "Day as `YYYY-MM-DD`"),
        SlotQuery
    ),
    responses(
        (status = 200, description = "Slot availability", body = SlotBoardResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn slot_board(
    State(state): State<AppState>,
    locale: Locale,
    ApiPath(date): ApiPath<NaiveDate>,
    ApiQuery(query): ApiQuery<SlotQuery>,
) -> Result<Json<SlotBoardResponse>, AppError> {
    let board = appointment_service(&state)
        .slot_board(date, query.service_id)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(SlotBoardResponse {
        date,
        service_id: query.service_id,
        board,
    }))
}

#[utoipa::path(
    post,
    path = "/citas/guardar",
    tag = "appointments",
    security(("bearer_auth" = [])),
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = MessageResponse<ScheduledAppointmentResponse>),
        (status = 400, description = "Invalid pet, service, date or slot", body = ErrorResponse),
        (status = 403, description = "Pet owned by another user", body = ErrorResponse),
        (status = 409, description = "Slot already taken", body = ErrorResponse)
    )
)]
pub async fn book(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
    ApiJson(body): ApiJson<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<MessageResponse<ScheduledAppointmentResponse>>), AppError> {
    let appointment = appointment_service(&state)
        .book(auth.user_id, body.into(), today())
        .await
        .map_err(|e| e.localized(locale))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: locale.t("success.appointment.booked").to_string(),
            data: Some(ScheduledAppointmentResponse::from(appointment)),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/citas/mis-citas",
    tag = "appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Appointments of the caller's pets", body = MyAppointmentsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn my_appointments(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
) -> Result<Json<MyAppointmentsResponse>, AppError> {
    let (appointments, pets) = appointment_service(&state)
        .my_appointments(auth.user_id)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(MyAppointmentsResponse {
        appointments: appointments
            .into_iter()
            .map(AppointmentResponse::from)
            .collect(),
        pets: pets.into_iter().map(PetResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/citas/cancelar/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment cancelled", body = NoticeResponse),
        (status = 403, description = "Appointment of another user", body = ErrorResponse),
        (status = 404, description = "Unknown appointment", body = ErrorResponse),
        (status = 409, description = "Appointment already completed or cancelled", body = ErrorResponse)
    )
)]
pub async fn cancel(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<NoticeResponse>, AppError> {
    appointment_service(&state)
        .cancel(auth.user_id, id)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(NoticeResponse {
        message: locale.t("success.appointment.cancelled").to_string(),
    }))
}

/// A scheduled appointment with the booking choices
#[utoipa::path(
    get,
    path = "/citas/editar/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment with booking choices", body = EditAppointmentResponse),
        (status = 403, description = "Appointment of another user", body = ErrorResponse),
        (status = 404, description = "Unknown appointment", body = ErrorResponse),
        (status = 409, description = "Appointment no longer scheduled", body = ErrorResponse)
    )
)]
pub async fn edit_view(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<EditAppointmentResponse>, AppError> {
    let (details, view) = appointment_service(&state)
        .edit_view(auth.user_id, id, today())
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(EditAppointmentResponse {
        appointment: AppointmentResponse::from(details),
        booking: BookingViewResponse::from(view),
    }))
}

#[utoipa::path(
    post,
    path = "/citas/actualizar/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = BookAppointmentRequest,
    responses(
        (status = 200, description = "Appointment rescheduled", body = MessageResponse<ScheduledAppointmentResponse>),
        (status = 400, description = "Invalid pet, service, date or slot", body = ErrorResponse),
        (status = 403, description = "Appointment or pet of another user", body = ErrorResponse),
        (status = 404, description = "Unknown appointment", body = ErrorResponse),
        (status = 409, description = "Slot taken or appointment no longer scheduled", body = ErrorResponse)
    )
)]
pub async fn reschedule(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<BookAppointmentRequest>,
) -> Result<Json<MessageResponse<ScheduledAppointmentResponse>>, AppError> {
    let appointment = appointment_service(&state)
        .reschedule(auth.user_id, id, body.into(), today())
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(MessageResponse {
        message: locale.t("success.appointment.updated").to_string(),
        data: Some(ScheduledAppointmentResponse::from(appointment)),
    }))
}
