//! Appointment Service
//!
//! Booking, listing, cancelling and rescheduling of appointments, plus the
//! slot board shown while booking.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::services::{Access, ClinicSchedule, OwnershipService, SlotBoard};
use crate::domain::{
    Appointment, AppointmentDetails, AppointmentRepository, AppointmentStatus, ClinicService,
    ClinicServiceRepository, Pet, PetRepository,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::i18n::Locale;
use crate::shared::validation::{field_error, invalid_fields};

/// Appointment service trait
#[async_trait]
pub trait AppointmentService: Send + Sync {
    /// Services that can currently be booked
    async fn active_services(&self) -> Result<Vec<ClinicService>, AppointmentError>;

    /// Choices for the booking form
    async fn booking_view(&self, owner_id: i64, today: NaiveDate)
        -> Result<BookingView, AppointmentError>;

    /// Every slot of `date` flagged free or taken
    async fn slot_board(
        &self,
        date: NaiveDate,
        service_id: Option<i64>,
    ) -> Result<SlotBoard, AppointmentError>;

    async fn book(
        &self,
        owner_id: i64,
        input: BookingInput,
        today: NaiveDate,
    ) -> Result<Appointment, AppointmentError>;

    /// The owner's appointments and pets
    async fn my_appointments(
        &self,
        owner_id: i64,
    ) -> Result<(Vec<AppointmentDetails>, Vec<Pet>), AppointmentError>;

    /// Scheduled to Cancelled
    async fn cancel(&self, owner_id: i64, id: i64) -> Result<(), AppointmentError>;

    /// A scheduled appointment together with the booking choices
    async fn edit_view(
        &self,
        owner_id: i64,
        id: i64,
        today: NaiveDate,
    ) -> Result<(AppointmentDetails, BookingView), AppointmentError>;

    /// Move a scheduled appointment to another pet, service or slot
    async fn reschedule(
        &self,
        owner_id: i64,
        id: i64,
        input: BookingInput,
        today: NaiveDate,
    ) -> Result<Appointment, AppointmentError>;
}

/// Booking form choices
#[derive(Debug, Clone)]
pub struct BookingView {
    pub pets: Vec<Pet>,
    pub services: Vec<ClinicService>,
    pub dates: Vec<NaiveDate>,
}

/// Selected date, slot, pet and service
#[derive(Debug, Clone)]
pub struct BookingInput {
    pub date: NaiveDate,
    /// `HH:MM`
    pub time: String,
    pub pet_id: i64,
    pub service_id: i64,
}

/// Appointment service errors
#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment belongs to another user")]
    Forbidden,

    #[error("Appointment is no longer scheduled")]
    NotEditable,

    #[error("Pet not found")]
    PetNotFound,

    #[error("Pet belongs to another user")]
    PetForbidden,

    #[error("Service not found or inactive")]
    ServiceNotFound,

    #[error("Time is not a clinic slot")]
    SlotInvalid,

    #[error("Slot already taken")]
    SlotTaken,

    #[error("Date outside the booking window")]
    DateOutOfRange,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for AppointmentError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Conflict(_) => AppointmentError::SlotTaken,
            e => AppointmentError::Internal(e.to_string()),
        }
    }
}

impl AppointmentError {
    /// Convert into a localized HTTP error.
    pub fn localized(self, locale: Locale) -> AppError {
        let field = |name: &str, key: &str| invalid_fields(vec![field_error(name, key, locale)], locale);

        match self {
            AppointmentError::NotFound => {
                AppError::NotFound(locale.t("error.appointment.notFound").into())
            }
            AppointmentError::Forbidden => {
                AppError::Forbidden(locale.t("error.appointment.forbidden").into())
            }
            AppointmentError::NotEditable => {
                AppError::Conflict(locale.t("error.appointment.notEditable").into())
            }
            AppointmentError::PetNotFound => field("pet_id", "error.pet.notFound"),
            AppointmentError::PetForbidden => {
                AppError::Forbidden(locale.t("error.pet.forbidden").into())
            }
            AppointmentError::ServiceNotFound => field("service_id", "error.service.notFound"),
            AppointmentError::SlotInvalid => field("time", "error.appointment.slotInvalid"),
            AppointmentError::DateOutOfRange => field("date", "error.appointment.dateOutOfRange"),
            AppointmentError::SlotTaken => {
                AppError::Conflict(locale.t("error.appointment.slotTaken").into())
            }
            AppointmentError::Internal(detail) => AppError::Unexpected {
                message: locale.t("error.unexpected").into(),
                detail,
            },
        }
    }
}

/// AppointmentService implementation
pub struct AppointmentServiceImpl<A, P, C>
where
    A: AppointmentRepository,
    P: PetRepository,
    C: ClinicServiceRepository,
{
    appointment_repo: Arc<A>,
    pet_repo: Arc<P>,
    service_repo: Arc<C>,
}

impl<A, P, C> AppointmentServiceImpl<A, P, C>
where
    A: AppointmentRepository,
    P: PetRepository,
    C: ClinicServiceRepository,
{
    pub fn new(appointment_repo: Arc<A>, pet_repo: Arc<P>, service_repo: Arc<C>) -> Self {
        Self {
            appointment_repo,
            pet_repo,
            service_repo,
        }
    }

    async fn owned_appointment(
        &self,
        owner_id: i64,
        id: i64,
    ) -> Result<AppointmentDetails, AppointmentError> {
        let details = self.appointment_repo.find_by_id(id).await?;

        match OwnershipService::appointment_access(details.as_ref(), owner_id) {
            Access::Granted => details.ok_or(AppointmentError::NotFound),
            Access::Denied => {
                tracing::warn!(appointment_id = id, user_id = owner_id, "Appointment access denied");
                Err(AppointmentError::Forbidden)
            }
            Access::Missing => Err(AppointmentError::NotFound),
        }
    }

    /// Run every booking rule and return the requested date-time.
    async fn check_booking(
        &self,
        owner_id: i64,
        input: &BookingInput,
        today: NaiveDate,
        except_id: Option<i64>,
    ) -> Result<NaiveDateTime, AppointmentError> {
        if !ClinicSchedule::is_within_booking_window(today, input.date) {
            return Err(AppointmentError::DateOutOfRange);
        }

        let time: NaiveTime = ClinicSchedule::parse_slot_time(&input.time)
            .filter(|t| ClinicSchedule::is_bookable_slot(*t))
            .ok_or(AppointmentError::SlotInvalid)?;

        let pet = self.pet_repo.find_by_id(input.pet_id).await?;
        match OwnershipService::pet_access(pet.as_ref(), owner_id) {
            Access::Granted => {}
            Access::Denied => return Err(AppointmentError::PetForbidden),
            Access::Missing => return Err(AppointmentError::PetNotFound),
        }

        match self.service_repo.find_by_id(input.service_id).await? {
            Some(service) if service.active => {}
            _ => return Err(AppointmentError::ServiceNotFound),
        }

        let booked = self
            .appointment_repo
            .booked_times(input.date, Some(input.service_id), except_id)
            .await?;
        if booked.contains(&time) {
            return Err(AppointmentError::SlotTaken);
        }

        Ok(input.date.and_time(time))
    }

    async fn load_booking_view(
        &self,
        owner_id: i64,
        today: NaiveDate,
    ) -> Result<BookingView, AppointmentError> {
        Ok(BookingView {
            pets: self.pet_repo.find_by_owner(owner_id).await?,
            services: self.service_repo.list_active().await?,
            dates: ClinicSchedule::booking_dates(today),
        })
    }
}

#[async_trait]
impl<A, P, C> AppointmentService for AppointmentServiceImpl<A, P, C>
where
    A: AppointmentRepository + 'static,
    P: PetRepository + 'static,
    C: ClinicServiceRepository + 'static,
{
    async fn active_services(&self) -> Result<Vec<ClinicService>, AppointmentError> {
        Ok(self.service_repo.list_active().await?)
    }

    async fn booking_view(
        &self,
        owner_id: i64,
        today: NaiveDate,
    ) -> Result<BookingView, AppointmentError> {
        self.load_booking_view(owner_id, today).await
    }

    async fn slot_board(
        &self,
        date: NaiveDate,
        service_id: Option<i64>,
    ) -> Result<SlotBoard, AppointmentError> {
        let booked = self
            .appointment_repo
            .booked_times(date, service_id, None)
            .await?;
        Ok(ClinicSchedule::slot_board(&booked))
    }

    async fn book(
        &self,
        owner_id: i64,
        input: BookingInput,
        today: NaiveDate,
    ) -> Result<Appointment, AppointmentError> {
        let scheduled_at = self.check_booking(owner_id, &input, today, None).await?;

        let appointment = Appointment::new(input.pet_id, input.service_id, scheduled_at);
        let created = self.appointment_repo.create(&appointment).await?;

        metrics::record_appointment_event("booked");
        tracing::info!(
            appointment_id = created.id,
            pet_id = created.pet_id,
            service_id = created.service_id,
            %scheduled_at,
            "Appointment booked"
        );
        Ok(created)
    }

    async fn my_appointments(
        &self,
        owner_id: i64,
    ) -> Result<(Vec<AppointmentDetails>, Vec<Pet>), AppointmentError> {
        let appointments = self.appointment_repo.find_by_owner(owner_id).await?;
        let pets = self.pet_repo.find_by_owner(owner_id).await?;
        Ok((appointments, pets))
    }

    async fn cancel(&self, owner_id: i64, id: i64) -> Result<(), AppointmentError> {
        let details = self.owned_appointment(owner_id, id).await?;
        let status = details.appointment.status;
        if !status.can_transition_to(AppointmentStatus::Cancelled) {
            return Err(AppointmentError::NotEditable);
        }

        let cancelled = self
            .appointment_repo
            .transition(id, status, AppointmentStatus::Cancelled)
            .await?;
        if !cancelled {
            return Err(AppointmentError::NotEditable);
        }

        metrics::record_appointment_event("cancelled");
        tracing::info!(appointment_id = id, owner_id, "Appointment cancelled");
        Ok(())
    }

    async fn edit_view(
        &self,
        owner_id: i64,
        id: i64,
        today: NaiveDate,
    ) -> Result<(AppointmentDetails, BookingView), AppointmentError> {
        let details = self.owned_appointment(owner_id, id).await?;
        if !details.appointment.is_editable() {
            return Err(AppointmentError::NotEditable);
        }

        let view = self.load_booking_view(owner_id, today).await?;
        Ok((details, view))
    }

    async fn reschedule(
        &self,
        owner_id: i64,
        id: i64,
        input: BookingInput,
        today: NaiveDate,
    ) -> Result<Appointment, AppointmentError> {
        let details = self.owned_appointment(owner_id, id).await?;
        if !details.appointment.is_editable() {
            return Err(AppointmentError::NotEditable);
        }

        let scheduled_at = self.check_booking(owner_id, &input, today, Some(id)).await?;

        let appointment = Appointment {
            pet_id: input.pet_id,
            service_id: input.service_id,
            scheduled_at,
            ..details.appointment
        };
        let updated = self
            .appointment_repo
            .update(&appointment)
            .await
            .map_err(|e| match e {
                // completed or cancelled since it was read
                AppError::NotFound(_) => AppointmentError::NotEditable,
                e => e.into(),
            })?;

        metrics::record_appointment_event("rescheduled");
        tracing::info!(appointment_id = id, %scheduled_at, "Appointment rescheduled");
        Ok(updated)
    }
}
