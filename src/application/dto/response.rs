//! Response DTOs
//!
//! Data structures for API response bodies.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::services::AuthTokens;
use crate::config::ClinicSettings;
use crate::domain::services::{SlotBoard, SLOT_TIME_FORMAT};
use crate::domain::{
    Appointment, AppointmentDetails, ClinicService, Pet, Role, User, BIRTH_DATE_FORMAT,
};

/// Authentication tokens response
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    /// Landing page for the user's role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
            redirect_to: None,
        }
    }
}

/// User response
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub registered_at: String,
    pub roles: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let roles = user.role_names();
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            registered_at: user.registered_at.to_rfc3339(),
            roles,
        }
    }
}

/// Registration result with a localized confirmation
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Admin user list
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Role choices for the admin user form
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleListResponse {
    pub roles: Vec<Role>,
}

/// Localized confirmation with the affected resource
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Localized confirmation without a resource
#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeResponse {
    pub message: String,
}

/// Pet response; birth date uses the form format `dd/mm/yyyy`
#[derive(Debug, Serialize, ToSchema)]
pub struct PetResponse {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub birth_date: String,
    pub sex: String,
    pub owner_id: i64,
}

impl From<Pet> for PetResponse {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id,
            name: pet.name,
            species: pet.species,
            breed: pet.breed,
            birth_date: pet.birth_date.format(BIRTH_DATE_FORMAT).to_string(),
            sex: pet.sex.as_str().to_string(),
            owner_id: pet.owner_id,
        }
    }
}

/// Pet with its appointment history
#[derive(Debug, Serialize, ToSchema)]
pub struct PetDetailResponse {
    pub pet: PetResponse,
    pub appointments: Vec<AppointmentResponse>,
}

/// Appointment response
#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: i64,
    pub pet_id: i64,
    pub pet_name: String,
    pub service_id: i64,
    pub service_name: String,
    pub date: NaiveDate,
    /// `HH:MM`
    pub time: String,
    pub status: String,
}

impl From<AppointmentDetails> for AppointmentResponse {
    fn from(details: AppointmentDetails) -> Self {
        let appointment = details.appointment;
        Self {
            id: appointment.id,
            pet_id: appointment.pet_id,
            pet_name: details.pet_name,
            service_id: appointment.service_id,
            service_name: details.service_name,
            date: appointment.date(),
            time: appointment.time().format(SLOT_TIME_FORMAT).to_string(),
            status: appointment.status.as_str().to_string(),
        }
    }
}

/// A freshly booked or rescheduled appointment
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduledAppointmentResponse {
    pub id: i64,
    pub pet_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub status: String,
}

impl From<Appointment> for ScheduledAppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            pet_id: appointment.pet_id,
            service_id: appointment.service_id,
            date: appointment.date(),
            time: appointment.time().format(SLOT_TIME_FORMAT).to_string(),
            status: appointment.status.as_str().to_string(),
        }
    }
}

/// Data for the booking form
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingViewResponse {
    pub pets: Vec<PetResponse>,
    pub services: Vec<ClinicService>,
    pub dates: Vec<NaiveDate>,
}

/// Data for the edit form: the appointment plus booking choices
#[derive(Debug, Serialize, ToSchema)]
pub struct EditAppointmentResponse {
    pub appointment: AppointmentResponse,
    #[serde(flatten)]
    pub booking: BookingViewResponse,
}

/// The caller's appointments and pets
#[derive(Debug, Serialize, ToSchema)]
pub struct MyAppointmentsResponse {
    pub appointments: Vec<AppointmentResponse>,
    pub pets: Vec<PetResponse>,
}

/// Slot board for one date
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotBoardResponse {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<i64>,
    #[serde(flatten)]
    pub board: SlotBoard,
}

/// Public clinic contact data
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClinicInfoResponse {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl From<&ClinicSettings> for ClinicInfoResponse {
    fn from(settings: &ClinicSettings) -> Self {
        Self {
            name: settings.name.clone(),
            address: settings.address.clone(),
            phone: settings.phone.clone(),
            email: settings.email.clone(),
        }
    }
}

/// Home page: clinic data and the active services
#[derive(Debug, Serialize, ToSchema)]
pub struct HomeResponse {
    pub clinic: ClinicInfoResponse,
    pub services: Vec<ClinicService>,
}
