//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints. Services are assembled per
//! request from the shared pool.

pub mod admin;
pub mod appointment;
pub mod auth;
pub mod health;
pub mod language;
pub mod pet;
pub mod public;

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::application::services::{
    AppointmentServiceImpl, AuthServiceImpl, PetServiceImpl, UserServiceImpl,
};
use crate::infrastructure::repositories::{
    PgAppointmentRepository, PgClinicServiceRepository, PgPetRepository, PgRoleRepository,
    PgSessionRepository, PgUserRepository,
};
use crate::startup::AppState;

/// Current date in clinic local time.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn auth_service(
    state: &AppState,
) -> AuthServiceImpl<PgUserRepository, PgRoleRepository, PgSessionRepository> {
    AuthServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgRoleRepository::new(state.db.clone())),
        Arc::new(PgSessionRepository::new(state.db.clone())),
        state.tokens.clone(),
        state.settings.jwt.refresh_token_expiry_days,
    )
}

fn user_service(state: &AppState) -> UserServiceImpl<PgUserRepository, PgRoleRepository> {
    UserServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgRoleRepository::new(state.db.clone())),
    )
}

fn pet_service(state: &AppState) -> PetServiceImpl<PgPetRepository, PgAppointmentRepository> {
    PetServiceImpl::new(
        Arc::new(PgPetRepository::new(state.db.clone())),
        Arc::new(PgAppointmentRepository::new(state.db.clone())),
    )
}

fn appointment_service(
    state: &AppState,
) -> AppointmentServiceImpl<PgAppointmentRepository, PgPetRepository, PgClinicServiceRepository> {
    AppointmentServiceImpl::new(
        Arc::new(PgAppointmentRepository::new(state.db.clone())),
        Arc::new(PgPetRepository::new(state.db.clone())),
        Arc::new(PgClinicServiceRepository::new(state.db.clone())),
    )
}
