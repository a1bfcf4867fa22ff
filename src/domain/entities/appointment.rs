//! Appointment entity and repository trait.
//!
//! Maps to the `citas` table in the database schema.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Appointment lifecycle state, stored as its Spanish label.
///
/// `Scheduled` moves to `Completed` once its time has passed, or to
/// `Cancelled` at the owner's request. Both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "Programada")]
    Scheduled,
    #[serde(rename = "Completada")]
    Completed,
    #[serde(rename = "Cancelada")]
    Cancelled,
}

impl AppointmentStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Programada" => Some(Self::Scheduled),
            "Completada" => Some(Self::Completed),
            "Cancelada" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Programada",
            Self::Completed => "Completada",
            Self::Cancelled => "Cancelada",
        }
    }

    /// Completed and cancelled appointments never change again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Scheduled)
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::Completed) | (Self::Scheduled, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A booked visit of one pet for one clinic service.
///
/// Maps to the `citas` table:
/// - id_cita: BIGSERIAL PRIMARY KEY
/// - id_mascota: BIGINT NOT NULL REFERENCES mascotas ON DELETE CASCADE
/// - id_servicio: BIGINT NOT NULL REFERENCES servicios
/// - fecha_hora: TIMESTAMP NOT NULL (clinic local time)
/// - estado: VARCHAR(20) NOT NULL DEFAULT 'Programada'
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub pet_id: i64,
    pub service_id: i64,
    pub scheduled_at: NaiveDateTime,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn new(pet_id: i64, service_id: i64, scheduled_at: NaiveDateTime) -> Self {
        Self {
            id: 0,
            pet_id,
            service_id,
            scheduled_at,
            status: AppointmentStatus::Scheduled,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.scheduled_at.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.scheduled_at.time()
    }

    /// Only scheduled appointments may be edited or cancelled.
    pub fn is_editable(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Appointment joined with the names shown in listings and the owner used
/// for access checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub pet_name: String,
    pub service_name: String,
    pub owner_id: i64,
}

/// Repository trait for Appointment data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<AppointmentDetails>, AppError>;

    /// Appointments of every pet owned by `owner_id`, newest first.
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<AppointmentDetails>, AppError>;

    /// Appointments of one pet, newest first.
    async fn find_by_pet(&self, pet_id: i64) -> Result<Vec<AppointmentDetails>, AppError>;

    /// Times already taken on `date` by non-cancelled appointments,
    /// optionally restricted to one service and ignoring one appointment.
    async fn booked_times(
        &self,
        date: NaiveDate,
        service_id: Option<i64>,
        except_id: Option<i64>,
    ) -> Result<Vec<NaiveTime>, AppError>;

    /// Insert an appointment. A taken slot yields `AppError::Conflict`.
    async fn create(&self, appointment: &Appointment) -> Result<Appointment, AppError>;

    /// Update pet, service and time of a scheduled appointment.
    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppError>;

    /// Move an appointment from `from` to `to`; returns false when it was no
    /// longer in `from`.
    async fn transition(
        &self,
        id: i64,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<bool, AppError>;

    /// Mark every scheduled appointment before `now` as completed and
    /// return how many changed.
    async fn complete_past(&self, now: NaiveDateTime) -> Result<u64, AppError>;
}
