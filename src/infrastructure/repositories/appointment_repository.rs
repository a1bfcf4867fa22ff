//! Appointment Repository Implementation
//!
//! PostgreSQL implementation of the AppointmentRepository trait.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::PgPool;

use crate::domain::{Appointment, AppointmentDetails, AppointmentRepository, AppointmentStatus};
use crate::shared::error::AppError;

/// Appointment columns joined with pet and service names.
const DETAILS_SELECT: &str = r#"
    SELECT c.id_cita AS id, c.id_mascota AS pet_id, c.id_servicio AS service_id,
           c.fecha_hora AS scheduled_at, c.estado AS status,
           m.nombre AS pet_name, s.nombre AS service_name, m.id_propietario AS owner_id
    FROM citas c
    JOIN mascotas m ON m.id_mascota = c.id_mascota
    JOIN servicios s ON s.id_servicio = c.id_servicio
"#;

#[derive(Debug, sqlx::FromRow)]
struct AppointmentRow {
    id: i64,
    pet_id: i64,
    service_id: i64,
    scheduled_at: NaiveDateTime,
    status: String,
}

impl AppointmentRow {
    fn into_appointment(self) -> Result<Appointment, AppError> {
        let status = AppointmentStatus::from_str(&self.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown appointment status '{}'", self.status))
        })?;

        Ok(Appointment {
            id: self.id,
            pet_id: self.pet_id,
            service_id: self.service_id,
            scheduled_at: self.scheduled_at,
            status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AppointmentDetailsRow {
    #[sqlx(flatten)]
    appointment: AppointmentRow,
    pet_name: String,
    service_name: String,
    owner_id: i64,
}

impl AppointmentDetailsRow {
    fn into_details(self) -> Result<AppointmentDetails, AppError> {
        Ok(AppointmentDetails {
            appointment: self.appointment.into_appointment()?,
            pet_name: self.pet_name,
            service_name: self.service_name,
            owner_id: self.owner_id,
        })
    }
}

/// A second live appointment on the same service and slot.
fn map_slot_conflict(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Appointment slot already taken".to_string())
        }
        _ => AppError::Database(e),
    }
}

/// PostgreSQL appointment repository implementation.
#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: PgPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<AppointmentDetails>, AppError> {
        let row = sqlx::query_as::<_, AppointmentDetailsRow>(&format!(
            "{DETAILS_SELECT} WHERE c.id_cita = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AppointmentDetailsRow::into_details).transpose()
    }

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<AppointmentDetails>, AppError> {
        let rows = sqlx::query_as::<_, AppointmentDetailsRow>(&format!(
            "{DETAILS_SELECT} WHERE m.id_propietario = $1 ORDER BY c.fecha_hora DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(AppointmentDetailsRow::into_details)
            .collect()
    }

    async fn find_by_pet(&self, pet_id: i64) -> Result<Vec<AppointmentDetails>, AppError> {
        let rows = sqlx::query_as::<_, AppointmentDetailsRow>(&format!(
            "{DETAILS_SELECT} WHERE c.id_mascota = $1 ORDER BY c.fecha_hora DESC"
        ))
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(AppointmentDetailsRow::into_details)
            .collect()
    }

    async fn booked_times(
        &self,
        date: NaiveDate,
        service_id: Option<i64>,
        except_id: Option<i64>,
    ) -> Result<Vec<NaiveTime>, AppError> {
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + Duration::days(1);

        let times = sqlx::query_scalar::<_, NaiveDateTime>(
            r#"
            SELECT fecha_hora
            FROM citas
            WHERE fecha_hora >= $1 AND fecha_hora < $2
              AND estado <> 'Cancelada'
              AND ($3::BIGINT IS NULL OR id_servicio = $3)
              AND ($4::BIGINT IS NULL OR id_cita <> $4)
            ORDER BY fecha_hora
            "#,
        )
        .bind(day_start)
        .bind(day_end)
        .bind(service_id)
        .bind(except_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(times.into_iter().map(|t| t.time()).collect())
    }

    async fn create(&self, appointment: &Appointment) -> Result<Appointment, AppError> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            r#"
            INSERT INTO citas (id_mascota, id_servicio, fecha_hora, estado)
            VALUES ($1, $2, $3, $4)
            RETURNING id_cita AS id, id_mascota AS pet_id, id_servicio AS service_id,
                      fecha_hora AS scheduled_at, estado AS status
            "#,
        )
        .bind(appointment.pet_id)
        .bind(appointment.service_id)
        .bind(appointment.scheduled_at)
        .bind(appointment.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_slot_conflict)?;

        row.into_appointment()
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppError> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            r#"
            UPDATE citas
            SET id_mascota = $2,
                id_servicio = $3,
                fecha_hora = $4
            WHERE id_cita = $1 AND estado = 'Programada'
            RETURNING id_cita AS id, id_mascota AS pet_id, id_servicio AS service_id,
                      fecha_hora AS scheduled_at, estado AS status
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.pet_id)
        .bind(appointment.service_id)
        .bind(appointment.scheduled_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_slot_conflict)?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Scheduled appointment with id {} not found",
                appointment.id
            ))
        })?;

        row.into_appointment()
    }

    async fn transition(
        &self,
        id: i64,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<bool, AppError> {
        if !from.can_transition_to(to) {
            return Ok(false);
        }

        let result = sqlx::query("UPDATE citas SET estado = $3 WHERE id_cita = $1 AND estado = $2")
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn complete_past(&self, now: NaiveDateTime) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE citas
            SET estado = $3
            WHERE estado = $2 AND fecha_hora < $1
            "#,
        )
        .bind(now)
        .bind(AppointmentStatus::Scheduled.as_str())
        .bind(AppointmentStatus::Completed.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
