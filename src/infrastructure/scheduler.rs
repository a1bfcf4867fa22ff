//! Appointment Housekeeping
//!
//! Background task that marks past scheduled appointments as completed and
//! purges dead refresh-token sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::{AppointmentRepository, SessionRepository};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Periodic completion job.
pub struct CompletionJob<A, S>
where
    A: AppointmentRepository,
    S: SessionRepository,
{
    appointment_repo: Arc<A>,
    session_repo: Arc<S>,
}

impl<A, S> CompletionJob<A, S>
where
    A: AppointmentRepository + 'static,
    S: SessionRepository + 'static,
{
    pub fn new(appointment_repo: Arc<A>, session_repo: Arc<S>) -> Self {
        Self {
            appointment_repo,
            session_repo,
        }
    }

    /// Complete every scheduled appointment before `now`.
    pub async fn complete_past_appointments(&self, now: NaiveDateTime) -> Result<u64, AppError> {
        tracing::info!(%now, "Updating past appointments");

        let updated = self.appointment_repo.complete_past(now).await?;
        metrics::record_completed_appointments(updated);

        tracing::info!(updated, "Past appointments marked as completed");
        Ok(updated)
    }

    /// One scheduler tick; failures are logged and the job keeps running.
    pub async fn tick(&self, now: NaiveDateTime) {
        if let Err(e) = self.complete_past_appointments(now).await {
            tracing::error!(error = %e, "Appointment completion failed");
        }

        match self.session_repo.cleanup_expired().await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "Expired sessions removed"),
            Err(e) => tracing::warn!(error = %e, "Session cleanup failed"),
        }
    }

    /// Run `tick` every `period` until `cancel` fires. The first tick runs
    /// immediately.
    pub fn spawn(self, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.tick(Local::now().naive_local()).await;
                    }
                    _ = cancel.cancelled() => {
                        tracing::info!("Appointment scheduler stopped");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockAppointmentRepository, MockSessionRepository};
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_complete_past_appointments_uses_cutoff() {
        let mut appointments = MockAppointmentRepository::new();
        appointments
            .expect_complete_past()
            .with(eq(noon()))
            .times(1)
            .returning(|_| Ok(4));

        let job = CompletionJob::new(Arc::new(appointments), Arc::new(MockSessionRepository::new()));

        assert_eq!(job.complete_past_appointments(noon()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_tick_survives_repository_errors() {
        let mut appointments = MockAppointmentRepository::new();
        appointments
            .expect_complete_past()
            .returning(|_| Err(AppError::Internal("db down".into())));
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_cleanup_expired()
            .times(1)
            .returning(|| Err(AppError::Internal("db down".into())));

        let job = CompletionJob::new(Arc::new(appointments), Arc::new(sessions));
        job.tick(noon()).await;
    }

    #[tokio::test]
    async fn test_spawned_job_stops_on_cancel() {
        let mut appointments = MockAppointmentRepository::new();
        appointments.expect_complete_past().returning(|_| Ok(0));
        let mut sessions = MockSessionRepository::new();
        sessions.expect_cleanup_expired().returning(|| Ok(0));

        let cancel = CancellationToken::new();
        let handle = CompletionJob::new(Arc::new(appointments), Arc::new(sessions))
            .spawn(Duration::from_secs(3600), cancel.clone());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
