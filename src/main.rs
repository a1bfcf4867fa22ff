//! # Veterinary Clinic
//!
//! Appointment booking server for a veterinary clinic.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool and migrations
//! - The appointment completion scheduler
//! - HTTP server

use anyhow::Result;
use tracing::info;

use vet_clinic::config::Settings;
use vet_clinic::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    vet_clinic::telemetry::init_tracing();

    info!("Starting veterinary clinic server...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
