//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::services::TokenCodec;
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{PgAppointmentRepository, PgSessionRepository};
use crate::infrastructure::scheduler::CompletionJob;
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{cors, logging, RateLimiter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub settings: Arc<Settings>,
    pub tokens: Arc<TokenCodec>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(db: PgPool, settings: Settings) -> Self {
        Self {
            db,
            tokens: Arc::new(TokenCodec::new(&settings.jwt)),
            rate_limiter: Arc::new(RateLimiter::from_settings(&settings.rate_limit)),
            settings: Arc::new(settings),
        }
    }
}

/// Full middleware stack around the routes.
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
    scheduler: Option<JoinHandle<()>>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        let shutdown = CancellationToken::new();
        let scheduler = settings.scheduler.enabled.then(|| {
            let period = Duration::from_secs(settings.scheduler.interval_seconds);
            tracing::info!(interval_secs = period.as_secs(), "Appointment scheduler started");
            CompletionJob::new(
                Arc::new(PgAppointmentRepository::new(db.clone())),
                Arc::new(PgSessionRepository::new(db.clone())),
            )
            .spawn(period, shutdown.clone())
        });

        let addr = settings.server_addr();
        let state = AppState::new(db, settings);
        let router = build_router(state);

        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", addr);

        health::init_server_start();

        Ok(Self {
            listener,
            router,
            shutdown,
            scheduler,
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run_until_stopped(self) -> Result<()> {
        let shutdown = self.shutdown.clone();

        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await?;

        if let Some(handle) = self.scheduler {
            self.shutdown.cancel();
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Scheduler task ended abnormally");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
