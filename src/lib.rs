//! # Veterinary Clinic Library
//!
//! Appointment booking for a veterinary clinic:
//! - JSON HTTP API for pets, appointments and user administration
//! - PostgreSQL for persistent storage
//! - JWT access tokens with rotating refresh sessions
//! - Spanish and English messages
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, repository traits, schedule and ownership rules
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, repositories, metrics and the scheduler
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! vet_clinic/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, repository traits and rules
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, metrics and background jobs
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Errors, i18n and validation
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
