//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database pool and migrations (PostgreSQL)
//! - Repository implementations
//! - Prometheus metrics
//! - The appointment housekeeping scheduler

pub mod database;
pub mod metrics;
pub mod repositories;
pub mod scheduler;
