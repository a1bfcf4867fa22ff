//! # Domain Services
//!
//! Domain services encapsulate business logic that doesn't naturally
//! belong to a single entity.
//!
//! ## Services
//!
//! - **ClinicSchedule**: slot grid, availability and booking window
//! - **OwnershipService**: owner checks for pets and appointments

mod availability;
mod ownership;

pub use availability::*;
pub use ownership::*;
