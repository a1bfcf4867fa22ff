//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - accounts and their roles
//! - **PgRoleRepository** - role lookup
//! - **PgPetRepository** - pets per owner
//! - **PgClinicServiceRepository** - service catalog (read-only)
//! - **PgAppointmentRepository** - bookings, slot occupancy, completion
//! - **PgSessionRepository** - refresh token sessions
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use vet_clinic::infrastructure::repositories::{PgPetRepository, PgUserRepository};
//!
//! fn setup_repositories(pool: PgPool) {
//!     let user_repo = PgUserRepository::new(pool.clone());
//!     let pet_repo = PgPetRepository::new(pool);
//! }
//! ```

pub mod appointment_repository;
pub mod clinic_service_repository;
pub mod pet_repository;
pub mod role_repository;
pub mod session_repository;
pub mod user_repository;

pub use appointment_repository::PgAppointmentRepository;
pub use clinic_service_repository::PgClinicServiceRepository;
pub use pet_repository::PgPetRepository;
pub use role_repository::PgRoleRepository;
pub use session_repository::PgSessionRepository;
pub use user_repository::PgUserRepository;
