//! # Domain Entities
//!
//! Core domain entities of the clinic. All entities map directly to their
//! corresponding database tables.
//!
//! - **User**: customer or staff account with its roles
//! - **Role**: authorization role (`ADMIN`, `USER`)
//! - **Pet**: an animal registered by its owner
//! - **ClinicService**: an entry of the service catalog
//! - **Appointment**: a booked visit of a pet for a service
//! - **Session**: refresh token bookkeeping
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod appointment;
mod clinic_service;
mod pet;
mod role;
mod session;
mod user;

pub use appointment::{Appointment, AppointmentDetails, AppointmentRepository, AppointmentStatus};
pub use clinic_service::{ClinicService, ClinicServiceRepository};
pub use pet::{Pet, PetRepository, PetSex, BIRTH_DATE_FORMAT, PET_TEXT_MAX_CHARS};
pub use role::{Role, RoleRepository, ROLE_ADMIN, ROLE_USER};
pub use session::{Session, SessionRepository};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use appointment::MockAppointmentRepository;
#[cfg(test)]
pub use clinic_service::MockClinicServiceRepository;
#[cfg(test)]
pub use pet::MockPetRepository;
#[cfg(test)]
pub use role::MockRoleRepository;
#[cfg(test)]
pub use session::MockSessionRepository;
#[cfg(test)]
pub use user::MockUserRepository;
