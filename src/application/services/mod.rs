//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT tokens and refresh sessions
//! - **UserService**: Administrative account management
//! - **PetService**: Pet CRUD for the owner
//! - **AppointmentService**: Booking, slot board, cancel and reschedule

pub mod appointment_service;
pub mod auth_service;
pub mod pet_service;
pub mod user_service;

// Re-export auth service types
pub use auth_service::{
    hash_password, verify_password, AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims,
    NewAccount, TokenCodec,
};

// Re-export user service types
pub use user_service::{UserError, UserInput, UserService, UserServiceImpl};

// Re-export pet service types
pub use pet_service::{PetError, PetInput, PetService, PetServiceImpl};

// Re-export appointment service types
pub use appointment_service::{
    AppointmentError, AppointmentService, AppointmentServiceImpl, BookingInput, BookingView,
};
