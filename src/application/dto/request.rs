//! Request DTOs
//!
//! Data structures for API request bodies and query strings. Validation
//! codes are message keys translated when the error is reported.

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::{PetSex, BIRTH_DATE_FORMAT};
use crate::shared::validation::{
    validate_not_blank, validate_password, validate_person_name, EMAIL_REGEX, PHONE_REGEX,
};

/// Birth date in `dd/mm/yyyy`, not after today.
fn validate_birth_date(value: &str) -> Result<(), ValidationError> {
    match NaiveDate::parse_from_str(value.trim(), BIRTH_DATE_FORMAT) {
        Ok(date) if date <= Local::now().date_naive() => Ok(()),
        _ => Err(ValidationError::new("birth_date")),
    }
}

fn validate_pet_sex(value: &str) -> Result<(), ValidationError> {
    PetSex::parse(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("sex"))
}

/// An empty password keeps the current one.
fn validate_optional_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    validate_password(value)
}

/// Self-registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_person_name", code = "error.name.invalid"))]
    pub first_name: String,

    #[validate(custom(function = "validate_person_name", code = "error.lastname.invalid"))]
    pub last_name: String,

    #[validate(
        length(max = 255, code = "error.email.invalid"),
        regex(path = *EMAIL_REGEX, code = "error.email.invalid")
    )]
    pub email: String,

    #[validate(regex(path = *PHONE_REGEX, code = "error.phone.invalid"))]
    pub phone: String,

    #[validate(custom(function = "validate_password", code = "error.password.invalid"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, code = "error.email.invalid"))]
    pub email: String,

    #[validate(length(min = 1, code = "error.password.invalid"))]
    pub password: String,
}

/// Refresh token request (also used for logout)
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Admin: create a user with explicit roles
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_person_name", code = "error.name.invalid"))]
    pub first_name: String,

    #[validate(custom(function = "validate_person_name", code = "error.lastname.invalid"))]
    pub last_name: String,

    #[validate(
        length(max = 255, code = "error.email.invalid"),
        regex(path = *EMAIL_REGEX, code = "error.email.invalid")
    )]
    pub email: String,

    #[validate(regex(path = *PHONE_REGEX, code = "error.phone.invalid"))]
    pub phone: String,

    #[validate(custom(function = "validate_password", code = "error.password.invalid"))]
    pub password: String,

    #[validate(length(min = 1, code = "error.roles.required"))]
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

/// Admin: update a user; roles are replaced
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "validate_person_name", code = "error.name.invalid"))]
    pub first_name: String,

    #[validate(custom(function = "validate_person_name", code = "error.lastname.invalid"))]
    pub last_name: String,

    #[validate(
        length(max = 255, code = "error.email.invalid"),
        regex(path = *EMAIL_REGEX, code = "error.email.invalid")
    )]
    pub email: String,

    #[validate(regex(path = *PHONE_REGEX, code = "error.phone.invalid"))]
    pub phone: String,

    /// Left empty or omitted to keep the current password
    #[validate(custom(function = "validate_optional_password", code = "error.password.invalid"))]
    #[serde(default)]
    pub password: Option<String>,

    #[validate(length(min = 1, code = "error.roles.required"))]
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

/// Admin user list filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}

/// Create or update a pet
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PetRequest {
    #[validate(
        length(min = 1, max = 45, code = "error.pet.name.invalid"),
        custom(function = "validate_not_blank", code = "error.pet.name.invalid")
    )]
    pub name: String,

    #[validate(
        length(min = 1, max = 45, code = "error.pet.species.invalid"),
        custom(function = "validate_not_blank", code = "error.pet.species.invalid")
    )]
    pub species: String,

    #[validate(
        length(min = 1, max = 45, code = "error.pet.breed.invalid"),
        custom(function = "validate_not_blank", code = "error.pet.breed.invalid")
    )]
    pub breed: String,

    /// `dd/mm/yyyy`
    #[validate(custom(function = "validate_birth_date", code = "error.pet.birthDate.invalid"))]
    pub birth_date: String,

    #[validate(custom(function = "validate_pet_sex", code = "error.pet.sex.invalid"))]
    pub sex: String,
}

impl PetRequest {
    /// Parsed birth date; call after `validate`.
    pub fn parsed_birth_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.birth_date.trim(), BIRTH_DATE_FORMAT).ok()
    }

    pub fn parsed_sex(&self) -> Option<PetSex> {
        PetSex::parse(&self.sex)
    }
}

/// Book or reschedule an appointment
#[derive(Debug, Deserialize, ToSchema)]
pub struct BookAppointmentRequest {
    /// ISO date `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Slot time `HH:MM`
    #[schema(example = "09:30")]
    pub time: String,
    pub pet_id: i64,
    pub service_id: i64,
}

/// Optional service filter for the slot board
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotQuery {
    pub service_id: Option<i64>,
}

/// Language switch query
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LanguageQuery {
    pub lang: String,
}
