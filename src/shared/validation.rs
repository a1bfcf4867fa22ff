//! Validation Utilities
//!
//! Field rules shared by the request DTOs and conversion of `validator`
//! failures into localized [`AppError::Validation`] responses.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

use super::error::{AppError, FieldError};
use super::i18n::{translate, Locale};

/// Letters accepted in person names.
const NAME_LETTERS: &str = "a-zA-ZáéíóúÁÉÍÓÚñÑ";

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 8;

pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_+&*-]+(?:\.[a-zA-Z0-9_+&*-]+)*@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,7}$")
        .expect("email pattern is valid")
});

/// Ten digits starting with 3.
pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^3\d{9}$").expect("phone pattern is valid"));

static NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "^[{l}](?:[{l} ]*[{l}])?$",
        l = NAME_LETTERS
    ))
    .expect("name pattern is valid")
});

/// Person name or surname: letters and inner spaces, 3 to 50 characters.
pub fn validate_person_name(value: &str) -> Result<(), ValidationError> {
    let chars = value.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) || !NAME_REGEX.is_match(value) {
        return Err(ValidationError::new("person_name"));
    }
    Ok(())
}

/// At least 8 characters from `[a-zA-Z0-9@_-]` with one lowercase letter,
/// one uppercase letter and one digit.
pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '_' | '-'));

    if value.len() < PASSWORD_MIN_CHARS
        || !allowed
        || !value.chars().any(|c| c.is_ascii_lowercase())
        || !value.chars().any(|c| c.is_ascii_uppercase())
        || !value.chars().any(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::new("password"));
    }
    Ok(())
}

/// Non-blank text; used for pet fields where whitespace-only input is empty.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Build a single localized field error.
pub fn field_error(field: &str, key: &str, locale: Locale) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: translate(locale, key).to_string(),
    }
}

/// Wrap field errors into a localized validation error.
pub fn invalid_fields(errors: Vec<FieldError>, locale: Locale) -> AppError {
    AppError::Validation {
        message: translate(locale, "error.validation").to_string(),
        errors,
    }
}

/// Convert validation errors to AppError.
///
/// Error codes are message keys; they are translated into `locale`.
pub fn validation_error(errors: ValidationErrors, locale: Locale) -> AppError {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: translate(locale, &e.code).to_string(),
            })
        })
        .collect();

    field_errors.sort_by(|a, b| a.field.cmp(&b.field));

    invalid_fields(field_errors, locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use validator::Validate;

    #[test_case("Ana" ; "three letters")]
    #[test_case("María José" ; "accent and inner space")]
    #[test_case("Muñoz" ; "enye")]
    fn test_person_name_accepts(name: &str) {
        assert!(validate_person_name(name).is_ok());
    }

    #[test_case("Al" ; "too short")]
    #[test_case(" Ana" ; "leading space")]
    #[test_case("Ana " ; "trailing space")]
    #[test_case("Ana3" ; "digit")]
    #[test_case("Ana-María" ; "hyphen")]
    fn test_person_name_rejects(name: &str) {
        assert!(validate_person_name(name).is_err());
    }

    #[test]
    fn test_person_name_length_counts_characters() {
        assert!(validate_person_name(&"á".repeat(50)).is_ok());
        assert!(validate_person_name(&"a".repeat(51)).is_err());
    }

    #[test_case("Secreto123" ; "letters and digits")]
    #[test_case("Abc_de-f@1" ; "allowed symbols")]
    fn test_password_accepts(password: &str) {
        assert!(validate_password(password).is_ok());
    }

    #[test_case("Ab1" ; "too short")]
    #[test_case("secreto123" ; "no uppercase")]
    #[test_case("SECRETO123" ; "no lowercase")]
    #[test_case("SecretoSecreto" ; "no digit")]
    #[test_case("Secreto 123" ; "space")]
    #[test_case("Secreto!123" ; "bang")]
    fn test_password_rejects(password: &str) {
        assert!(validate_password(password).is_err());
    }

    #[test_case("ana@vet.co", true)]
    #[test_case("ana.maria+citas@mail.example.com", true)]
    #[test_case("ana@vet", false)]
    #[test_case("ana@@vet.co", false)]
    #[test_case(".ana@vet.co", false)]
    fn test_email_pattern(email: &str, valid: bool) {
        assert_eq!(EMAIL_REGEX.is_match(email), valid);
    }

    #[test_case("3001234567", true)]
    #[test_case("300123456", false)]
    #[test_case("2001234567", false)]
    #[test_case("30012345678", false)]
    fn test_phone_pattern(phone: &str, valid: bool) {
        assert_eq!(PHONE_REGEX.is_match(phone), valid);
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "validate_person_name", code = "error.name.invalid"))]
        name: String,
        #[validate(regex(path = *PHONE_REGEX, code = "error.phone.invalid"))]
        phone: String,
    }

    #[test]
    fn test_validation_error_is_localized_and_sorted() {
        let sample = Sample {
            name: "X".into(),
            phone: "123".into(),
        };
        let err = validation_error(sample.validate().unwrap_err(), Locale::En);

        match err {
            AppError::Validation { message, errors } => {
                assert_eq!(message, "The request contains invalid data");
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "name");
                assert_eq!(errors[0].message, "Name must be 3 to 50 letters");
                assert_eq!(errors[1].field, "phone");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
