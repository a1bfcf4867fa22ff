//! Localized Messages
//!
//! Message catalog for the supported UI languages and locale resolution
//! from the `lang` cookie or the `Accept-Language` header.

use std::collections::HashMap;

use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use axum_extra::extract::CookieJar;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::startup::AppState;

/// Cookie carrying the language picked through `/changeLanguage`.
pub const LOCALE_COOKIE: &str = "lang";

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Parse a language tag such as `en`, `en-US` or `es_CO`.
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "es" => Some(Self::Es),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Pick the first supported language of an `Accept-Language` value,
    /// honouring q-weights.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, Self)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let locale = Self::parse(pieces.next()?)?;
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                // q=0 marks the language as not acceptable
                (quality > 0.0).then_some((quality, locale))
            })
            .collect();

        // stable sort keeps header order among equal weights
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.first().map(|(_, locale)| *locale)
    }

    /// Translate a message key into this locale.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        translate(*self, key)
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromRequestParts<AppState> for Locale {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(locale) = jar
            .get(LOCALE_COOKIE)
            .and_then(|cookie| Locale::parse(cookie.value()))
        {
            return Ok(locale);
        }

        if let Some(locale) = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|h| h.to_str().ok())
            .and_then(Locale::from_accept_language)
        {
            return Ok(locale);
        }

        Ok(Locale::parse(&state.settings.i18n.default_locale).unwrap_or_default())
    }
}

/// (key, spanish, english)
const CATALOG: &[(&str, &str, &str)] = &[
    ("error.name.invalid", "El nombre debe tener entre 3 y 50 letras", "Name must be 3 to 50 letters"),
    ("error.lastname.invalid", "El apellido debe tener entre 3 y 50 letras", "Last name must be 3 to 50 letters"),
    ("error.email.invalid", "El correo electrónico no es válido", "Email address is not valid"),
    ("error.phone.invalid", "El teléfono debe empezar por 3 y tener 10 dígitos", "Phone must start with 3 and have 10 digits"),
    ("error.password.invalid", "La contraseña debe tener mínimo 8 caracteres, una mayúscula, una minúscula y un número", "Password needs at least 8 characters, one uppercase letter, one lowercase letter and one digit"),
    ("error.email.existing", "El correo electrónico ya está registrado", "Email is already registered"),
    ("error.phone.existing", "El teléfono ya está registrado", "Phone is already registered"),
    ("error.roles.required", "Debe seleccionar al menos un rol", "Select at least one role"),
    ("error.user.notFound", "Usuario no encontrado", "User not found"),
    ("error.user.selfDelete", "No puede eliminar su propia cuenta", "You cannot delete your own account"),
    ("error.credentials.invalid", "Correo o contraseña incorrectos", "Invalid email or password"),
    ("error.session.invalid", "La sesión no es válida o expiró", "Session is invalid or expired"),
    ("error.pet.name.invalid", "El nombre de la mascota debe tener entre 1 y 45 caracteres", "Pet name must be 1 to 45 characters"),
    ("error.pet.species.invalid", "La especie debe tener entre 1 y 45 caracteres", "Species must be 1 to 45 characters"),
    ("error.pet.breed.invalid", "La raza debe tener entre 1 y 45 caracteres", "Breed must be 1 to 45 characters"),
    ("error.pet.birthDate.invalid", "La fecha de nacimiento debe tener el formato dd/mm/aaaa y no estar en el futuro", "Birth date must use dd/mm/yyyy and not be in the future"),
    ("error.pet.sex.invalid", "El sexo debe ser Macho o Hembra", "Sex must be Macho or Hembra"),
    ("error.pet.notFound", "La mascota no existe", "Pet does not exist"),
    ("error.pet.forbidden", "No tienes permiso para acceder a esta mascota", "You are not allowed to access this pet"),
    ("error.appointment.notFound", "La cita no existe", "Appointment does not exist"),
    ("error.appointment.forbidden", "No tienes permiso para acceder a esta cita", "You are not allowed to access this appointment"),
    ("error.appointment.notEditable", "Solo se pueden modificar citas programadas", "Only scheduled appointments can be changed"),
    ("error.appointment.slotTaken", "El horario seleccionado ya no está disponible", "The selected time is no longer available"),
    ("error.appointment.slotInvalid", "La hora seleccionada no es un horario de atención", "The selected time is not a clinic slot"),
    ("error.appointment.dateOutOfRange", "La fecha debe estar dentro de las próximas dos semanas", "Date must be within the next two weeks"),
    ("error.service.notFound", "El servicio no existe o no está activo", "Service does not exist or is not active"),
    ("error.language.unsupported", "Idioma no soportado", "Unsupported language"),
    ("error.forbidden", "Acceso denegado", "Access denied"),
    ("error.unauthorized", "Debe iniciar sesión", "Authentication required"),
    ("error.rateLimited", "Demasiadas solicitudes, intente más tarde", "Too many requests, try again later"),
    ("error.unexpected", "Error inesperado, intente de nuevo", "Unexpected error, please try again"),
    ("error.request.malformed", "La solicitud no tiene un formato válido", "The request is malformed"),
    ("error.validation", "La solicitud contiene datos inválidos", "The request contains invalid data"),
    ("success.user.created", "Usuario creado exitosamente", "User created successfully"),
    ("success.user.updated", "Usuario actualizado exitosamente", "User updated successfully"),
    ("success.pet.saved", "Mascota guardada con éxito", "Pet saved successfully"),
    ("success.appointment.booked", "Cita agendada con éxito", "Appointment booked successfully"),
    ("success.appointment.cancelled", "Cita cancelada", "Appointment cancelled"),
    ("success.appointment.updated", "Cita actualizada", "Appointment updated"),
];

static MESSAGES: Lazy<HashMap<&'static str, (&'static str, &'static str)>> = Lazy::new(|| {
    CATALOG
        .iter()
        .map(|(key, es, en)| (*key, (*es, *en)))
        .collect()
});

/// Translate a message key; unknown keys are returned unchanged.
pub fn translate(locale: Locale, key: &str) -> &str {
    match MESSAGES.get(key) {
        Some((es, en)) => match locale {
            Locale::Es => es,
            Locale::En => en,
        },
        None => key,
    }
}
