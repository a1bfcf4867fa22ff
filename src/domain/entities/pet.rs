//! Pet entity and repository trait.
//!
//! Maps to the `mascotas` table in the database schema.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Maximum length of pet name, species and breed.
pub const PET_TEXT_MAX_CHARS: u64 = 45;

/// Birth date format used by the pet forms.
pub const BIRTH_DATE_FORMAT: &str = "%d/%m/%Y";

/// Pet sex, stored as its Spanish label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PetSex {
    Macho,
    Hembra,
}

impl PetSex {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Macho" => Some(Self::Macho),
            "Hembra" => Some(Self::Hembra),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Macho => "Macho",
            Self::Hembra => "Hembra",
        }
    }
}

impl std::fmt::Display for PetSex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A pet registered by its owner.
///
/// Maps to the `mascotas` table:
/// - id_mascota: BIGSERIAL PRIMARY KEY
/// - nombre, especie, raza: VARCHAR(45) NOT NULL
/// - fecha_nacimiento: DATE NOT NULL
/// - sexo: VARCHAR(10) NOT NULL CHECK IN ('Macho', 'Hembra')
/// - id_propietario: BIGINT NOT NULL REFERENCES usuarios ON DELETE CASCADE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub birth_date: NaiveDate,
    pub sex: PetSex,
    pub owner_id: i64,
}

impl Pet {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }
}

/// Repository trait for Pet data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Pet>, AppError>;

    /// Pets of one owner ordered by name.
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Pet>, AppError>;

    async fn create(&self, pet: &Pet) -> Result<Pet, AppError>;

    async fn update(&self, pet: &Pet) -> Result<Pet, AppError>;

    /// Delete a pet together with its appointments.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Macho", Some(PetSex::Macho))]
    #[test_case("Hembra", Some(PetSex::Hembra))]
    #[test_case("macho", None)]
    #[test_case("Male", None)]
    fn test_sex_parse(input: &str, expected: Option<PetSex>) {
        assert_eq!(PetSex::parse(input), expected);
    }

    #[test]
    fn test_sex_serializes_as_label() {
        assert_eq!(serde_json::to_string(&PetSex::Hembra).unwrap(), "\"Hembra\"");
    }

    #[test]
    fn test_ownership() {
        let pet = Pet {
            id: 1,
            name: "Firulais".into(),
            species: "Perro".into(),
            breed: "Labrador".into(),
            birth_date: NaiveDate::from_ymd_opt(2020, 3, 15).unwrap(),
            sex: PetSex::Macho,
            owner_id: 4,
        };

        assert!(pet.is_owned_by(4));
        assert!(!pet.is_owned_by(5));
    }
}
