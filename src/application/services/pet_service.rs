//! Pet Service
//!
//! Pet CRUD restricted to the owning user.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::services::{Access, OwnershipService};
use crate::domain::{AppointmentDetails, AppointmentRepository, Pet, PetRepository, PetSex};
use crate::shared::error::AppError;
use crate::shared::i18n::Locale;

/// Pet service trait
#[async_trait]
pub trait PetService: Send + Sync {
    /// Pets owned by `owner_id`
    async fn list(&self, owner_id: i64) -> Result<Vec<Pet>, PetError>;

    /// One owned pet with its appointment history
    async fn get(
        &self,
        owner_id: i64,
        pet_id: i64,
    ) -> Result<(Pet, Vec<AppointmentDetails>), PetError>;

    async fn create(&self, owner_id: i64, input: PetInput) -> Result<Pet, PetError>;

    async fn update(&self, owner_id: i64, pet_id: i64, input: PetInput) -> Result<Pet, PetError>;

    /// Delete an owned pet along with its appointments
    async fn delete(&self, owner_id: i64, pet_id: i64) -> Result<(), PetError>;
}

/// Pet form input, already validated and parsed
#[derive(Debug, Clone)]
pub struct PetInput {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub birth_date: NaiveDate,
    pub sex: PetSex,
}

/// Pet service errors
#[derive(Debug, thiserror::Error)]
pub enum PetError {
    #[error("Pet not found")]
    NotFound,

    #[error("Pet belongs to another user")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for PetError {
    fn from(e: AppError) -> Self {
        PetError::Internal(e.to_string())
    }
}

impl PetError {
    /// Convert into a localized HTTP error.
    pub fn localized(self, locale: Locale) -> AppError {
        match self {
            PetError::NotFound => AppError::NotFound(locale.t("error.pet.notFound").into()),
            PetError::Forbidden => AppError::Forbidden(locale.t("error.pet.forbidden").into()),
            PetError::Internal(detail) => AppError::Unexpected {
                message: locale.t("error.unexpected").into(),
                detail,
            },
        }
    }
}

/// PetService implementation
pub struct PetServiceImpl<P, A>
where
    P: PetRepository,
    A: AppointmentRepository,
{
    pet_repo: Arc<P>,
    appointment_repo: Arc<A>,
}

impl<P, A> PetServiceImpl<P, A>
where
    P: PetRepository,
    A: AppointmentRepository,
{
    pub fn new(pet_repo: Arc<P>, appointment_repo: Arc<A>) -> Self {
        Self {
            pet_repo,
            appointment_repo,
        }
    }

    async fn owned_pet(&self, owner_id: i64, pet_id: i64) -> Result<Pet, PetError> {
        let pet = self.pet_repo.find_by_id(pet_id).await?;

        match OwnershipService::pet_access(pet.as_ref(), owner_id) {
            Access::Granted => pet.ok_or(PetError::NotFound),
            Access::Denied => {
                tracing::warn!(pet_id, user_id = owner_id, "Pet access denied");
                Err(PetError::Forbidden)
            }
            Access::Missing => Err(PetError::NotFound),
        }
    }
}

#[async_trait]
impl<P, A> PetService for PetServiceImpl<P, A>
where
    P: PetRepository + 'static,
    A: AppointmentRepository + 'static,
{
    async fn list(&self, owner_id: i64) -> Result<Vec<Pet>, PetError> {
        Ok(self.pet_repo.find_by_owner(owner_id).await?)
    }

    async fn get(
        &self,
        owner_id: i64,
        pet_id: i64,
    ) -> Result<(Pet, Vec<AppointmentDetails>), PetError> {
        let pet = self.owned_pet(owner_id, pet_id).await?;
        let appointments = self.appointment_repo.find_by_pet(pet.id).await?;
        Ok((pet, appointments))
    }

    async fn create(&self, owner_id: i64, input: PetInput) -> Result<Pet, PetError> {
        let pet = Pet {
            id: 0,
            name: input.name.trim().to_string(),
            species: input.species.trim().to_string(),
            breed: input.breed.trim().to_string(),
            birth_date: input.birth_date,
            sex: input.sex,
            owner_id,
        };

        let created = self.pet_repo.create(&pet).await?;
        tracing::info!(pet_id = created.id, owner_id, "Pet created");
        Ok(created)
    }

    async fn update(&self, owner_id: i64, pet_id: i64, input: PetInput) -> Result<Pet, PetError> {
        let mut pet = self.owned_pet(owner_id, pet_id).await?;

        pet.name = input.name.trim().to_string();
        pet.species = input.species.trim().to_string();
        pet.breed = input.breed.trim().to_string();
        pet.birth_date = input.birth_date;
        pet.sex = input.sex;

        Ok(self.pet_repo.update(&pet).await?)
    }

    async fn delete(&self, owner_id: i64, pet_id: i64) -> Result<(), PetError> {
        self.owned_pet(owner_id, pet_id).await?;
        self.pet_repo.delete(pet_id).await?;

        tracing::info!(pet_id, owner_id, "Pet deleted");
        Ok(())
    }
}
