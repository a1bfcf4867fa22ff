//! Pet Repository Implementation
//!
//! PostgreSQL implementation of the PetRepository trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::{Pet, PetRepository, PetSex};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct PetRow {
    id: i64,
    name: String,
    species: String,
    breed: String,
    birth_date: NaiveDate,
    sex: String,
    owner_id: i64,
}

impl PetRow {
    fn into_pet(self) -> Result<Pet, AppError> {
        let sex = PetSex::parse(&self.sex)
            .ok_or_else(|| AppError::Internal(format!("Unknown pet sex '{}'", self.sex)))?;

        Ok(Pet {
            id: self.id,
            name: self.name,
            species: self.species,
            breed: self.breed,
            birth_date: self.birth_date,
            sex,
            owner_id: self.owner_id,
        })
    }
}

/// PostgreSQL pet repository implementation.
#[derive(Clone)]
pub struct PgPetRepository {
    pool: PgPool,
}

impl PgPetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PetRepository for PgPetRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Pet>, AppError> {
        let row = sqlx::query_as::<_, PetRow>(
            r#"
            SELECT id_mascota AS id, nombre AS name, especie AS species, raza AS breed,
                   fecha_nacimiento AS birth_date, sexo AS sex, id_propietario AS owner_id
            FROM mascotas
            WHERE id_mascota = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PetRow::into_pet).transpose()
    }

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Pet>, AppError> {
        let rows = sqlx::query_as::<_, PetRow>(
            r#"
            SELECT id_mascota AS id, nombre AS name, especie AS species, raza AS breed,
                   fecha_nacimiento AS birth_date, sexo AS sex, id_propietario AS owner_id
            FROM mascotas
            WHERE id_propietario = $1
            ORDER BY nombre, id_mascota
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PetRow::into_pet).collect()
    }

    async fn create(&self, pet: &Pet) -> Result<Pet, AppError> {
        let row = sqlx::query_as::<_, PetRow>(
            r#"
            INSERT INTO mascotas (nombre, especie, raza, fecha_nacimiento, sexo, id_propietario)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id_mascota AS id, nombre AS name, especie AS species, raza AS breed,
                      fecha_nacimiento AS birth_date, sexo AS sex, id_propietario AS owner_id
            "#,
        )
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(&pet.breed)
        .bind(pet.birth_date)
        .bind(pet.sex.as_str())
        .bind(pet.owner_id)
        .fetch_one(&self.pool)
        .await?;

        row.into_pet()
    }

    async fn update(&self, pet: &Pet) -> Result<Pet, AppError> {
        let row = sqlx::query_as::<_, PetRow>(
            r#"
            UPDATE mascotas
            SET nombre = $2,
                especie = $3,
                raza = $4,
                fecha_nacimiento = $5,
                sexo = $6
            WHERE id_mascota = $1
            RETURNING id_mascota AS id, nombre AS name, especie AS species, raza AS breed,
                      fecha_nacimiento AS birth_date, sexo AS sex, id_propietario AS owner_id
            "#,
        )
        .bind(pet.id)
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(&pet.breed)
        .bind(pet.birth_date)
        .bind(pet.sex.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pet with id {} not found", pet.id)))?;

        row.into_pet()
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM mascotas WHERE id_mascota = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Pet with id {} not found", id)));
        }

        Ok(())
    }
}
