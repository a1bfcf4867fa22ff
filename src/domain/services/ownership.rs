//! Ownership checks for pets and appointments.

use crate::domain::entities::{AppointmentDetails, Pet};

/// Outcome of an ownership lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
    Missing,
}

/// Domain service deciding whether a user may act on a resource.
pub struct OwnershipService;

impl OwnershipService {
    pub fn pet_access(pet: Option<&Pet>, user_id: i64) -> Access {
        match pet {
            None => Access::Missing,
            Some(pet) if pet.is_owned_by(user_id) => Access::Granted,
            Some(_) => Access::Denied,
        }
    }

    /// Appointments belong to the owner of their pet.
    pub fn appointment_access(appointment: Option<&AppointmentDetails>, user_id: i64) -> Access {
        match appointment {
            None => Access::Missing,
            Some(a) if a.owner_id == user_id => Access::Granted,
            Some(_) => Access::Denied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Appointment, PetSex};
    use chrono::NaiveDate;

    fn pet(owner_id: i64) -> Pet {
        Pet {
            id: 10,
            name: "Luna".into(),
            species: "Gato".into(),
            breed: "Criollo".into(),
            birth_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            sex: PetSex::Hembra,
            owner_id,
        }
    }

    #[test]
    fn test_pet_access() {
        let luna = pet(1);
        assert_eq!(OwnershipService::pet_access(Some(&luna), 1), Access::Granted);
        assert_eq!(OwnershipService::pet_access(Some(&luna), 2), Access::Denied);
        assert_eq!(OwnershipService::pet_access(None, 1), Access::Missing);
    }

    #[test]
    fn test_appointment_access_follows_pet_owner() {
        let at = NaiveDate::from_ymd_opt(2026, 2, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let details = AppointmentDetails {
            appointment: Appointment::new(10, 1, at),
            pet_name: "Luna".into(),
            service_name: "Consulta General".into(),
            owner_id: 1,
        };

        assert_eq!(
            OwnershipService::appointment_access(Some(&details), 1),
            Access::Granted
        );
        assert_eq!(
            OwnershipService::appointment_access(Some(&details), 3),
            Access::Denied
        );
        assert_eq!(OwnershipService::appointment_access(None, 1), Access::Missing);
    }
}
