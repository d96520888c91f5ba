//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical person record and its input/patch shapes.
//! - Enforce field-length bounds before persistence.
//!
//! # Invariants
//! - `id` is store-generated, unique and immutable once assigned.
//! - `is_deleted` is the source of truth for soft-delete state; core never
//!   clears it once set.

use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Stable identifier for a person record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PersonId = i64;

pub const PERSON_NAME_MAX: usize = 100;
pub const PERSON_EMAIL_MAX: usize = 255;
pub const PERSON_CONTACT_PHONE_MAX: usize = 20;
pub const PERSON_BIRTH_DATE_MAX: usize = 10;

/// Canonical persisted person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Store-generated identifier.
    pub id: PersonId,
    /// Full name, at most 100 characters.
    pub name: String,
    /// Contact email, at most 255 characters.
    pub email: String,
    /// Free-form contact phone string on the person itself, distinct from
    /// the owned `Phone` records.
    pub contact_phone: String,
    /// Birth date as a `YYYY-MM-DD` string.
    pub birth_date: String,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Last update time in epoch milliseconds.
    pub updated_at: i64,
    /// Soft-delete flag; deleted records are excluded from normal reads.
    pub is_deleted: bool,
}

/// Input shape for creating a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub name: String,
    pub email: String,
    pub contact_phone: String,
    pub birth_date: String,
}

impl NewPerson {
    /// Checks field-length bounds before the record reaches storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_bounds(&self.email, &self.contact_phone, &self.birth_date)
    }
}

/// Field-level patch for updating a person.
///
/// Only fields carrying `Some` are merged onto the stored record. The patch
/// cannot touch `id`, timestamps or `is_deleted`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_phone: Option<String>,
    pub birth_date: Option<String>,
}

impl PersonPatch {
    /// Returns whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.contact_phone.is_none()
            && self.birth_date.is_none()
    }

    /// Checks field-length bounds for every field present in the patch.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = self.name.as_deref() {
            validate_name(name)?;
        }
        if let Some(email) = self.email.as_deref() {
            if email.chars().count() > PERSON_EMAIL_MAX {
                return Err(ValidationError::EmailTooLong {
                    max: PERSON_EMAIL_MAX,
                });
            }
        }
        if let Some(contact_phone) = self.contact_phone.as_deref() {
            if contact_phone.chars().count() > PERSON_CONTACT_PHONE_MAX {
                return Err(ValidationError::ContactPhoneTooLong {
                    max: PERSON_CONTACT_PHONE_MAX,
                });
            }
        }
        if let Some(birth_date) = self.birth_date.as_deref() {
            if birth_date.chars().count() > PERSON_BIRTH_DATE_MAX {
                return Err(ValidationError::BirthDateTooLong {
                    max: PERSON_BIRTH_DATE_MAX,
                });
            }
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > PERSON_NAME_MAX {
        return Err(ValidationError::NameTooLong {
            max: PERSON_NAME_MAX,
        });
    }
    Ok(())
}

fn validate_bounds(
    email: &str,
    contact_phone: &str,
    birth_date: &str,
) -> Result<(), ValidationError> {
    if email.chars().count() > PERSON_EMAIL_MAX {
        return Err(ValidationError::EmailTooLong {
            max: PERSON_EMAIL_MAX,
        });
    }
    if contact_phone.chars().count() > PERSON_CONTACT_PHONE_MAX {
        return Err(ValidationError::ContactPhoneTooLong {
            max: PERSON_CONTACT_PHONE_MAX,
        });
    }
    if birth_date.chars().count() > PERSON_BIRTH_DATE_MAX {
        return Err(ValidationError::BirthDateTooLong {
            max: PERSON_BIRTH_DATE_MAX,
        });
    }
    Ok(())
}
