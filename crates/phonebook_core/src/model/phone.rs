//! Phone number domain model.
//!
//! # Responsibility
//! - Define the phone record owned by a person, its kind enumeration and
//!   input/patch shapes.
//! - Enforce number format bounds (raw length and digit count).
//!
//! # Invariants
//! - Every phone references exactly one owning person.
//! - `is_deleted` is the source of truth for soft-delete state.
//! - Cross-record rules (per-owner limit, duplicates) live in the service
//!   layer, not here.

use super::person::PersonId;
use super::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Stable identifier for a phone record.
pub type PhoneId = i64;

pub const NUMBER_RAW_MIN: usize = 8;
pub const NUMBER_RAW_MAX: usize = 20;
pub const NUMBER_DIGITS_MIN: usize = 8;
pub const NUMBER_DIGITS_MAX: usize = 11;

static NON_DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\D").expect("valid non-digit regex"));

/// Category of a phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneKind {
    Cellular,
    Residential,
    Commercial,
}

impl PhoneKind {
    /// Stable storage/wire token for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cellular => "cellular",
            Self::Residential => "residential",
            Self::Commercial => "commercial",
        }
    }

    /// Parses a storage/wire token back into a kind.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cellular" => Some(Self::Cellular),
            "residential" => Some(Self::Residential),
            "commercial" => Some(Self::Commercial),
            _ => None,
        }
    }
}

/// Canonical persisted phone record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    /// Store-generated identifier.
    pub id: PhoneId,
    /// Raw number string as entered, formatting characters included.
    pub number: String,
    /// Phone category.
    pub kind: PhoneKind,
    /// Owning person identifier.
    pub person_id: PersonId,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Last update time in epoch milliseconds.
    pub updated_at: i64,
    /// Soft-delete flag; deleted records are excluded from normal reads.
    pub is_deleted: bool,
}

/// Input shape for creating a phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhone {
    pub number: String,
    pub kind: PhoneKind,
    pub person_id: PersonId,
}

impl NewPhone {
    /// Checks number format bounds before the record reaches storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_number(&self.number)
    }
}

/// Field-level patch for updating a phone.
///
/// Only fields carrying `Some` are merged onto the stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonePatch {
    pub number: Option<String>,
    pub kind: Option<PhoneKind>,
    pub person_id: Option<PersonId>,
}

impl PhonePatch {
    /// Returns whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.kind.is_none() && self.person_id.is_none()
    }

    /// Checks number format bounds when the patch carries a new number.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.number.as_deref() {
            Some(number) => validate_number(number),
            None => Ok(()),
        }
    }
}

/// Validates one raw phone number string.
///
/// Rules (matching the inbound schema contract):
/// - raw length between 8 and 20 characters;
/// - between 8 and 11 digits after stripping non-digit characters.
pub fn validate_number(number: &str) -> Result<(), ValidationError> {
    let len = number.chars().count();
    if !(NUMBER_RAW_MIN..=NUMBER_RAW_MAX).contains(&len) {
        return Err(ValidationError::NumberLength { len });
    }

    let digits = NON_DIGIT_RE.replace_all(number, "").chars().count();
    if !(NUMBER_DIGITS_MIN..=NUMBER_DIGITS_MAX).contains(&digits) {
        return Err(ValidationError::NumberDigitCount { digits });
    }

    Ok(())
}
