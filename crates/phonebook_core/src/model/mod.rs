//! Domain models for person and phone records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Provide write-path validation shared by both entities.
//!
//! # Invariants
//! - Every record carries a store-generated integer identifier.
//! - Deletion is represented by soft-delete flags, not hard delete.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod person;
pub mod phone;

/// Write-path validation error shared by person and phone models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Person name is empty or whitespace-only.
    EmptyName,
    /// Person name exceeds the allowed length.
    NameTooLong { max: usize },
    /// Person email exceeds the allowed length.
    EmailTooLong { max: usize },
    /// Person contact phone string exceeds the allowed length.
    ContactPhoneTooLong { max: usize },
    /// Person birth date string exceeds the allowed length.
    BirthDateTooLong { max: usize },
    /// Phone number raw length is outside 8..=20 characters.
    NumberLength { len: usize },
    /// Phone number digit count is outside 8..=11 after stripping non-digits.
    NumberDigitCount { digits: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "person name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "person name exceeds {max} characters")
            }
            Self::EmailTooLong { max } => {
                write!(f, "person email exceeds {max} characters")
            }
            Self::ContactPhoneTooLong { max } => {
                write!(f, "person contact phone exceeds {max} characters")
            }
            Self::BirthDateTooLong { max } => {
                write!(f, "person birth date exceeds {max} characters")
            }
            Self::NumberLength { len } => {
                write!(f, "phone number must have 8 to 20 characters, got {len}")
            }
            Self::NumberDigitCount { digits } => {
                write!(f, "phone number must have 8 to 11 digits, got {digits}")
            }
        }
    }
}

impl Error for ValidationError {}
