//! Core domain logic for the phonebook record-management service.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{NewPerson, Person, PersonId, PersonPatch};
pub use model::phone::{NewPhone, Phone, PhoneId, PhoneKind, PhonePatch};
pub use model::ValidationError;
pub use repo::person_repo::{
    PersonListQuery, PersonRepository, RepoError, RepoResult, SqlitePersonRepository,
};
pub use repo::phone_repo::{PhoneRepository, SqlitePhoneRepository};
pub use service::person_service::{PersonService, PersonServiceError};
pub use service::phone_service::{PhoneService, PhoneServiceError, PhoneStats};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
