//! Person use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for boundary callers.
//! - Translate repository absence into `PersonNotFound` at the use-case
//!   boundary.
//!
//! # Invariants
//! - This layer adds no business logic beyond input-to-store mapping; it
//!   never bypasses repository validation/persistence contracts.

use crate::model::person::{NewPerson, Person, PersonId, PersonPatch};
use crate::repo::person_repo::{PersonListQuery, PersonRepository, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for person use-cases.
#[derive(Debug)]
pub enum PersonServiceError {
    /// No non-deleted person with the given id.
    PersonNotFound(PersonId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for PersonServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersonServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::PersonNotFound(_) => None,
        }
    }
}

impl From<RepoError> for PersonServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper for person CRUD operations.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new person record.
    pub fn create(&self, input: &NewPerson) -> Result<Person, PersonServiceError> {
        let person = self.repo.add(input)?;
        info!(
            "event=person_create module=service status=ok id={}",
            person.id
        );
        Ok(person)
    }

    /// Gets one person by id.
    pub fn get(&self, id: PersonId) -> Result<Person, PersonServiceError> {
        self.repo
            .get_by_id(id)?
            .ok_or(PersonServiceError::PersonNotFound(id))
    }

    /// Lists persons using substring filters and pagination.
    pub fn list(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>> {
        self.repo.list(query)
    }

    /// Merges patch fields onto an existing person.
    pub fn update(&self, id: PersonId, patch: &PersonPatch) -> Result<Person, PersonServiceError> {
        match self.repo.update(id, patch)? {
            Some(person) => {
                info!("event=person_update module=service status=ok id={id}");
                Ok(person)
            }
            None => {
                warn!("event=person_update module=service status=rejected reason=not_found id={id}");
                Err(PersonServiceError::PersonNotFound(id))
            }
        }
    }

    /// Soft-deletes one person by id.
    pub fn delete(&self, id: PersonId) -> Result<(), PersonServiceError> {
        if self.repo.soft_delete(id)? {
            info!("event=person_delete module=service status=ok id={id}");
            Ok(())
        } else {
            warn!("event=person_delete module=service status=rejected reason=not_found id={id}");
            Err(PersonServiceError::PersonNotFound(id))
        }
    }
}
