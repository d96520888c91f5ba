//! Phone business-rules service.
//!
//! # Responsibility
//! - Enforce cross-record invariants over phone records: owner existence,
//!   per-owner count limit, duplicate-number rejection.
//! - Compute aggregate statistics over phones and persons on demand.
//!
//! # Invariants
//! - A person never holds more than `MAX_PHONES_PER_PERSON` non-deleted
//!   phones through this service.
//! - Duplicate rejection compares exact `number` strings of one owner;
//!   create-time only, not re-run on update.
//! - Statistics are computed fresh on every call; nothing is cached.

use crate::model::person::PersonId;
use crate::model::phone::{NewPhone, Phone, PhoneId, PhonePatch};
use crate::repo::person_repo::{PersonRepository, RepoError, RepoResult};
use crate::repo::phone_repo::PhoneRepository;
use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of non-deleted phones one person may hold.
pub const MAX_PHONES_PER_PERSON: usize = 3;

/// Service error for phone use-cases.
#[derive(Debug)]
pub enum PhoneServiceError {
    /// Referenced owner does not exist or is soft-deleted.
    OwnerNotFound(PersonId),
    /// Owner already holds the maximum number of phones.
    LimitExceeded(PersonId),
    /// Owner already has a phone with the identical number string.
    DuplicateNumber { person_id: PersonId, number: String },
    /// No non-deleted phone with the given id.
    PhoneNotFound(PhoneId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for PhoneServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OwnerNotFound(person_id) => {
                write!(f, "person not found: {person_id}")
            }
            Self::LimitExceeded(person_id) => write!(
                f,
                "person {person_id} already has the maximum of {MAX_PHONES_PER_PERSON} phones"
            ),
            Self::DuplicateNumber { person_id, number } => write!(
                f,
                "number `{number}` is already registered for person {person_id}"
            ),
            Self::PhoneNotFound(id) => write!(f, "phone not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PhoneServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PhoneServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Aggregate statistics over non-deleted phones and persons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneStats {
    /// Total non-deleted phone count.
    pub total_phones: usize,
    /// Non-deleted phone count grouped by kind token.
    pub phones_by_kind: BTreeMap<&'static str, usize>,
    /// Average phones per non-deleted person, rounded to 2 decimal places.
    /// Zero when there are no persons.
    pub average_per_person: f64,
    /// Count of non-deleted persons holding zero non-deleted phones.
    pub persons_without_phone: usize,
}

/// Business-rules service composing the phone and person repositories.
///
/// This is the only component allowed to reach across both entity sets.
pub struct PhoneService<P: PhoneRepository, R: PersonRepository> {
    phones: P,
    persons: R,
}

impl<P: PhoneRepository, R: PersonRepository> PhoneService<P, R> {
    /// Creates a service using the provided repository implementations.
    pub fn new(phones: P, persons: R) -> Self {
        Self { phones, persons }
    }

    /// Creates a phone after owner, limit and duplicate checks.
    ///
    /// # Contract
    /// - Owner must exist and be non-deleted.
    /// - Owner must hold fewer than `MAX_PHONES_PER_PERSON` phones.
    /// - Owner must not already have the identical number string.
    /// - On any rejection nothing is persisted.
    pub fn create_phone(&self, input: &NewPhone) -> Result<Phone, PhoneServiceError> {
        if self.persons.get_by_id(input.person_id)?.is_none() {
            warn!(
                "event=phone_create module=service status=rejected reason=owner_not_found person_id={}",
                input.person_id
            );
            return Err(PhoneServiceError::OwnerNotFound(input.person_id));
        }

        let existing = self.phones.get_by_person_id(input.person_id)?;
        if existing.len() >= MAX_PHONES_PER_PERSON {
            warn!(
                "event=phone_create module=service status=rejected reason=limit_exceeded person_id={}",
                input.person_id
            );
            return Err(PhoneServiceError::LimitExceeded(input.person_id));
        }

        if existing.iter().any(|phone| phone.number == input.number) {
            warn!(
                "event=phone_create module=service status=rejected reason=duplicate_number person_id={}",
                input.person_id
            );
            return Err(PhoneServiceError::DuplicateNumber {
                person_id: input.person_id,
                number: input.number.clone(),
            });
        }

        let phone = self.phones.create(input)?;
        info!(
            "event=phone_create module=service status=ok id={} person_id={}",
            phone.id, phone.person_id
        );
        Ok(phone)
    }

    /// Gets one phone by id.
    pub fn get_phone(&self, id: PhoneId) -> Result<Phone, PhoneServiceError> {
        self.phones
            .get_by_id(id)?
            .ok_or(PhoneServiceError::PhoneNotFound(id))
    }

    /// Lists all non-deleted phones.
    pub fn list_phones(&self) -> RepoResult<Vec<Phone>> {
        self.phones.get_all()
    }

    /// Lists non-deleted phones owned by one person.
    pub fn list_phones_by_person(&self, person_id: PersonId) -> RepoResult<Vec<Phone>> {
        self.phones.get_by_person_id(person_id)
    }

    /// Merges patch fields onto an existing phone.
    ///
    /// When the patch moves the phone to a different owner, the limit check
    /// runs against the new owner before anything is applied. The duplicate
    /// check is create-time only and is not re-run here.
    pub fn update_phone(
        &self,
        id: PhoneId,
        patch: &PhonePatch,
    ) -> Result<Phone, PhoneServiceError> {
        let current = self
            .phones
            .get_by_id(id)?
            .ok_or(PhoneServiceError::PhoneNotFound(id))?;

        if let Some(new_owner) = patch.person_id {
            if new_owner != current.person_id {
                let existing = self.phones.get_by_person_id(new_owner)?;
                if existing.len() >= MAX_PHONES_PER_PERSON {
                    warn!(
                        "event=phone_update module=service status=rejected reason=limit_exceeded id={id} person_id={new_owner}"
                    );
                    return Err(PhoneServiceError::LimitExceeded(new_owner));
                }
            }
        }

        match self.phones.update(id, patch)? {
            Some(phone) => {
                info!("event=phone_update module=service status=ok id={id}");
                Ok(phone)
            }
            None => Err(PhoneServiceError::PhoneNotFound(id)),
        }
    }

    /// Soft-deletes one phone by id. Returns whether a record existed.
    pub fn delete_phone(&self, id: PhoneId) -> Result<bool, PhoneServiceError> {
        let deleted = self.phones.soft_delete(id)?;
        if deleted {
            info!("event=phone_delete module=service status=ok id={id}");
        }
        Ok(deleted)
    }

    /// Computes aggregate statistics across all non-deleted phones and
    /// persons.
    ///
    /// Full scan of both entity sets on every call; this is an overview
    /// operation, not a hot path.
    pub fn stats(&self) -> RepoResult<PhoneStats> {
        let phones = self.phones.get_all()?;
        let person_ids = self.persons.active_ids()?;

        let mut phones_by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut owners: HashSet<PersonId> = HashSet::new();
        for phone in &phones {
            *phones_by_kind.entry(phone.kind.as_str()).or_insert(0) += 1;
            owners.insert(phone.person_id);
        }

        let total_phones = phones.len();
        let total_persons = person_ids.len();
        let average_per_person = if total_persons > 0 {
            round_2(total_phones as f64 / total_persons as f64)
        } else {
            0.0
        };
        let persons_without_phone = person_ids
            .iter()
            .filter(|id| !owners.contains(*id))
            .count();

        Ok(PhoneStats {
            total_phones,
            phones_by_kind,
            average_per_person,
            persons_without_phone,
        })
    }
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
