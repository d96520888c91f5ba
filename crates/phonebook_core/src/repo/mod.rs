//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must run model validation before SQL mutations.
//! - Lookups by id treat absence as `Option::None`, never as a transport
//!   error; cross-record rules stay in the service layer.

pub mod person_repo;
pub mod phone_repo;
