//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce cross-record business rules no single repository can see.

pub mod person_service;
pub mod phone_service;
