//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage requests the people store issues.
//! - Isolate SQLite query details from the service facade.
//!
//! # Invariants
//! - Repository writes enforce `Person::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod person_repo;
