//! Domain model for the people store.
//!
//! # Responsibility
//! - Define the canonical person record and its derived shapes.
//!
//! # Invariants
//! - Every stored person is identified by a stable `PersonId`.
//! - Deletion is a hard delete owned by the store; there are no tombstones.

pub mod person;
