//! Use-case facade over the person repository.
//!
//! # Responsibility
//! - Expose the named people-store operations to callers.
//! - Keep callers decoupled from storage details.

pub mod person_service;
