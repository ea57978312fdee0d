//! People store: a typed facade over a document-style person store.
//! This crate owns the person record shape and the operations callers use
//! to create, read, update and delete people.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::person::{NewPerson, Person, PersonId, PersonSummary, PersonValidationError};
pub use repo::person_repo::{
    PersonQuery, PersonRepository, PersonSort, RepoError, RepoResult, SqlitePersonRepository,
};
pub use service::person_service::{
    sample_person, DeleteOutcome, PersonService, PersonServiceError, ServiceResult,
};
