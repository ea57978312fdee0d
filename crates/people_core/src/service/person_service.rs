//! Person use-case service.
//!
//! # Responsibility
//! - Provide the ten people-store operations as named methods.
//! - Turn each call into exactly one repository request (or one
//!   read-modify-write pair for `find_edit_then_save`).
//! - Emit one outcome diagnostic per call.
//!
//! # Invariants
//! - Every method returns exactly one of a result or an error.
//! - Store errors are forwarded without retry or reclassification.
//! - The service holds no copy of stored data between calls.

use crate::model::person::{NewPerson, Person, PersonId, PersonSummary};
use crate::repo::person_repo::{PersonQuery, PersonRepository, PersonSort, RepoError};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Food appended by `find_edit_then_save`.
pub const FOOD_TO_ADD: &str = "Hamburger";
/// Age written by `find_and_update`.
pub const AGE_TO_SET: i64 = 20;
/// Name removed by `remove_many_people`.
pub const NAME_TO_REMOVE: &str = "Mary";
/// Food filter used by `query_chain`.
pub const FOOD_TO_SEARCH: &str = "burritos";
/// Result cap used by `query_chain`.
pub const QUERY_CHAIN_LIMIT: u32 = 2;

/// Service error for person use-cases.
#[derive(Debug)]
pub enum PersonServiceError {
    /// Target person does not exist.
    PersonNotFound(PersonId),
    /// Store failure, forwarded unchanged.
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
        match value {
            RepoError::NotFound(id) => Self::PersonNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, PersonServiceError>;

/// Outcome of a bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: usize,
}

/// Fixed record stored by `create_and_save_person`.
pub fn sample_person() -> NewPerson {
    NewPerson::new("John Doe")
        .age(30)
        .favorite_foods(["Pizza", "Burger"])
}

/// People store facade over a repository implementation.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores the fixed sample person and returns it with its id.
    pub fn create_and_save_person(&self) -> ServiceResult<Person> {
        let started_at = Instant::now();
        let person = Person::from_new(sample_person());
        let result = self
            .repo
            .insert_person(&person)
            .map(|_| person)
            .map_err(PersonServiceError::from);
        log_outcome("person_create", started_at, result, |person| {
            format!("person_id={}", person.id)
        })
    }

    /// Stores every descriptor in one all-or-nothing request.
    pub fn create_many_people(&self, people: &[NewPerson]) -> ServiceResult<Vec<Person>> {
        let started_at = Instant::now();
        let records: Vec<Person> = people.iter().cloned().map(Person::from_new).collect();
        let result = self
            .repo
            .insert_people(&records)
            .map(|_| records)
            .map_err(PersonServiceError::from);
        log_outcome("person_create_many", started_at, result, |people| {
            format!("count={}", people.len())
        })
    }

    /// Lists every person whose name equals `name` exactly.
    pub fn find_people_by_name(&self, name: &str) -> ServiceResult<Vec<Person>> {
        let started_at = Instant::now();
        let result = self
            .repo
            .find_people(&PersonQuery::by_name(name))
            .map_err(PersonServiceError::from);
        log_outcome("person_find_by_name", started_at, result, |people| {
            format!("count={}", people.len())
        })
    }

    /// Returns the first person listing `food` among their favorites.
    pub fn find_one_by_food(&self, food: &str) -> ServiceResult<Option<Person>> {
        let started_at = Instant::now();
        let result = self
            .repo
            .find_people(&PersonQuery::by_food(food).limit(1))
            .map(|people| people.into_iter().next())
            .map_err(PersonServiceError::from);
        log_outcome("person_find_by_food", started_at, result, describe_optional)
    }

    /// Loads one person by id.
    pub fn find_person_by_id(&self, id: PersonId) -> ServiceResult<Option<Person>> {
        let started_at = Instant::now();
        let result = self.repo.get_person(id).map_err(PersonServiceError::from);
        log_outcome("person_find_by_id", started_at, result, describe_optional)
    }

    /// Loads one person, appends `"Hamburger"` to their foods and saves the
    /// full record.
    ///
    /// Returns `PersonNotFound` when `id` does not exist.
    pub fn find_edit_then_save(&self, id: PersonId) -> ServiceResult<Person> {
        let started_at = Instant::now();
        let result = self.edit_then_save(id);
        log_outcome("person_edit_save", started_at, result, |person| {
            format!(
                "person_id={} food_count={}",
                person.id,
                person.favorite_foods.len()
            )
        })
    }

    /// Sets `age` to 20 on the first person named `name`.
    ///
    /// Returns the post-update record, or `None` when nobody matches.
    pub fn find_and_update(&self, name: &str) -> ServiceResult<Option<Person>> {
        let started_at = Instant::now();
        let result = self
            .repo
            .set_age_of_first_named(name, AGE_TO_SET)
            .map_err(PersonServiceError::from);
        log_outcome("person_find_update", started_at, result, describe_optional)
    }

    /// Deletes one person and returns the pre-deletion snapshot.
    ///
    /// An unknown id yields `Ok(None)`.
    pub fn remove_by_id(&self, id: PersonId) -> ServiceResult<Option<Person>> {
        let started_at = Instant::now();
        let result = self.repo.delete_person(id).map_err(PersonServiceError::from);
        log_outcome("person_remove", started_at, result, describe_optional)
    }

    /// Deletes every person named `"Mary"`.
    pub fn remove_many_people(&self) -> ServiceResult<DeleteOutcome> {
        let started_at = Instant::now();
        let result = self
            .repo
            .delete_people_named(NAME_TO_REMOVE)
            .map(|deleted_count| DeleteOutcome { deleted_count })
            .map_err(PersonServiceError::from);
        log_outcome("person_remove_many", started_at, result, |outcome| {
            format!("deleted_count={}", outcome.deleted_count)
        })
    }

    /// Finds people who like `"burritos"`, sorted by name, at most two, with
    /// `age` left out.
    pub fn query_chain(&self) -> ServiceResult<Vec<PersonSummary>> {
        let started_at = Instant::now();
        let query = PersonQuery::by_food(FOOD_TO_SEARCH)
            .sort(PersonSort::NameAsc)
            .limit(QUERY_CHAIN_LIMIT);
        let result: ServiceResult<Vec<PersonSummary>> = self
            .repo
            .find_people(&query)
            .map(|people| people.into_iter().map(PersonSummary::from).collect())
            .map_err(PersonServiceError::from);
        log_outcome("person_query_chain", started_at, result, |people| {
            format!("count={}", people.len())
        })
    }

    fn edit_then_save(&self, id: PersonId) -> ServiceResult<Person> {
        let mut person = self
            .repo
            .get_person(id)?
            .ok_or(PersonServiceError::PersonNotFound(id))?;
        person.favorite_foods.push(FOOD_TO_ADD.to_string());
        self.repo.save_person(&person)?;
        Ok(person)
    }
}

fn describe_optional(person: &Option<Person>) -> String {
    match person {
        Some(person) => format!("found=true person_id={}", person.id),
        None => "found=false".to_string(),
    }
}

fn log_outcome<T>(
    event: &'static str,
    started_at: Instant,
    result: ServiceResult<T>,
    describe: impl FnOnce(&T) -> String,
) -> ServiceResult<T> {
    match &result {
        Ok(value) => info!(
            "event={} module=service status=ok duration_ms={} {}",
            event,
            started_at.elapsed().as_millis(),
            describe(value)
        ),
        Err(err) => error!(
            "event={} module=service status=error duration_ms={} error={}",
            event,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
