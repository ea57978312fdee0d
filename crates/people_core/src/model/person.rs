//! Person domain model.
//!
//! # Responsibility
//! - Define the single record shape managed by the people store.
//! - Provide creation descriptors and read projections derived from it.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reused.
//! - `name` must be non-empty on every write path.
//! - `favorite_foods` keeps caller order and duplicates.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned to every stored person.
pub type PersonId = Uuid;

/// Validation failures raised before a person reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// `name` is the empty string.
    MissingName,
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "person validation failed: `name` is required"),
        }
    }
}

impl Error for PersonValidationError {}

/// Stored person record.
///
/// Field names are serialized with the external document naming
/// (`_id`, `favoriteFoods`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Store-assigned identity.
    #[serde(rename = "_id")]
    pub id: PersonId,
    pub name: String,
    pub age: Option<i64>,
    /// Ordered, may be empty, duplicates allowed.
    pub favorite_foods: Vec<String>,
}

impl Person {
    /// Builds a stored record from a descriptor with a freshly generated id.
    pub fn from_new(person: NewPerson) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: person.name,
            age: person.age,
            favorite_foods: person.favorite_foods,
        }
    }

    /// Checks record invariants before persistence.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        validate_name(&self.name)
    }
}

/// Creation descriptor: everything a person has except identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    pub name: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub favorite_foods: Vec<String>,
}

impl NewPerson {
    /// Creates a descriptor with only the required `name` set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: None,
            favorite_foods: Vec::new(),
        }
    }

    /// Sets the optional age.
    pub fn age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    /// Replaces the favorite foods sequence.
    pub fn favorite_foods<I, S>(mut self, foods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.favorite_foods = foods.into_iter().map(Into::into).collect();
        self
    }

    /// Checks descriptor invariants before persistence.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        validate_name(&self.name)
    }
}

/// Read projection of a person with `age` omitted.
///
/// Returned by chained queries that exclude the age field; the field is
/// absent from both the type and its serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    #[serde(rename = "_id")]
    pub id: PersonId,
    pub name: String,
    pub favorite_foods: Vec<String>,
}

impl From<Person> for PersonSummary {
    fn from(value: Person) -> Self {
        Self {
            id: value.id,
            name: value.name,
            favorite_foods: value.favorite_foods,
        }
    }
}

fn validate_name(name: &str) -> Result<(), PersonValidationError> {
    if name.is_empty() {
        return Err(PersonValidationError::MissingName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewPerson, Person, PersonSummary, PersonValidationError};

    #[test]
    fn empty_name_fails_validation() {
        let err = NewPerson::new("").validate().unwrap_err();
        assert_eq!(err, PersonValidationError::MissingName);
    }

    #[test]
    fn whitespace_name_is_present() {
        assert!(NewPerson::new(" ").validate().is_ok());
    }

    #[test]
    fn negative_age_is_accepted() {
        let person = Person::from_new(NewPerson::new("Ann").age(-3));
        assert_eq!(person.age, Some(-3));
        assert!(person.validate().is_ok());
    }

    #[test]
    fn summary_drops_age_only() {
        let person = Person::from_new(NewPerson::new("Ann").age(41).favorite_foods(["tacos"]));
        let summary = PersonSummary::from(person.clone());
        assert_eq!(summary.id, person.id);
        assert_eq!(summary.name, "Ann");
        assert_eq!(summary.favorite_foods, vec!["tacos".to_string()]);
    }
}
