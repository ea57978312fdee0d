//! Person repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the storage requests behind every people-store operation.
//! - Keep SQL details inside the persistence boundary.
//! - Own favorite-food sequence replacement with atomic semantics.
//!
//! # Invariants
//! - Write paths call `Person::validate()` before SQL mutations.
//! - `favorite_foods` round-trips in caller order, duplicates included.
//! - Natural order (`seq ASC`) is insertion order and breaks every sort tie.
//! - Multi-statement writes run inside one transaction.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::person::{Person, PersonId, PersonValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PERSON_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    age
FROM people";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    Db(DbError),
    NotFound(PersonId),
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "person repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "person repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result ordering for person queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersonSort {
    /// Insertion order.
    #[default]
    Natural,
    NameAsc,
}

/// Filter, sort and limit options for listing people.
///
/// Filters combine with AND; unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonQuery {
    /// Exact `name` match.
    pub name: Option<String>,
    /// Exact membership in `favorite_foods`.
    pub food: Option<String>,
    pub sort: PersonSort,
    pub limit: Option<u32>,
}

impl PersonQuery {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_food(food: impl Into<String>) -> Self {
        Self {
            food: Some(food.into()),
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: PersonSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Repository interface for person storage requests.
pub trait PersonRepository {
    /// Inserts one person and returns its id.
    fn insert_person(&self, person: &Person) -> RepoResult<PersonId>;
    /// Inserts all people in one transaction; nothing is stored on failure.
    fn insert_people(&self, people: &[Person]) -> RepoResult<Vec<PersonId>>;
    /// Loads one person by id.
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Lists people matching `query`.
    fn find_people(&self, query: &PersonQuery) -> RepoResult<Vec<Person>>;
    /// Replaces the full stored record identified by `person.id`.
    fn save_person(&self, person: &Person) -> RepoResult<()>;
    /// Sets `age` on the first person named `name` and returns the new state.
    fn set_age_of_first_named(&self, name: &str, age: i64) -> RepoResult<Option<Person>>;
    /// Deletes one person and returns the record as it was before deletion.
    fn delete_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Deletes every person named `name` and returns the deleted count.
    fn delete_people_named(&self, name: &str) -> RepoResult<usize>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_person_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn insert_person(&self, person: &Person) -> RepoResult<PersonId> {
        person.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        insert_person_row(&tx, person)?;
        tx.commit()?;
        Ok(person.id)
    }

    fn insert_people(&self, people: &[Person]) -> RepoResult<Vec<PersonId>> {
        for person in people {
            person.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        for person in people {
            insert_person_row(&tx, person)?;
        }
        tx.commit()?;
        Ok(people.iter().map(|person| person.id).collect())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        load_person(self.conn, id)
    }

    fn find_people(&self, query: &PersonQuery) -> RepoResult<Vec<Person>> {
        let mut sql = format!("{PERSON_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = query.name.as_ref() {
            sql.push_str(" AND name = ?");
            bind_values.push(Value::Text(name.clone()));
        }

        if let Some(food) = query.food.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM person_foods pf
                    WHERE pf.person_uuid = people.uuid
                      AND pf.food = ?
                )",
            );
            bind_values.push(Value::Text(food.clone()));
        }

        sql.push_str(match query.sort {
            PersonSort::Natural => " ORDER BY seq ASC",
            PersonSort::NameAsc => " ORDER BY name ASC, seq ASC",
        });

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(self.conn, row)?);
        }

        Ok(people)
    }

    fn save_person(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE people
             SET
                name = ?2,
                age = ?3
             WHERE uuid = ?1;",
            params![person.id.to_string(), person.name.as_str(), person.age],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(person.id));
        }

        replace_foods(&tx, person.id, &person.favorite_foods)?;
        tx.commit()?;
        Ok(())
    }

    fn set_age_of_first_named(&self, name: &str, age: i64) -> RepoResult<Option<Person>> {
        let tx = self.conn.unchecked_transaction()?;
        let target: Option<String> = tx
            .query_row(
                "SELECT uuid FROM people WHERE name = ?1 ORDER BY seq ASC LIMIT 1;",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        let Some(uuid_text) = target else {
            return Ok(None);
        };

        tx.execute(
            "UPDATE people
             SET
                age = ?2
             WHERE uuid = ?1;",
            params![uuid_text.as_str(), age],
        )?;
        let updated = load_person(&tx, parse_uuid(&uuid_text)?)?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let tx = self.conn.unchecked_transaction()?;
        let Some(snapshot) = load_person(&tx, id)? else {
            return Ok(None);
        };

        tx.execute("DELETE FROM people WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(Some(snapshot))
    }

    fn delete_people_named(&self, name: &str) -> RepoResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM people WHERE name = ?1;", [name])?;
        Ok(deleted)
    }
}

fn insert_person_row(conn: &Connection, person: &Person) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO people (uuid, name, age) VALUES (?1, ?2, ?3);",
        params![person.id.to_string(), person.name.as_str(), person.age],
    )?;
    insert_foods(conn, person.id, &person.favorite_foods)
}

fn insert_foods(conn: &Connection, id: PersonId, foods: &[String]) -> RepoResult<()> {
    let id_text = id.to_string();
    let mut stmt = conn.prepare(
        "INSERT INTO person_foods (person_uuid, position, food) VALUES (?1, ?2, ?3);",
    )?;
    for (position, food) in foods.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| RepoError::InvalidData(format!("food position overflow: {position}")))?;
        stmt.execute(params![id_text.as_str(), position, food.as_str()])?;
    }
    Ok(())
}

fn replace_foods(conn: &Connection, id: PersonId, foods: &[String]) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM person_foods WHERE person_uuid = ?1;",
        [id.to_string()],
    )?;
    insert_foods(conn, id, foods)
}

fn load_person(conn: &Connection, id: PersonId) -> RepoResult<Option<Person>> {
    let mut stmt = conn.prepare(&format!("{PERSON_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_person_row(conn, row)?));
    }
    Ok(None)
}

fn load_foods(conn: &Connection, person_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT food
         FROM person_foods
         WHERE person_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([person_uuid])?;
    let mut foods = Vec::new();
    while let Some(row) = rows.next()? {
        foods.push(row.get(0)?);
    }
    Ok(foods)
}

fn parse_person_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Person> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text)?;

    let person = Person {
        id,
        name: row.get("name")?,
        age: row.get("age")?,
        favorite_foods: load_foods(conn, &uuid_text)?,
    };
    person.validate()?;
    Ok(person)
}

fn parse_uuid(value: &str) -> RepoResult<PersonId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in people.uuid")))
}

fn ensure_person_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["people", "person_foods"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
