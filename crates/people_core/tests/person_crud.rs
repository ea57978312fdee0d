use people_core::db::open_db_in_memory;
use people_core::{
    NewPerson, Person, PersonQuery, PersonRepository, PersonSort, PersonValidationError,
    RepoError, SqlitePersonRepository,
};
use rusqlite::params;

#[test]
fn insert_and_get_roundtrip_keeps_food_order_and_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let person = Person::from_new(
        NewPerson::new("Ann")
            .age(33)
            .favorite_foods(["tacos", "pizza", "tacos"]),
    );
    let id = repo.insert_person(&person).unwrap();

    let loaded = repo.get_person(id).unwrap().unwrap();
    assert_eq!(loaded, person);
}

#[test]
fn insert_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let err = repo
        .insert_person(&Person::from_new(NewPerson::new("")))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PersonValidationError::MissingName)
    ));
}

#[test]
fn insert_people_is_all_or_nothing_on_store_failure() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let existing = Person::from_new(NewPerson::new("Ann"));
    repo.insert_person(&existing).unwrap();

    let fresh = Person::from_new(NewPerson::new("Bob").favorite_foods(["soup"]));
    let duplicate = Person {
        name: "Clone".to_string(),
        ..existing.clone()
    };
    let err = repo.insert_people(&[fresh.clone(), duplicate]).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    assert!(repo.get_person(fresh.id).unwrap().is_none());
    let foods: i64 = conn
        .query_row("SELECT COUNT(*) FROM person_foods;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foods, 0);
}

#[test]
fn find_people_combines_filters_sort_and_limit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let people: Vec<Person> = [
        NewPerson::new("Zed").favorite_foods(["soup"]),
        NewPerson::new("Amy").favorite_foods(["soup", "tea"]),
        NewPerson::new("Mo").favorite_foods(["tea"]),
        NewPerson::new("Amy"),
    ]
    .into_iter()
    .map(Person::from_new)
    .collect();
    repo.insert_people(&people).unwrap();

    let natural = repo.find_people(&PersonQuery::default()).unwrap();
    let natural_names: Vec<&str> = natural.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(natural_names, vec!["Zed", "Amy", "Mo", "Amy"]);

    let soup_sorted = repo
        .find_people(&PersonQuery::by_food("soup").sort(PersonSort::NameAsc))
        .unwrap();
    let names: Vec<&str> = soup_sorted.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Amy", "Zed"]);

    let sorted_limited = repo
        .find_people(&PersonQuery::default().sort(PersonSort::NameAsc).limit(3))
        .unwrap();
    let ids: Vec<_> = sorted_limited.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![people[1].id, people[3].id, people[2].id]);

    let both = repo
        .find_people(&PersonQuery {
            name: Some("Amy".to_string()),
            food: Some("tea".to_string()),
            ..PersonQuery::default()
        })
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].id, people[1].id);
}

#[test]
fn save_person_replaces_full_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::from_new(NewPerson::new("Ann").age(20).favorite_foods(["a", "b"]));
    repo.insert_person(&person).unwrap();

    person.name = "Anna".to_string();
    person.age = None;
    person.favorite_foods = vec!["c".to_string()];
    repo.save_person(&person).unwrap();

    let loaded = repo.get_person(person.id).unwrap().unwrap();
    assert_eq!(loaded, person);
}

#[test]
fn save_person_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let person = Person::from_new(NewPerson::new("Ghost"));
    let err = repo.save_person(&person).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == person.id));
}

#[test]
fn delete_person_cascades_foods() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let person = Person::from_new(NewPerson::new("Ann").favorite_foods(["x", "y"]));
    repo.insert_person(&person).unwrap();

    let removed = repo.delete_person(person.id).unwrap().unwrap();
    assert_eq!(removed, person);

    let foods: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM person_foods WHERE person_uuid = ?1;",
            params![person.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(foods, 0);
}

#[test]
fn read_rejects_corrupted_uuid() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO people (uuid, name, age) VALUES ('not-a-uuid', 'Ann', NULL);",
        [],
    )
    .unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let err = repo.find_people(&PersonQuery::by_name("Ann")).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn negative_age_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let person = Person::from_new(NewPerson::new("Ann").age(-1));
    repo.insert_person(&person).unwrap();

    let loaded = repo.get_person(person.id).unwrap().unwrap();
    assert_eq!(loaded.age, Some(-1));
}

#[test]
fn negative_age_written_by_another_client_does_not_break_queries() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let mine = Person::from_new(NewPerson::new("Ann").age(5));
    repo.insert_person(&mine).unwrap();

    let foreign_id = uuid::Uuid::new_v4();
    conn.execute(
        "INSERT INTO people (uuid, name, age) VALUES (?1, 'Ann', -40);",
        params![foreign_id.to_string()],
    )
    .unwrap();

    let found = repo.find_people(&PersonQuery::by_name("Ann")).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0], mine);
    assert_eq!(found[1].id, foreign_id);
    assert_eq!(found[1].age, Some(-40));
}
