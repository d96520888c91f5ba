use phonebook_core::db::open_db_in_memory;
use phonebook_core::{
    NewPerson, PersonListQuery, PersonPatch, PersonRepository, PersonService, PersonServiceError,
    SqlitePersonRepository,
};
use rusqlite::Connection;

fn new_person(name: &str, email: &str) -> NewPerson {
    NewPerson {
        name: name.to_string(),
        email: email.to_string(),
        contact_phone: "119888".to_string(),
        birth_date: "1995-05-15".to_string(),
    }
}

#[test]
fn add_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let created = repo.add(&new_person("Maria", "maria@x.com")).unwrap();
    assert!(created.id > 0);
    assert!(!created.is_deleted);
    assert!(created.created_at > 0);

    let loaded = repo.get_by_id(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.name, "Maria");
    assert_eq!(loaded.email, "maria@x.com");
}

#[test]
fn generated_ids_are_unique_and_increasing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let first = repo.add(&new_person("A", "a@x.com")).unwrap();
    let second = repo.add(&new_person("B", "b@x.com")).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn update_merges_only_present_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let created = repo.add(&new_person("Maria", "maria@x.com")).unwrap();
    let patch = PersonPatch {
        email: Some("maria@y.com".to_string()),
        ..PersonPatch::default()
    };

    let updated = repo.update(created.id, &patch).unwrap().unwrap();
    assert_eq!(updated.name, "Maria");
    assert_eq!(updated.email, "maria@y.com");
    assert_eq!(updated.contact_phone, created.contact_phone);
    assert_eq!(updated.birth_date, created.birth_date);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[test]
fn update_missing_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let patch = PersonPatch {
        name: Some("Ghost".to_string()),
        ..PersonPatch::default()
    };
    assert!(repo.update(4242, &patch).unwrap().is_none());
}

#[test]
fn delete_hides_record_and_sets_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let created = repo.add(&new_person("Maria", "maria@x.com")).unwrap();
    assert!(repo.soft_delete(created.id).unwrap());

    assert!(repo.get_by_id(created.id).unwrap().is_none());

    let (is_deleted, created_at, updated_at): (i64, i64, i64) = conn
        .query_row(
            "SELECT is_deleted, created_at, updated_at FROM persons WHERE id = ?1;",
            [created.id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(is_deleted, 1);
    assert!(updated_at >= created_at);
}

#[test]
fn delete_is_reported_not_found_when_absent_or_repeated() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    assert!(!repo.soft_delete(4242).unwrap());

    let created = repo.add(&new_person("Maria", "maria@x.com")).unwrap();
    assert!(repo.soft_delete(created.id).unwrap());
    assert!(!repo.soft_delete(created.id).unwrap());
}

#[test]
fn update_does_not_resurrect_deleted_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let created = repo.add(&new_person("Maria", "maria@x.com")).unwrap();
    repo.soft_delete(created.id).unwrap();

    let patch = PersonPatch {
        name: Some("Maria II".to_string()),
        ..PersonPatch::default()
    };
    assert!(repo.update(created.id, &patch).unwrap().is_none());
}

#[test]
fn list_excludes_deleted_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let keep = repo.add(&new_person("Keep", "keep@x.com")).unwrap();
    let gone = repo.add(&new_person("Gone", "gone@x.com")).unwrap();
    repo.soft_delete(gone.id).unwrap();

    let listed = repo.list(&PersonListQuery::default()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
}

#[test]
fn list_filters_are_case_insensitive_substrings_combined_with_and() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let joao = repo.add(&new_person("Joao", "joao@x.com")).unwrap();
    let john = repo.add(&new_person("John", "john@y.com")).unwrap();
    repo.add(&new_person("Ana", "ana@x.com")).unwrap();

    let by_name = repo
        .list(&PersonListQuery {
            name_contains: Some("JO".to_string()),
            ..PersonListQuery::default()
        })
        .unwrap();
    let ids: Vec<_> = by_name.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![joao.id, john.id]);

    let by_both = repo
        .list(&PersonListQuery {
            name_contains: Some("jo".to_string()),
            email_contains: Some("y.com".to_string()),
            ..PersonListQuery::default()
        })
        .unwrap();
    assert_eq!(by_both.len(), 1);
    assert_eq!(by_both[0].id, john.id);
}

#[test]
fn list_pagination_is_stable_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut ids = Vec::new();
    for idx in 0..5 {
        let person = repo
            .add(&new_person(&format!("P{idx}"), &format!("p{idx}@x.com")))
            .unwrap();
        ids.push(person.id);
    }

    let page = repo
        .list(&PersonListQuery {
            skip: 1,
            limit: Some(2),
            ..PersonListQuery::default()
        })
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, ids[1]);
    assert_eq!(page[1].id, ids[2]);
}

#[test]
fn list_is_idempotent_without_intervening_writes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    for idx in 0..3 {
        repo.add(&new_person(&format!("P{idx}"), &format!("p{idx}@x.com")))
            .unwrap();
    }

    let query = PersonListQuery {
        limit: Some(10),
        ..PersonListQuery::default()
    };
    let first = repo.list(&query).unwrap();
    let second = repo.list(&query).unwrap();
    assert_eq!(first, second);
}

#[test]
fn service_maps_absence_to_person_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let service = PersonService::new(repo);

    let created = service.create(&new_person("Maria", "maria@x.com")).unwrap();
    assert_eq!(service.get(created.id).unwrap().name, "Maria");

    service.delete(created.id).unwrap();
    assert!(matches!(
        service.get(created.id),
        Err(PersonServiceError::PersonNotFound(id)) if id == created.id
    ));
    assert!(matches!(
        service.delete(created.id),
        Err(PersonServiceError::PersonNotFound(_))
    ));
    assert!(matches!(
        service.update(created.id, &PersonPatch::default()),
        Err(PersonServiceError::PersonNotFound(_))
    ));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqlitePersonRepository::try_new(&conn);
    match result {
        Err(phonebook_core::RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        phonebook_core::db::migrations::latest_version()
    ))
    .unwrap();

    let result = SqlitePersonRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(phonebook_core::RepoError::MissingRequiredTable("persons"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE persons (
            id INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        phonebook_core::db::migrations::latest_version()
    ))
    .unwrap();

    let result = SqlitePersonRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(phonebook_core::RepoError::MissingRequiredColumn {
            table: "persons",
            column: "email"
        })
    ));
}
