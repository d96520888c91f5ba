use phonebook_core::db::open_db_in_memory;
use phonebook_core::{
    NewPerson, NewPhone, PersonRepository, PhoneKind, PhonePatch, PhoneService, PhoneServiceError,
    SqlitePersonRepository, SqlitePhoneRepository,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> PhoneService<SqlitePhoneRepository<'_>, SqlitePersonRepository<'_>> {
    let phones = SqlitePhoneRepository::try_new(conn).unwrap();
    let persons = SqlitePersonRepository::try_new(conn).unwrap();
    PhoneService::new(phones, persons)
}

fn add_person(conn: &Connection, name: &str) -> i64 {
    let repo = SqlitePersonRepository::try_new(conn).unwrap();
    repo.add(&NewPerson {
        name: name.to_string(),
        email: format!("{}@x.com", name.to_lowercase()),
        contact_phone: "119888".to_string(),
        birth_date: "1995-05-15".to_string(),
    })
    .unwrap()
    .id
}

fn new_phone(person_id: i64, number: &str) -> NewPhone {
    NewPhone {
        number: number.to_string(),
        kind: PhoneKind::Cellular,
        person_id,
    }
}

#[test]
fn create_fails_with_owner_not_found_for_missing_person() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create_phone(&new_phone(4242, "11999999999")).unwrap_err();
    assert!(matches!(err, PhoneServiceError::OwnerNotFound(4242)));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM phones;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn create_fails_with_owner_not_found_for_deleted_person() {
    let conn = open_db_in_memory().unwrap();
    let owner = add_person(&conn, "Maria");
    {
        let repo = SqlitePersonRepository::try_new(&conn).unwrap();
        assert!(repo.soft_delete(owner).unwrap());
    }

    let service = service(&conn);
    let err = service
        .create_phone(&new_phone(owner, "11999999999"))
        .unwrap_err();
    assert!(matches!(err, PhoneServiceError::OwnerNotFound(id) if id == owner));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM phones;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn fourth_phone_fails_with_limit_exceeded_and_leaves_existing_untouched() {
    let conn = open_db_in_memory().unwrap();
    let owner = add_person(&conn, "Maria");
    let service = service(&conn);

    for idx in 0..3 {
        service
            .create_phone(&new_phone(owner, &format!("1199999000{idx}")))
            .unwrap();
    }

    let err = service
        .create_phone(&new_phone(owner, "11999990009"))
        .unwrap_err();
    assert!(matches!(err, PhoneServiceError::LimitExceeded(id) if id == owner));

    let remaining = service.list_phones_by_person(owner).unwrap();
    assert_eq!(remaining.len(), 3);
    assert!(remaining.iter().all(|phone| !phone.is_deleted));
}

#[test]
fn duplicate_number_for_same_owner_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let owner = add_person(&conn, "Maria");
    let service = service(&conn);

    service.create_phone(&new_phone(owner, "11999999999")).unwrap();
    let err = service
        .create_phone(&new_phone(owner, "11999999999"))
        .unwrap_err();
    assert!(matches!(
        err,
        PhoneServiceError::DuplicateNumber { person_id, ref number }
            if person_id == owner && number == "11999999999"
    ));
}

#[test]
fn duplicate_check_is_exact_string_match_without_normalization() {
    let conn = open_db_in_memory().unwrap();
    let owner = add_person(&conn, "Maria");
    let service = service(&conn);

    service.create_phone(&new_phone(owner, "11999999999")).unwrap();
    // Same digits, different formatting: accepted, the check does not strip
    // formatting characters.
    service
        .create_phone(&new_phone(owner, "(11) 99999-9999"))
        .unwrap();
}

#[test]
fn same_number_is_allowed_for_different_owners() {
    let conn = open_db_in_memory().unwrap();
    let maria = add_person(&conn, "Maria");
    let ana = add_person(&conn, "Ana");
    let service = service(&conn);

    service.create_phone(&new_phone(maria, "11999999999")).unwrap();
    service.create_phone(&new_phone(ana, "11999999999")).unwrap();
}

#[test]
fn deleting_a_phone_frees_one_slot() {
    let conn = open_db_in_memory().unwrap();
    let owner = add_person(&conn, "Maria");
    let service = service(&conn);

    let mut ids = Vec::new();
    for idx in 0..3 {
        let phone = service
            .create_phone(&new_phone(owner, &format!("1199999000{idx}")))
            .unwrap();
        ids.push(phone.id);
    }
    assert!(matches!(
        service.create_phone(&new_phone(owner, "11999990009")),
        Err(PhoneServiceError::LimitExceeded(_))
    ));

    assert!(service.delete_phone(ids[0]).unwrap());

    service.create_phone(&new_phone(owner, "11999990009")).unwrap();
    assert_eq!(service.list_phones_by_person(owner).unwrap().len(), 3);
}

#[test]
fn delete_reports_whether_a_record_existed() {
    let conn = open_db_in_memory().unwrap();
    let owner = add_person(&conn, "Maria");
    let service = service(&conn);

    let phone = service.create_phone(&new_phone(owner, "11999999999")).unwrap();
    assert!(service.delete_phone(phone.id).unwrap());
    assert!(!service.delete_phone(phone.id).unwrap());
    assert!(!service.delete_phone(4242).unwrap());
}

#[test]
fn update_moving_owner_rechecks_limit_against_new_owner() {
    let conn = open_db_in_memory().unwrap();
    let maria = add_person(&conn, "Maria");
    let ana = add_person(&conn, "Ana");
    let service = service(&conn);

    for idx in 0..3 {
        service
            .create_phone(&new_phone(ana, &format!("1199999100{idx}")))
            .unwrap();
    }
    let phone = service.create_phone(&new_phone(maria, "11999990000")).unwrap();

    let patch = PhonePatch {
        person_id: Some(ana),
        ..PhonePatch::default()
    };
    let err = service.update_phone(phone.id, &patch).unwrap_err();
    assert!(matches!(err, PhoneServiceError::LimitExceeded(id) if id == ana));

    // Still owned by Maria.
    assert_eq!(service.get_phone(phone.id).unwrap().person_id, maria);
}

#[test]
fn update_keeping_owner_skips_limit_recheck() {
    let conn = open_db_in_memory().unwrap();
    let owner = add_person(&conn, "Maria");
    let service = service(&conn);

    let mut last = 0;
    for idx in 0..3 {
        last = service
            .create_phone(&new_phone(owner, &format!("1199999000{idx}")))
            .unwrap()
            .id;
    }

    // Owner already at the limit; a same-owner patch must still apply.
    let patch = PhonePatch {
        person_id: Some(owner),
        kind: Some(PhoneKind::Residential),
        ..PhonePatch::default()
    };
    let updated = service.update_phone(last, &patch).unwrap();
    assert_eq!(updated.kind, PhoneKind::Residential);
}

#[test]
fn update_does_not_recheck_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let owner = add_person(&conn, "Maria");
    let service = service(&conn);

    service.create_phone(&new_phone(owner, "11999990000")).unwrap();
    let second = service.create_phone(&new_phone(owner, "11999990001")).unwrap();

    // Inherited create/update asymmetry: renaming onto an existing number
    // succeeds.
    let patch = PhonePatch {
        number: Some("11999990000".to_string()),
        ..PhonePatch::default()
    };
    let updated = service.update_phone(second.id, &patch).unwrap();
    assert_eq!(updated.number, "11999990000");
}

#[test]
fn update_missing_phone_fails_with_phone_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .update_phone(4242, &PhonePatch::default())
        .unwrap_err();
    assert!(matches!(err, PhoneServiceError::PhoneNotFound(4242)));
}
