//! Phone repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD + soft-delete APIs over the `phones` table, scoped by
//!   owning person where needed.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate number format before SQL mutations.
//! - Normal reads exclude soft-deleted rows.
//! - Per-owner limit and duplicate rules are enforced one layer up, in
//!   `service::phone_service`.

use crate::model::person::PersonId;
use crate::model::phone::{NewPhone, Phone, PhoneId, PhoneKind, PhonePatch};
use crate::repo::person_repo::{
    ensure_connection_migrated, ensure_table_ready, parse_deleted_flag, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PHONE_SELECT_SQL: &str = "SELECT
    id,
    number,
    kind,
    person_id,
    created_at,
    updated_at,
    is_deleted
FROM phones";

const PHONE_COLUMNS: &[&str] = &[
    "id",
    "number",
    "kind",
    "person_id",
    "created_at",
    "updated_at",
    "is_deleted",
];

/// Repository interface for phone CRUD and soft-delete operations.
///
/// Lists are ordered by `id ASC`.
pub trait PhoneRepository {
    /// Persists a new phone and returns the stored record with its
    /// generated id and default timestamps/flag.
    fn create(&self, phone: &NewPhone) -> RepoResult<Phone>;
    /// Returns the non-deleted phone with the given id, if any.
    fn get_by_id(&self, id: PhoneId) -> RepoResult<Option<Phone>>;
    /// Returns all non-deleted phones.
    fn get_all(&self) -> RepoResult<Vec<Phone>>;
    /// Returns all non-deleted phones owned by one person.
    fn get_by_person_id(&self, person_id: PersonId) -> RepoResult<Vec<Phone>>;
    /// Merges present patch fields onto the stored record and refreshes the
    /// update timestamp. Returns `None` when no non-deleted row matches.
    fn update(&self, id: PhoneId, patch: &PhonePatch) -> RepoResult<Option<Phone>>;
    /// Marks the record deleted. Returns whether a non-deleted row was found.
    fn soft_delete(&self, id: PhoneId) -> RepoResult<bool>;
}

/// SQLite-backed phone repository.
pub struct SqlitePhoneRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePhoneRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_migrated(conn)?;
        ensure_table_ready(conn, "phones", PHONE_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl PhoneRepository for SqlitePhoneRepository<'_> {
    fn create(&self, phone: &NewPhone) -> RepoResult<Phone> {
        phone.validate()?;

        self.conn.execute(
            "INSERT INTO phones (number, kind, person_id)
             VALUES (?1, ?2, ?3);",
            params![
                phone.number.as_str(),
                phone.kind.as_str(),
                phone.person_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created phone {id} not found on read-back"))
        })
    }

    fn get_by_id(&self, id: PhoneId) -> RepoResult<Option<Phone>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PHONE_SELECT_SQL}
             WHERE id = ?1
               AND is_deleted = 0;"
        ))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_phone_row(row)?));
        }

        Ok(None)
    }

    fn get_all(&self) -> RepoResult<Vec<Phone>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PHONE_SELECT_SQL} WHERE is_deleted = 0 ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        collect_phones(&mut rows)
    }

    fn get_by_person_id(&self, person_id: PersonId) -> RepoResult<Vec<Phone>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PHONE_SELECT_SQL}
             WHERE person_id = ?1
               AND is_deleted = 0
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params![person_id])?;
        collect_phones(&mut rows)
    }

    fn update(&self, id: PhoneId, patch: &PhonePatch) -> RepoResult<Option<Phone>> {
        patch.validate()?;

        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(number) = patch.number.as_deref() {
            assignments.push("number = ?");
            bind_values.push(Value::Text(number.to_string()));
        }
        if let Some(kind) = patch.kind {
            assignments.push("kind = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }
        if let Some(person_id) = patch.person_id {
            assignments.push("person_id = ?");
            bind_values.push(Value::Integer(person_id));
        }
        assignments.push("updated_at = (strftime('%s', 'now') * 1000)");

        let sql = format!(
            "UPDATE phones SET {} WHERE id = ? AND is_deleted = 0;",
            assignments.join(", ")
        );
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Ok(None);
        }

        self.get_by_id(id)?.map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!("updated phone {id} not found on read-back"))
        })
    }

    fn soft_delete(&self, id: PhoneId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE phones
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND is_deleted = 0;",
            params![id],
        )?;

        Ok(changed > 0)
    }
}

fn collect_phones(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Phone>> {
    let mut phones = Vec::new();
    while let Some(row) = rows.next()? {
        phones.push(parse_phone_row(row)?);
    }
    Ok(phones)
}

fn parse_phone_row(row: &Row<'_>) -> RepoResult<Phone> {
    let kind_text: String = row.get("kind")?;
    let kind = PhoneKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid phone kind `{kind_text}` in phones.kind"))
    })?;

    Ok(Phone {
        id: row.get("id")?,
        number: row.get("number")?,
        kind,
        person_id: row.get("person_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        is_deleted: parse_deleted_flag(row.get("is_deleted")?, "phones")?,
    })
}
