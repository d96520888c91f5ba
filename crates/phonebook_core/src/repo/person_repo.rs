//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD + soft-delete APIs over the `persons` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate model bounds before SQL mutations.
//! - Normal reads exclude soft-deleted rows.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::person::{NewPerson, Person, PersonId, PersonPatch};
use crate::model::ValidationError;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    contact_phone,
    birth_date,
    created_at,
    updated_at,
    is_deleted
FROM persons";

const PERSON_COLUMNS: &[&str] = &[
    "id",
    "name",
    "email",
    "contact_phone",
    "birth_date",
    "created_at",
    "updated_at",
    "is_deleted",
];

/// Default page size when a list call passes no usable limit.
pub const DEFAULT_LIST_LIMIT: u32 = 10;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for person/phone persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind expected {expected_version}; \
                 open connections through db::open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
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

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
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

/// Query options for listing persons.
///
/// Substring filters are case-insensitive and combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonListQuery {
    pub name_contains: Option<String>,
    pub email_contains: Option<String>,
    /// Number of rows to skip.
    pub skip: u32,
    /// Maximum rows to return. Defaults to 10 when `None` or zero.
    pub limit: Option<u32>,
}

/// Repository interface for person CRUD and soft-delete operations.
///
/// Lists are ordered by `id ASC`; with autoincrement ids this is a stable
/// insertion order.
pub trait PersonRepository {
    /// Persists a new person and returns the stored record with its
    /// generated id and default timestamps/flag.
    fn add(&self, person: &NewPerson) -> RepoResult<Person>;
    /// Returns the non-deleted person with the given id, if any.
    fn get_by_id(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Lists non-deleted persons after filters and pagination.
    fn list(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>>;
    /// Merges present patch fields onto the stored record and refreshes the
    /// update timestamp. Returns `None` when no non-deleted row matches.
    fn update(&self, id: PersonId, patch: &PersonPatch) -> RepoResult<Option<Person>>;
    /// Marks the record deleted. Returns whether a non-deleted row was found.
    fn soft_delete(&self, id: PersonId) -> RepoResult<bool>;
    /// Ids of all non-deleted persons, `id ASC`.
    fn active_ids(&self) -> RepoResult<Vec<PersonId>>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_migrated(conn)?;
        ensure_table_ready(conn, "persons", PERSON_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn add(&self, person: &NewPerson) -> RepoResult<Person> {
        person.validate()?;

        self.conn.execute(
            "INSERT INTO persons (name, email, contact_phone, birth_date)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                person.name.as_str(),
                person.email.as_str(),
                person.contact_phone.as_str(),
                person.birth_date.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created person {id} not found on read-back"))
        })
    }

    fn get_by_id(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE id = ?1
               AND is_deleted = 0;"
        ))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn list(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>> {
        let mut sql = format!("{PERSON_SELECT_SQL} WHERE is_deleted = 0");
        let mut bind_values: Vec<Value> = Vec::new();

        // SQLite LIKE is case-insensitive for ASCII, matching the boundary
        // contract of the substring filters.
        if let Some(name) = query.name_contains.as_deref() {
            sql.push_str(" AND name LIKE ?");
            bind_values.push(Value::Text(format!("%{name}%")));
        }
        if let Some(email) = query.email_contains.as_deref() {
            sql.push_str(" AND email LIKE ?");
            bind_values.push(Value::Text(format!("%{email}%")));
        }

        sql.push_str(" ORDER BY id ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_list_limit(
            query.limit,
        ))));
        if query.skip > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.skip)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut persons = Vec::new();

        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }

        Ok(persons)
    }

    fn update(&self, id: PersonId, patch: &PersonPatch) -> RepoResult<Option<Person>> {
        patch.validate()?;

        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = patch.name.as_deref() {
            assignments.push("name = ?");
            bind_values.push(Value::Text(name.to_string()));
        }
        if let Some(email) = patch.email.as_deref() {
            assignments.push("email = ?");
            bind_values.push(Value::Text(email.to_string()));
        }
        if let Some(contact_phone) = patch.contact_phone.as_deref() {
            assignments.push("contact_phone = ?");
            bind_values.push(Value::Text(contact_phone.to_string()));
        }
        if let Some(birth_date) = patch.birth_date.as_deref() {
            assignments.push("birth_date = ?");
            bind_values.push(Value::Text(birth_date.to_string()));
        }
        assignments.push("updated_at = (strftime('%s', 'now') * 1000)");

        let sql = format!(
            "UPDATE persons SET {} WHERE id = ? AND is_deleted = 0;",
            assignments.join(", ")
        );
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Ok(None);
        }

        self.get_by_id(id)?.map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!("updated person {id} not found on read-back"))
        })
    }

    fn soft_delete(&self, id: PersonId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE persons
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND is_deleted = 0;",
            params![id],
        )?;

        Ok(changed > 0)
    }

    fn active_ids(&self) -> RepoResult<Vec<PersonId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM persons WHERE is_deleted = 0 ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}

/// Normalizes a list limit: absent or zero falls back to the default.
pub fn normalize_list_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => DEFAULT_LIST_LIMIT,
        Some(value) => value,
    }
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    Ok(Person {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        contact_phone: row.get("contact_phone")?,
        birth_date: row.get("birth_date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        is_deleted: parse_deleted_flag(row.get("is_deleted")?, "persons")?,
    })
}

pub(crate) fn parse_deleted_flag(value: i64, table: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid is_deleted value `{other}` in {table}.is_deleted"
        ))),
    }
}

pub(crate) fn ensure_connection_migrated(conn: &Connection) -> RepoResult<()> {
    let expected = crate::db::migrations::latest_version();
    let actual = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if actual < expected {
        return Err(RepoError::UninitializedConnection {
            expected_version: expected,
            actual_version: actual,
        });
    }
    Ok(())
}

pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    for column in columns.iter().copied() {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
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

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
