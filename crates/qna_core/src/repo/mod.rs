//! Repository layer: entity stores and identifier sequences.
//!
//! # Responsibility
//! - Define the store/sequencer contracts the lifecycle service consumes.
//! - Isolate SQLite query details and error classification from services.
//!
//! # Invariants
//! - Store write paths call `Entity::validate()` before any SQL mutation.
//! - SQLite constraint failures surface as `RepoError::ConstraintViolation`,
//!   connectivity failures as `RepoError::StoreUnavailable`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::entity::EntityValidationError;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entity_repo;
pub mod records;
pub mod sequence_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failures reported by entity stores and identifier sequencers.
#[derive(Debug)]
pub enum RepoError {
    /// Write candidate failed required-field rules; no SQL was executed.
    Validation(EntityValidationError),
    /// Store rejected a write (foreign key, not-null, uniqueness, check).
    ConstraintViolation { detail: String },
    /// Store could not be reached or is temporarily locked.
    StoreUnavailable(String),
    /// Named sequence is not registered in the `sequences` table.
    UnknownSequence(String),
    /// Sequence reset target is outside the sequence's domain.
    InvalidSequenceValue { name: String, value: i64 },
    /// Sequence already handed out its largest representable value.
    SequenceExhausted(String),
    /// Any other SQLite/bootstrap failure.
    Db(DbError),
    /// Persisted row cannot be mapped back to a record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ConstraintViolation { detail } => write!(f, "constraint violation: {detail}"),
            Self::StoreUnavailable(message) => write!(f, "store unavailable: {message}"),
            Self::UnknownSequence(name) => write!(f, "unknown sequence `{name}`"),
            Self::InvalidSequenceValue { name, value } => {
                write!(f, "value {value} is out of range for sequence `{name}`")
            }
            Self::SequenceExhausted(name) => write!(f, "sequence `{name}` is exhausted"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
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

impl From<EntityValidationError> for RepoError {
    fn from(value: EntityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match value.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation {
                detail: constraint_detail(&value),
            },
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase,
            ) => Self::StoreUnavailable(value.to_string()),
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Keeps SQLite's own message plus the extended result code, which tells a
/// foreign-key failure (787) apart from not-null (1299) or unique (2067).
fn constraint_detail(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => format!(
            "{} (sqlite extended code {})",
            message.as_deref().unwrap_or("constraint failed"),
            code.extended_code
        ),
        other => other.to_string(),
    }
}

pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
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

#[cfg(test)]
mod tests {
    use super::RepoError;
    use crate::db::open_db_in_memory;

    #[test]
    fn foreign_key_failure_maps_to_constraint_violation() {
        let conn = open_db_in_memory().unwrap();
        let err = conn
            .execute(
                "INSERT INTO questions (qn_id, qn, user_id) VALUES (1, 'orphan', 404);",
                [],
            )
            .unwrap_err();

        match RepoError::from(err) {
            RepoError::ConstraintViolation { detail } => {
                assert!(detail.contains("FOREIGN KEY"), "{detail}");
                assert!(detail.contains("787"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn not_null_failure_maps_to_constraint_violation() {
        let conn = open_db_in_memory().unwrap();
        let err = conn
            .execute(
                "INSERT INTO users (user_id, name, password, email) VALUES (1, NULL, 'p', 'a@b.c');",
                [],
            )
            .unwrap_err();

        assert!(matches!(
            RepoError::from(err),
            RepoError::ConstraintViolation { .. }
        ));
    }

    #[test]
    fn missing_owner_reference_maps_to_constraint_violation() {
        let conn = open_db_in_memory().unwrap();
        let err = conn
            .execute(
                "INSERT INTO questions (qn_id, qn, user_id) VALUES (1, 'whose?', NULL);",
                [],
            )
            .unwrap_err();

        match RepoError::from(err) {
            RepoError::ConstraintViolation { detail } => {
                assert!(detail.contains("NOT NULL"), "{detail}");
                assert!(detail.contains("1299"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn syntax_error_stays_a_db_error() {
        let conn = open_db_in_memory().unwrap();
        let err = conn.execute("SELEKT 1;", []).unwrap_err();
        assert!(matches!(RepoError::from(err), RepoError::Db(_)));
    }
}
