//! Entity store contract and its generic SQLite implementation.
//!
//! # Responsibility
//! - Provide find-by-id, find-all, insert-or-update and delete-by-id over one
//!   record collection.
//! - Assign identifiers from the kind's sequence on insert.
//!
//! # Invariants
//! - Write paths call `Entity::validate()` before touching the sequence.
//! - `find_all` returns rows in store-native order; no sort is applied.
//! - `delete_by_id` on an absent row is a no-op.

use crate::model::entity::{Entity, EntityId};
use crate::model::{answer::Answer, question::Question, user::User};
use crate::repo::records::SqliteRecord;
use crate::repo::sequence_repo::next_value;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::marker::PhantomData;

/// Persistence contract for one entity kind.
pub trait EntityStore {
    type Entity: Entity;

    /// Loads one record by identifier.
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Self::Entity>>;

    /// Loads every record of this kind.
    fn find_all(&self) -> RepoResult<Vec<Self::Entity>>;

    /// Inserts when `entity.id()` is `None`, otherwise updates in place.
    ///
    /// Returns the persisted record carrying its identifier.
    fn save(&self, entity: &Self::Entity) -> RepoResult<Self::Entity>;

    /// Removes one record by identifier.
    fn delete_by_id(&self, id: EntityId) -> RepoResult<()>;
}

impl<S: EntityStore + ?Sized> EntityStore for &S {
    type Entity = S::Entity;

    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Self::Entity>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> RepoResult<Vec<Self::Entity>> {
        (**self).find_all()
    }

    fn save(&self, entity: &Self::Entity) -> RepoResult<Self::Entity> {
        (**self).save(entity)
    }

    fn delete_by_id(&self, id: EntityId) -> RepoResult<()> {
        (**self).delete_by_id(id)
    }
}

/// SQLite-backed store, one instance per entity kind.
pub struct SqliteEntityStore<'conn, K> {
    conn: &'conn Connection,
    _kind: PhantomData<fn() -> K>,
}

pub type SqliteUserStore<'conn> = SqliteEntityStore<'conn, User>;
pub type SqliteQuestionStore<'conn> = SqliteEntityStore<'conn, Question>;
pub type SqliteAnswerStore<'conn> = SqliteEntityStore<'conn, Answer>;

impl<'conn, K: SqliteRecord> SqliteEntityStore<'conn, K> {
    /// Creates store from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let mut columns = vec![K::ID_COLUMN];
        columns.extend_from_slice(K::COLUMNS);
        ensure_connection_ready(conn, K::TABLE, &columns)?;
        Ok(Self {
            conn,
            _kind: PhantomData,
        })
    }

    /// Counts stored rows of this kind.
    pub fn count(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", K::TABLE),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count in {}", K::TABLE)))
    }

    fn select_sql() -> String {
        format!(
            "SELECT {}, {} FROM {}",
            K::ID_COLUMN,
            K::COLUMNS.join(", "),
            K::TABLE
        )
    }

    fn insert(&self, entity: &K) -> RepoResult<K> {
        let id = next_value(self.conn, K::KIND.sequence_name())?;
        self.write_row(
            &format!(
                "INSERT INTO {} ({}, {}) VALUES ({});",
                K::TABLE,
                K::ID_COLUMN,
                K::COLUMNS.join(", "),
                placeholders(K::COLUMNS.len() + 1)
            ),
            id,
            entity,
        )?;

        let mut saved = entity.clone();
        saved.set_id(Some(id));
        Ok(saved)
    }

    fn upsert(&self, id: EntityId, entity: &K) -> RepoResult<K> {
        let assignments = K::COLUMNS
            .iter()
            .map(|column| format!("{column} = excluded.{column}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.write_row(
            &format!(
                "INSERT INTO {table} ({id_column}, {columns}) VALUES ({values})
                 ON CONFLICT ({id_column}) DO UPDATE SET {assignments};",
                table = K::TABLE,
                id_column = K::ID_COLUMN,
                columns = K::COLUMNS.join(", "),
                values = placeholders(K::COLUMNS.len() + 1),
            ),
            id,
            entity,
        )?;
        Ok(entity.clone())
    }

    fn write_row(&self, sql: &str, id: EntityId, entity: &K) -> RepoResult<()> {
        let mut values = vec![Value::Integer(id)];
        values.extend(entity.to_values());
        self.conn.execute(sql, params_from_iter(values))?;
        Ok(())
    }
}

impl<K: SqliteRecord> EntityStore for SqliteEntityStore<'_, K> {
    type Entity = K;

    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<K>> {
        let sql = format!("{} WHERE {} = ?1;", Self::select_sql(), K::ID_COLUMN);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        let found = rows.next()?.map(parse_record::<K>).transpose()?;
        Ok(found)
    }

    fn find_all(&self) -> RepoResult<Vec<K>> {
        let mut stmt = self.conn.prepare(&format!("{};", Self::select_sql()))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record::<K>(row)?);
        }
        Ok(records)
    }

    fn save(&self, entity: &K) -> RepoResult<K> {
        entity.validate()?;
        match entity.id() {
            None => self.insert(entity),
            Some(id) => self.upsert(id, entity),
        }
    }

    fn delete_by_id(&self, id: EntityId) -> RepoResult<()> {
        self.conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?1;", K::TABLE, K::ID_COLUMN),
            [id],
        )?;
        Ok(())
    }
}

/// Maps a stored row, reporting type mismatches as unreadable data.
fn parse_record<K: SqliteRecord>(row: &Row<'_>) -> RepoResult<K> {
    K::from_row(row).map_err(|err| match err {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => {
            RepoError::InvalidData(format!("{} row: {err}", K::TABLE))
        }
        other => other.into(),
    })
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{placeholders, EntityStore, SqliteQuestionStore, SqliteUserStore};
    use crate::db::open_db_in_memory;
    use crate::model::question::Question;
    use crate::model::user::User;
    use crate::repo::sequence_repo::{IdentifierSequencer, SqliteSequencer};
    use crate::repo::RepoError;

    #[test]
    fn placeholders_are_numbered() {
        assert_eq!(placeholders(3), "?1, ?2, ?3");
    }

    #[test]
    fn insert_assigns_next_sequence_value() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteUserStore::try_new(&conn).unwrap();

        let first = store
            .save(&User::new("ada", "pw", "ada@example.com"))
            .unwrap();
        let second = store
            .save(&User::new("alan", "pw", "alan@example.com"))
            .unwrap();

        assert_eq!(first.user_id, Some(1));
        assert_eq!(second.user_id, Some(2));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn failed_insert_still_consumes_a_sequence_value() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteQuestionStore::try_new(&conn).unwrap();
        let sequencer = SqliteSequencer::try_new(&conn).unwrap();

        let err = store.save(&Question::new("orphan", 404)).unwrap_err();

        assert!(matches!(err, RepoError::ConstraintViolation { .. }));
        assert_eq!(sequencer.current_value("questions_seq").unwrap(), 1);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn invalid_candidate_never_touches_the_sequence() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteUserStore::try_new(&conn).unwrap();
        let sequencer = SqliteSequencer::try_new(&conn).unwrap();

        let err = store.save(&User::new("", "pw", "a@b.io")).unwrap_err();

        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(sequencer.current_value("users_seq").unwrap(), 0);
    }

    #[test]
    fn save_with_id_updates_in_place() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteUserStore::try_new(&conn).unwrap();
        let mut user = store
            .save(&User::new("ada", "pw", "ada@example.com"))
            .unwrap();

        user.phone = Some("555-0100".to_string());
        store.save(&user).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.find_by_id(1).unwrap(), Some(user));
    }

    #[test]
    fn unreadable_row_surfaces_as_invalid_data() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO users (user_id, name, password, email)
             VALUES (1, X'00FF', 'pw', 'ada@example.com');",
            [],
        )
        .unwrap();
        let store = SqliteUserStore::try_new(&conn).unwrap();

        assert!(matches!(
            store.find_by_id(1),
            Err(RepoError::InvalidData(message)) if message.starts_with("users row")
        ));
        assert!(matches!(store.find_all(), Err(RepoError::InvalidData(_))));
    }

    #[test]
    fn delete_absent_row_is_a_no_op() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteUserStore::try_new(&conn).unwrap();
        store.delete_by_id(7).unwrap();
        assert!(store.find_by_id(7).unwrap().is_none());
    }
}
