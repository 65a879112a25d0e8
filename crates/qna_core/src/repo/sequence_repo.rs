//! Identifier sequences backed by the `sequences` table.
//!
//! # Responsibility
//! - Read and force the last consumed value of a named sequence.
//! - Hand out the next value to entity stores on insert.
//!
//! # Invariants
//! - Consumption is committed on its own, before the insert that uses the
//!   value; a failed insert therefore leaves the sequence advanced.
//! - `reset_value` is applied inside one immediate transaction.
//! - Values stay within `0..=EntityId::MAX`; a sequence at `EntityId::MAX`
//!   refuses to advance instead of leaving the integer domain.

use crate::model::entity::EntityId;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::debug;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Named monotonic counter contract used by the lifecycle service.
pub trait IdentifierSequencer {
    /// Returns the last value consumed from `sequence_name` without consuming.
    fn current_value(&self, sequence_name: &str) -> RepoResult<EntityId>;

    /// Forces the last consumed value back to `value`; the next consumption
    /// yields `value + 1`.
    ///
    /// Only meant for undoing the advance of a failed insert. `value` must
    /// leave room for one more consumption.
    fn reset_value(&self, sequence_name: &str, value: EntityId) -> RepoResult<()>;
}

impl<Q: IdentifierSequencer + ?Sized> IdentifierSequencer for &Q {
    fn current_value(&self, sequence_name: &str) -> RepoResult<EntityId> {
        (**self).current_value(sequence_name)
    }

    fn reset_value(&self, sequence_name: &str, value: EntityId) -> RepoResult<()> {
        (**self).reset_value(sequence_name, value)
    }
}

/// SQLite-backed sequencer.
pub struct SqliteSequencer<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSequencer<'conn> {
    /// Creates sequencer from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "sequences", &["name", "last_value"])?;
        Ok(Self { conn })
    }
}

impl IdentifierSequencer for SqliteSequencer<'_> {
    fn current_value(&self, sequence_name: &str) -> RepoResult<EntityId> {
        self.conn
            .query_row(
                "SELECT last_value FROM sequences WHERE name = ?1;",
                [sequence_name],
                |row| row.get::<_, EntityId>(0),
            )
            .optional()?
            .ok_or_else(|| RepoError::UnknownSequence(sequence_name.to_string()))
    }

    fn reset_value(&self, sequence_name: &str, value: EntityId) -> RepoResult<()> {
        if !(0..EntityId::MAX).contains(&value) {
            return Err(RepoError::InvalidSequenceValue {
                name: sequence_name.to_string(),
                value,
            });
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE sequences SET last_value = ?1 WHERE name = ?2;",
            rusqlite::params![value, sequence_name],
        )?;
        if changed == 0 {
            return Err(RepoError::UnknownSequence(sequence_name.to_string()));
        }
        tx.commit()?;

        debug!("event=sequence_reset module=repo status=ok sequence={sequence_name} value={value}");
        Ok(())
    }
}

/// Consumes one value from `sequence_name` in its own statement.
pub(crate) fn next_value(conn: &Connection, sequence_name: &str) -> RepoResult<EntityId> {
    let advanced = conn
        .query_row(
            "UPDATE sequences
             SET last_value = last_value + 1
             WHERE name = ?1 AND last_value < ?2
             RETURNING last_value;",
            rusqlite::params![sequence_name, EntityId::MAX],
            |row| row.get::<_, EntityId>(0),
        )
        .optional()?;
    if let Some(value) = advanced {
        return Ok(value);
    }

    let known = conn
        .query_row(
            "SELECT 1 FROM sequences WHERE name = ?1;",
            [sequence_name],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if known {
        Err(RepoError::SequenceExhausted(sequence_name.to_string()))
    } else {
        Err(RepoError::UnknownSequence(sequence_name.to_string()))
    }
}
