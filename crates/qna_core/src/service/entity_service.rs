//! Entity lifecycle service.
//!
//! # Responsibility
//! - Provide get/list/create/update/delete for one entity kind, generic over
//!   the store and sequencer implementations.
//! - Undo the sequence advance of a failed create.
//!
//! # Invariants
//! - `update` and `delete` never reach a mutating store call for an id that
//!   does not exist.
//! - `update` always persists under the caller-supplied path id.
//! - A failed compensating reset is logged and never replaces the create
//!   failure that triggered it.
//!
//! # Known limitation
//! Creates are not serialized. A reset after a failed create can rewind past a
//! value a concurrent successful create already consumed; the next insert
//! then collides on the primary key and fails as a constraint violation.
//! Identifier contiguity is best-effort.

use crate::model::entity::{Entity, EntityId, EntityKind, EntityValidationError};
use crate::model::{answer::Answer, question::Question, user::User};
use crate::repo::entity_repo::{EntityStore, SqliteEntityStore};
use crate::repo::records::SqliteRecord;
use crate::repo::sequence_repo::{IdentifierSequencer, SqliteSequencer};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced by lifecycle operations.
#[derive(Debug)]
pub enum ServiceError {
    /// No record of `kind` exists under `id`.
    NotFound { kind: EntityKind, id: EntityId },
    /// Candidate failed required-field rules.
    Validation(EntityValidationError),
    /// Store rejected the write; `detail` is the store's own diagnostic.
    ConstraintViolation { detail: String },
    /// Store could not be reached.
    StoreUnavailable(String),
    /// Any other repository failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ConstraintViolation { detail } => write!(f, "constraint violation: {detail}"),
            Self::StoreUnavailable(message) => write!(f, "store unavailable: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::ConstraintViolation { detail } => Self::ConstraintViolation { detail },
            RepoError::StoreUnavailable(message) => Self::StoreUnavailable(message),
            other => Self::Repo(other),
        }
    }
}

impl From<EntityValidationError> for ServiceError {
    fn from(value: EntityValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Lifecycle service for the entity kind managed by store `S`.
pub struct EntityService<S, Q> {
    store: S,
    sequencer: Q,
}

pub type SqliteEntityService<'conn, K> =
    EntityService<SqliteEntityStore<'conn, K>, SqliteSequencer<'conn>>;
pub type UserService<'conn> = SqliteEntityService<'conn, User>;
pub type QuestionService<'conn> = SqliteEntityService<'conn, Question>;
pub type AnswerService<'conn> = SqliteEntityService<'conn, Answer>;

impl<'conn, K: SqliteRecord> SqliteEntityService<'conn, K> {
    /// Wires a SQLite store and sequencer over one migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteEntityStore::try_new(conn)?,
            SqliteSequencer::try_new(conn)?,
        ))
    }
}

impl<S: EntityStore, Q: IdentifierSequencer> EntityService<S, Q> {
    /// Creates a service from store and sequencer implementations.
    pub fn new(store: S, sequencer: Q) -> Self {
        Self { store, sequencer }
    }

    /// Loads one record or reports `NotFound`.
    pub fn get(&self, id: EntityId) -> ServiceResult<S::Entity> {
        self.store
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound {
                kind: <S::Entity as Entity>::KIND,
                id,
            })
    }

    /// Lists every record in store order.
    pub fn list(&self) -> ServiceResult<Vec<S::Entity>> {
        Ok(self.store.find_all()?)
    }

    /// Persists `candidate` under a freshly assigned identifier.
    ///
    /// Any identifier on `candidate` is ignored. When the store rejects the
    /// write, the kind's sequence is reset to the value read before the
    /// attempt and the store failure is returned unchanged.
    pub fn create(&self, candidate: &S::Entity) -> ServiceResult<S::Entity> {
        candidate.validate()?;

        let kind = <S::Entity as Entity>::KIND;
        let started_at = Instant::now();
        let before_value = self.sequencer.current_value(kind.sequence_name())?;

        let mut candidate = candidate.clone();
        candidate.set_id(None);

        match self.store.save(&candidate) {
            Ok(created) => {
                info!(
                    "event=entity_create module=service status=ok kind={kind} id={} duration_ms={}",
                    created.id().unwrap_or_default(),
                    started_at.elapsed().as_millis()
                );
                Ok(created)
            }
            Err(err) => {
                warn!(
                    "event=entity_create module=service status=error kind={kind} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                self.restore_sequence(kind, before_value);
                Err(err.into())
            }
        }
    }

    /// Overwrites the record stored under `id` with `candidate`'s fields.
    pub fn update(&self, id: EntityId, candidate: &S::Entity) -> ServiceResult<S::Entity> {
        self.require_existing(id)?;

        let mut candidate = candidate.clone();
        candidate.set_id(Some(id));
        candidate.validate()?;

        let updated = self.store.save(&candidate)?;
        info!(
            "event=entity_update module=service status=ok kind={} id={id}",
            <S::Entity as Entity>::KIND
        );
        Ok(updated)
    }

    /// Removes the record stored under `id`.
    pub fn delete(&self, id: EntityId) -> ServiceResult<()> {
        self.require_existing(id)?;
        self.store.delete_by_id(id)?;
        info!(
            "event=entity_delete module=service status=ok kind={} id={id}",
            <S::Entity as Entity>::KIND
        );
        Ok(())
    }

    /// Precondition shared by every mutation of an existing record.
    fn require_existing(&self, id: EntityId) -> ServiceResult<S::Entity> {
        self.get(id)
    }

    fn restore_sequence(&self, kind: EntityKind, before_value: EntityId) {
        let sequence = kind.sequence_name();
        match self.sequencer.reset_value(sequence, before_value) {
            Ok(()) => info!(
                "event=sequence_reset module=service status=ok kind={kind} sequence={sequence} value={before_value}"
            ),
            Err(err) => warn!(
                "event=sequence_reset module=service status=error kind={kind} sequence={sequence} value={before_value} error={err}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceError, UserService};
    use crate::db::open_db_in_memory;
    use crate::model::entity::{EntityKind, EntityValidationError};
    use crate::model::user::User;
    use crate::repo::RepoError;

    #[test]
    fn repo_errors_map_onto_service_taxonomy() {
        let constraint = ServiceError::from(RepoError::ConstraintViolation {
            detail: "FOREIGN KEY constraint failed".to_string(),
        });
        assert!(matches!(constraint, ServiceError::ConstraintViolation { .. }));

        let unavailable = ServiceError::from(RepoError::StoreUnavailable("locked".to_string()));
        assert!(matches!(unavailable, ServiceError::StoreUnavailable(_)));

        let validation = ServiceError::from(RepoError::Validation(
            EntityValidationError::InvalidEmail,
        ));
        assert!(matches!(validation, ServiceError::Validation(_)));

        let other = ServiceError::from(RepoError::UnknownSequence("x_seq".to_string()));
        assert!(matches!(other, ServiceError::Repo(_)));
    }

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = ServiceError::NotFound {
            kind: EntityKind::Question,
            id: 42,
        };
        assert_eq!(err.to_string(), "question not found: 42");
    }

    #[test]
    fn create_ignores_caller_supplied_id() {
        let conn = open_db_in_memory().unwrap();
        let service = UserService::try_new(&conn).unwrap();

        let mut candidate = User::new("ada", "pw", "ada@example.com");
        candidate.user_id = Some(99);

        let created = service.create(&candidate).unwrap();
        assert_eq!(created.user_id, Some(1));
        assert!(matches!(
            service.get(99).unwrap_err(),
            ServiceError::NotFound { id: 99, .. }
        ));
    }
}
