//! Core record-keeping logic for the Q&A store.
//! This crate owns entity lifecycles, identifier sequences and the
//! compensation applied when a create fails after consuming an identifier.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::answer::Answer;
pub use model::entity::{Entity, EntityId, EntityKind, EntityValidationError};
pub use model::question::Question;
pub use model::user::User;
pub use repo::entity_repo::{
    EntityStore, SqliteAnswerStore, SqliteEntityStore, SqliteQuestionStore, SqliteUserStore,
};
pub use repo::records::SqliteRecord;
pub use repo::sequence_repo::{IdentifierSequencer, SqliteSequencer};
pub use repo::{RepoError, RepoResult};
pub use service::entity_service::{
    AnswerService, EntityService, QuestionService, ServiceError, ServiceResult,
    SqliteEntityService, UserService,
};

/// Minimal liveness probe for embedding hosts.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
