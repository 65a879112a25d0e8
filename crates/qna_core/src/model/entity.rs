//! Shared entity capability contract.
//!
//! # Responsibility
//! - Describe what the generic lifecycle service needs from an entity kind:
//!   an identifier slot, a sequence name, and write-path validation.
//!
//! # Invariants
//! - An identifier, once assigned by the store, never changes.
//! - `validate()` is pure and never touches storage.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Integer identifier assigned from a named sequence.
pub type EntityId = i64;

/// The three record collections kept by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Question,
    Answer,
}

impl EntityKind {
    /// All kinds, in foreign-key dependency order.
    pub const ALL: [EntityKind; 3] = [Self::User, Self::Question, Self::Answer];

    /// Stable lowercase name used in log lines and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }

    /// Name of the sequence that hands out identifiers for this kind.
    pub fn sequence_name(self) -> &'static str {
        match self {
            Self::User => "users_seq",
            Self::Question => "questions_seq",
            Self::Answer => "answers_seq",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability set every managed record type provides.
pub trait Entity: Clone + Debug {
    /// Kind tag used for sequence lookup and not-found reporting.
    const KIND: EntityKind;

    /// Returns the assigned identifier, or `None` before first persistence.
    fn id(&self) -> Option<EntityId>;

    /// Overwrites the identifier slot.
    fn set_id(&mut self, id: Option<EntityId>);

    /// Checks required-field rules on a write candidate.
    fn validate(&self) -> Result<(), EntityValidationError>;
}

/// Required-field violations detected before a write reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityValidationError {
    /// Required text field is empty or whitespace-only.
    BlankField {
        kind: EntityKind,
        field: &'static str,
    },
    /// Email does not have a `local@domain` shape.
    InvalidEmail,
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { kind, field } => {
                write!(f, "{kind}.{field} must not be blank")
            }
            Self::InvalidEmail => write!(f, "user.email must be a well-formed email address"),
        }
    }
}

impl Error for EntityValidationError {}

pub(crate) fn require_text(
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), EntityValidationError> {
    if value.trim().is_empty() {
        return Err(EntityValidationError::BlankField { kind, field });
    }
    Ok(())
}
