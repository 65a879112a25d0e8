//! Question record.

use crate::model::entity::{require_text, Entity, EntityId, EntityKind, EntityValidationError};
use serde::{Deserialize, Serialize};

/// A question posted by one user.
///
/// `user_id` is required: a payload without an owner does not deserialize
/// and the column is `NOT NULL`. Whether the owner exists is not checked
/// here; the store's foreign key rejects dangling owners at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Assigned from `questions_seq`; `None` until first persisted.
    #[serde(default)]
    pub qn_id: Option<EntityId>,
    pub qn: String,
    pub user_id: EntityId,
}

impl Question {
    /// Creates an unsaved question owned by `user_id`.
    pub fn new(qn: impl Into<String>, user_id: EntityId) -> Self {
        Self {
            qn_id: None,
            qn: qn.into(),
            user_id,
        }
    }
}

impl Entity for Question {
    const KIND: EntityKind = EntityKind::Question;

    fn id(&self) -> Option<EntityId> {
        self.qn_id
    }

    fn set_id(&mut self, id: Option<EntityId>) {
        self.qn_id = id;
    }

    fn validate(&self) -> Result<(), EntityValidationError> {
        require_text(Self::KIND, "qn", &self.qn)
    }
}
