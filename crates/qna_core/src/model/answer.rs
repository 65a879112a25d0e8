//! Answer record.

use crate::model::entity::{require_text, Entity, EntityId, EntityKind, EntityValidationError};
use serde::{Deserialize, Serialize};

/// An answer given by one user to one question.
///
/// Both references are required; existence is enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Assigned from `answers_seq`; `None` until first persisted.
    #[serde(default)]
    pub ans_id: Option<EntityId>,
    pub ans: String,
    pub qn_id: EntityId,
    pub user_id: EntityId,
}

impl Answer {
    /// Creates an unsaved answer to `qn_id` written by `user_id`.
    pub fn new(ans: impl Into<String>, qn_id: EntityId, user_id: EntityId) -> Self {
        Self {
            ans_id: None,
            ans: ans.into(),
            qn_id,
            user_id,
        }
    }
}

impl Entity for Answer {
    const KIND: EntityKind = EntityKind::Answer;

    fn id(&self) -> Option<EntityId> {
        self.ans_id
    }

    fn set_id(&mut self, id: Option<EntityId>) {
        self.ans_id = id;
    }

    fn validate(&self) -> Result<(), EntityValidationError> {
        require_text(Self::KIND, "ans", &self.ans)
    }
}

#[cfg(test)]
mod tests {
    use super::Answer;
    use crate::model::entity::Entity;

    #[test]
    fn blank_answer_text_is_rejected() {
        assert!(Answer::new("", 1, 1).validate().is_err());
        assert!(Answer::new("42", 1, 1).validate().is_ok());
    }

    #[test]
    fn deserializes_camel_case_payload_without_id() {
        let answer: Answer =
            serde_json::from_str(r#"{"ans":"use a sequence","qnId":3,"userId":7}"#).unwrap();
        assert_eq!(answer.id(), None);
        assert_eq!(answer, Answer::new("use a sequence", 3, 7));
    }

    #[test]
    fn payload_without_question_reference_is_rejected() {
        let err = serde_json::from_str::<Answer>(r#"{"ans":"orphan","userId":7}"#).unwrap_err();
        assert!(err.to_string().contains("qnId"), "{err}");
    }
}
