//! User record.
//!
//! # Invariants
//! - `name` and `password` are non-blank on every write.
//! - `email` is non-blank and has a `local@domain` shape; the domain is one
//!   or more dot-separated labels (no top-level label required) or a
//!   bracketed address literal.
//! - `phone` is free text and never validated.

use crate::model::entity::{require_text, Entity, EntityId, EntityKind, EntityValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const LOCAL_CHAR: &str = r"[a-z0-9!#$%&'*+/=?^_`{|}~\x{80}-\x{10FFFF}-]";
const DOMAIN_CHAR: &str = r"[a-z0-9!#$%&'*+/=?^_`{|}~\x{80}-\x{10FFFF}]";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    let label = format!("{DOMAIN_CHAR}+(?:-+{DOMAIN_CHAR}+)*");
    Regex::new(&format!(
        r"(?i)^{LOCAL_CHAR}+(?:\.{LOCAL_CHAR}+)*@(?:{label}(?:\.{label})*|\[[0-9a-f:.]+\])$"
    ))
    .expect("valid email regex")
});

/// Registered participant who can own questions and answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Assigned from `users_seq`; `None` until first persisted.
    #[serde(default)]
    pub user_id: Option<EntityId>,
    pub name: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl User {
    /// Creates an unsaved user without a phone number.
    pub fn new(
        name: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_id: None,
            name: name.into(),
            password: password.into(),
            email: email.into(),
            phone: None,
        }
    }

    /// Builder-style phone setter.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> Option<EntityId> {
        self.user_id
    }

    fn set_id(&mut self, id: Option<EntityId>) {
        self.user_id = id;
    }

    fn validate(&self) -> Result<(), EntityValidationError> {
        require_text(Self::KIND, "name", &self.name)?;
        require_text(Self::KIND, "password", &self.password)?;
        require_text(Self::KIND, "email", &self.email)?;
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(EntityValidationError::InvalidEmail);
        }
        Ok(())
    }
}
