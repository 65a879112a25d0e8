//! Row mappings between record types and their SQLite tables.

use crate::model::answer::Answer;
use crate::model::entity::Entity;
use crate::model::question::Question;
use crate::model::user::User;
use rusqlite::types::Value;
use rusqlite::Row;

/// Table layout of one entity kind.
///
/// `COLUMNS` lists non-identifier columns in the order `to_values` binds them.
pub trait SqliteRecord: Entity {
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Bind values for `COLUMNS`, in order.
    fn to_values(&self) -> Vec<Value>;

    /// Builds a record from a row selected as `ID_COLUMN, COLUMNS...`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl SqliteRecord for User {
    const TABLE: &'static str = "users";
    const ID_COLUMN: &'static str = "user_id";
    const COLUMNS: &'static [&'static str] = &["name", "password", "email", "phone"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.password.clone()),
            Value::Text(self.email.clone()),
            self.phone.clone().map_or(Value::Null, Value::Text),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: Some(row.get("user_id")?),
            name: row.get("name")?,
            password: row.get("password")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
        })
    }
}

impl SqliteRecord for Question {
    const TABLE: &'static str = "questions";
    const ID_COLUMN: &'static str = "qn_id";
    const COLUMNS: &'static [&'static str] = &["qn", "user_id"];

    fn to_values(&self) -> Vec<Value> {
        vec![Value::Text(self.qn.clone()), Value::Integer(self.user_id)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            qn_id: Some(row.get("qn_id")?),
            qn: row.get("qn")?,
            user_id: row.get("user_id")?,
        })
    }
}

impl SqliteRecord for Answer {
    const TABLE: &'static str = "answers";
    const ID_COLUMN: &'static str = "ans_id";
    const COLUMNS: &'static [&'static str] = &["ans", "qn_id", "user_id"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.ans.clone()),
            Value::Integer(self.qn_id),
            Value::Integer(self.user_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            ans_id: Some(row.get("ans_id")?),
            ans: row.get("ans")?,
            qn_id: row.get("qn_id")?,
            user_id: row.get("user_id")?,
        })
    }
}
