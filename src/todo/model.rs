//! Todo entity and request/response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A stored todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Todo {
    /// Assigned by the store; strictly increasing, never reused.
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Nothing sets it yet.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields supplied by the caller when creating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
}

/// Body of `POST /todos`.
///
/// A missing or `null` `text` is an empty title; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

impl CreateTodoRequest {
    /// Parse a request body. It must be a JSON object or `null`; the
    /// derived impl alone would also take an array.
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::from_slice::<Option<Map<String, Value>>>(raw)? {
            Some(object) => serde_json::from_value(Value::Object(object)),
            None => Ok(Self::default()),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a successful `POST /todos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTodo {
    #[serde(rename = "ID")]
    pub id: i64,
}
