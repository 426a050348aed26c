//! Domain DTOs for the task API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently of
//! the mock-server crate; integration tests catch any drift between the two.
//! The task identifier travels as `_id` on the wire (the backend's field
//! name); due dates are typed `NaiveDate` because they travel as
//! `YYYY-MM-DD`, while due times stay opaque `HH:MM` strings exactly as the
//! time input produced them — retyping them would silently rewrite the wire
//! format.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the implicit default list. It exists conceptually even when the
/// server's list collection omits it.
pub const GENERAL_LIST: &str = "General";

/// Task priority. The server treats an omitted priority as medium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A single task returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, rename = "dueTime", skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// The list this task belongs to; an absent list means the implicit
    /// default.
    pub fn list_name(&self) -> &str {
        self.list.as_deref().unwrap_or(GENERAL_LIST)
    }
}

/// Request payload for creating a task.
///
/// Fields the user left at their defaults are omitted, not nulled: omission
/// means "use the server default", never "clear an existing value".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, rename = "dueTime", skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Request payload for updating an existing task. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, rename = "dueTime", skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// A named grouping of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub name: String,
}

/// Confirmation payload for a delete. The server may attach a refreshed task
/// collection but never echoes the deleted identifier, so callers must
/// already know which local entry to drop.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteReceipt {
    pub message: String,
    #[serde(default)]
    pub todos: Option<Vec<Task>>,
}

/// Login request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login payload. The user descriptor is opaque to this crate and
/// persisted verbatim for the host.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}
