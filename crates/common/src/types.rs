// Core domain types shared across all Ghostwrite crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity;

/// Title given to freshly created documents.
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// A participant in a document: the local human user or a simulated ghost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// `user-…` for the local human, `ghost-…` for simulated participants.
    pub id: String,
    pub name: String,
    /// Palette color, fixed for the lifetime of the identity.
    pub color: String,
    #[serde(default)]
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
    /// Character offset of the participant's caret in the document content.
    #[serde(default)]
    pub cursor_position: usize,
}

impl User {
    pub fn is_ghost(&self) -> bool {
        identity::is_ghost_id(&self.id)
    }
}

/// A collaboratively edited document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Markup string; the single source of truth for rendering.
    #[serde(default)]
    pub content: String,
    pub last_modified: DateTime<Utc>,
    /// Join order is preserved.
    #[serde(default)]
    pub collaborators: Vec<User>,
    /// Starts at 1 and increments once per committed save.
    pub version: u64,
}

impl Document {
    pub fn new(id: String, creator: User, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
            last_modified: now,
            collaborators: vec![creator],
            version: 1,
        }
    }
}

/// Severity of a toast-style notice shown to the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient, user-visible message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self { message: message.into(), severity }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}
