// Events the editor emits for the UI layer to render.

use chrono::{DateTime, Utc};
use ghostwrite_common::text::stats::TextStats;
use ghostwrite_common::types::{Notice, User};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// Toast-style message.
    Notice(Notice),
    /// A ghost started typing. Fire-and-forget; a matching `TypingStopped`
    /// follows unless the document is closed first.
    TypingStarted { doc_id: String, name: String, color: String },
    TypingStopped { doc_id: String, name: String },
    /// The online subset of the open document's roster changed.
    RosterChanged { doc_id: String, online: Vec<User> },
    /// The open document's content changed underneath the local user.
    ContentChanged { doc_id: String, content: String, stats: TextStats },
    Saved { doc_id: String, version: u64, at: DateTime<Utc> },
    /// The document list changed (create/delete).
    DocumentsChanged,
}

impl EditorEvent {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Notice(notice) => Some(notice),
            _ => None,
        }
    }
}
