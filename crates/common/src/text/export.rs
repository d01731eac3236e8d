// Plain-text export: `<title>.txt` with the markup stripped.

use serde::{Deserialize, Serialize};

use super::plain_text;
use crate::types::{Document, DEFAULT_TITLE};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlainTextExport {
    pub file_name: String,
    pub body: String,
}

pub fn export_plain_text(doc: &Document) -> PlainTextExport {
    PlainTextExport { file_name: export_file_name(&doc.title), body: plain_text(&doc.content) }
}

/// Build a safe file name from a document title.
///
/// Path separators and control characters are replaced with `-`; a blank
/// title falls back to the default document title.
pub fn export_file_name(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '-' } else { c })
        .collect();

    let stem = if cleaned.trim_matches(|c| c == '-' || c == '.').is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        cleaned
    };
    format!("{stem}.txt")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::User;

    fn doc(title: &str, content: &str) -> Document {
        let creator = User {
            id: "user-1".into(),
            name: "Tess".into(),
            color: "#3b82f6".into(),
            is_online: true,
            last_seen: Utc::now(),
            cursor_position: 0,
        };
        let mut doc = Document::new("doc-1".into(), creator, Utc::now());
        doc.title = title.into();
        doc.content = content.into();
        doc
    }

    #[test]
    fn exports_title_and_stripped_body() {
        let export = export_plain_text(&doc("Notes", "<p>Hello <b>team</b></p>"));
        assert_eq!(export.file_name, "Notes.txt");
        assert_eq!(export.body, "Hello team\n");
    }

    #[test]
    fn path_separators_are_replaced() {
        assert_eq!(export_file_name("Q3/Q4 plan"), "Q3-Q4 plan.txt");
        assert_eq!(export_file_name("a\\b"), "a-b.txt");
    }

    #[test]
    fn blank_title_uses_default() {
        assert_eq!(export_file_name("   "), "Untitled Document.txt");
        assert_eq!(export_file_name("/"), "Untitled Document.txt");
        assert_eq!(export_file_name(".."), "Untitled Document.txt");
    }

    #[test]
    fn export_does_not_touch_the_document() {
        let original = doc("Notes", "text");
        let before = original.clone();
        let _ = export_plain_text(&original);
        assert_eq!(original, before);
    }
}
