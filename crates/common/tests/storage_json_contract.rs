use chrono::{TimeZone, Utc};
use ghostwrite_common::types::{Document, User};
use serde_json::json;

fn stored_document() -> serde_json::Value {
    json!({
        "id": "doc-1714550400000",
        "title": "Planning",
        "content": "<p>Hello</p>",
        "lastModified": "2024-05-01T08:00:00Z",
        "version": 4,
        "collaborators": [
            {
                "id": "user-3f2a",
                "name": "Tess",
                "color": "#3b82f6",
                "isOnline": true,
                "lastSeen": "2024-05-01T08:00:00Z",
                "cursorPosition": 5
            },
            {
                "id": "ghost-91bc",
                "name": "Bob Smith",
                "color": "#10b981",
                "isOnline": false,
                "lastSeen": "2024-05-01T07:52:10Z",
                "cursorPosition": 0
            }
        ]
    })
}

#[test]
fn stored_documents_decode() {
    let doc: Document = serde_json::from_value(stored_document()).expect("document should decode");

    assert_eq!(doc.version, 4);
    assert_eq!(doc.last_modified, Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap());
    assert_eq!(doc.collaborators.len(), 2);
    assert!(!doc.collaborators[0].is_ghost());
    assert!(doc.collaborators[1].is_ghost());
    assert_eq!(doc.collaborators[0].cursor_position, 5);
}

#[test]
fn documents_encode_back_to_the_same_shape() {
    let doc: Document = serde_json::from_value(stored_document()).expect("document should decode");
    let encoded = serde_json::to_value(&doc).expect("document should encode");
    assert_eq!(encoded, stored_document());
}

#[test]
fn presence_fields_are_optional_on_read() {
    let user: User = serde_json::from_value(json!({
        "id": "user-1",
        "name": "Ada",
        "color": "#ef4444",
        "lastSeen": "2024-05-01T08:00:00Z"
    }))
    .expect("user without presence fields should decode");

    assert!(!user.is_online);
    assert_eq!(user.cursor_position, 0);
}

#[test]
fn documents_without_version_are_rejected() {
    let mut value = stored_document();
    value.as_object_mut().unwrap().remove("version");
    assert!(serde_json::from_value::<Document>(value).is_err());
}
