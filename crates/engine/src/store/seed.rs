// Documents installed when storage is empty or unreadable.

use chrono::{DateTime, Duration, Utc};
use ghostwrite_common::types::{Document, User};

fn ghost(id: &str, name: &str, color: &str, online: bool, last_seen: DateTime<Utc>) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        is_online: online,
        last_seen,
        cursor_position: 0,
    }
}

pub fn seed_documents(now: DateTime<Utc>) -> Vec<Document> {
    vec![
        Document {
            id: "doc-seed-welcome".into(),
            title: "Welcome to Ghostwrite".into(),
            content: "<p>This is a shared document. Your collaborators show up in the \
                      header and their edits appear as they type.</p>"
                .into(),
            last_modified: now - Duration::minutes(5),
            collaborators: vec![
                ghost("ghost-seed-alice", "Alice Johnson", "#ef4444", true, now),
                ghost("ghost-seed-bob", "Bob Smith", "#3b82f6", false, now - Duration::hours(1)),
            ],
            version: 3,
        },
        Document {
            id: "doc-seed-roadmap".into(),
            title: "Project Roadmap".into(),
            content: "<p><b>Q1</b>: discovery and interviews.</p>\
                      <p><b>Q2</b>: first public beta.</p>"
                .into(),
            last_modified: now - Duration::hours(2),
            collaborators: vec![
                ghost("ghost-seed-carol", "Carol Davis", "#22c55e", true, now),
                ghost("ghost-seed-david", "David Wilson", "#f97316", true, now),
                ghost("ghost-seed-emma", "Emma Brown", "#8b5cf6", false, now - Duration::days(1)),
            ],
            version: 7,
        },
        Document {
            id: "doc-seed-meeting".into(),
            title: "Meeting Notes".into(),
            content: "<p>Attendees: everyone.</p><p>Action items: <i>to be decided</i>.</p>"
                .into(),
            last_modified: now - Duration::days(1),
            collaborators: vec![ghost(
                "ghost-seed-frank",
                "Frank Miller",
                "#ec4899",
                false,
                now - Duration::hours(3),
            )],
            version: 2,
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn seed_ids_are_unique_and_versions_valid() {
        let docs = seed_documents(Utc::now());
        let ids: HashSet<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), docs.len());
        assert!(docs.iter().all(|d| d.version >= 1));
    }

    #[test]
    fn seed_collaborators_are_ghosts() {
        for doc in seed_documents(Utc::now()) {
            assert!(doc.collaborators.iter().all(User::is_ghost), "{} has a non-ghost", doc.id);
        }
    }
}
