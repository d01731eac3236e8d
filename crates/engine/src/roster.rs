// Per-document collaborator roster: joins, presence and ghost injection.
//
// Two uniqueness rules apply:
// - `ensure_joined` dedups by id; the local identity is reused across opens.
// - `inject_ghost` dedups by display name, because ghost ids are minted fresh
//   for every injection and would never collide.

use chrono::{DateTime, Utc};
use ghostwrite_common::types::{Document, User};

/// Mutable view over one document's collaborators.
pub struct Roster<'a> {
    members: &'a mut Vec<User>,
}

impl<'a> Roster<'a> {
    pub fn new(members: &'a mut Vec<User>) -> Self {
        Self { members }
    }

    pub fn of(doc: &'a mut Document) -> Self {
        Self::new(&mut doc.collaborators)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Add `identity` if absent, otherwise mark it online again.
    ///
    /// Returns `true` when a new entry was appended.
    pub fn ensure_joined(&mut self, identity: &User, now: DateTime<Utc>) -> bool {
        if let Some(existing) = self.members.iter_mut().find(|m| m.id == identity.id) {
            existing.is_online = true;
            existing.last_seen = now;
            return false;
        }

        self.members.push(User {
            is_online: true,
            last_seen: now,
            cursor_position: 0,
            ..identity.clone()
        });
        true
    }

    /// Returns `false` if no collaborator has this id.
    pub fn mark_offline(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.members.iter_mut().find(|m| m.id == id) {
            Some(member) => {
                member.is_online = false;
                member.last_seen = now;
                true
            }
            None => false,
        }
    }

    pub fn online(&self) -> impl Iterator<Item = &User> + '_ {
        online_collaborators(self.members.as_slice())
    }

    /// Append a simulated participant unless someone with the same display
    /// name is already on the roster.
    pub fn inject_ghost(&mut self, candidate: User) -> bool {
        if self.members.iter().any(|m| m.name == candidate.name) {
            return false;
        }
        self.members.push(candidate);
        true
    }

    pub fn ghosts_mut(&mut self) -> impl Iterator<Item = &mut User> + '_ {
        self.members.iter_mut().filter(|m| m.is_ghost())
    }

    /// The ghost using this display name, if it has joined.
    pub fn ghost_named(&self, name: &str) -> Option<&User> {
        self.members.iter().find(|m| m.is_ghost() && m.name == name)
    }

    pub fn set_cursor(&mut self, id: &str, position: usize) -> bool {
        match self.members.iter_mut().find(|m| m.id == id) {
            Some(member) => {
                member.cursor_position = position;
                true
            }
            None => false,
        }
    }

    /// Update the display name of every entry with this id.
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        let mut renamed = false;
        for member in self.members.iter_mut().filter(|m| m.id == id) {
            member.name = name.to_string();
            renamed = true;
        }
        renamed
    }
}

/// Online collaborators in roster order.
pub fn online_collaborators(members: &[User]) -> impl Iterator<Item = &User> + '_ {
    members.iter().filter(|m| m.is_online)
}
