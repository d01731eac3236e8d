// Editor session: the command surface the UI drives.
//
// Binds at most one open document, buffers its title and content, debounces
// autosave per edit kind and owns the scheduler that fabricates remote
// activity. Time only moves through `advance_to`, so every timer fires in
// deadline order on the caller's thread.

pub mod debounce;

use std::ops::Range;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ghostwrite_common::identity::{new_user_id, normalize_display_name, NameError, MAX_NAME_CHARS};
use ghostwrite_common::palette::COLORS;
use ghostwrite_common::text::export::{export_plain_text, PlainTextExport};
use ghostwrite_common::text::stats::TextStats;
use ghostwrite_common::types::{Document, Notice, User};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use self::debounce::AutosaveKind;
use self::debounce::Debouncer;
use crate::clock::Clock;
use crate::config::GhostwriteConfig;
use crate::events::EditorEvent;
use crate::random::Randomness;
use crate::roster::{online_collaborators, Roster};
use crate::scheduler::{ActivityContext, ActivityTarget, Scheduler};
use crate::store::documents::DocumentStore;
use crate::store::persistence::Persistence;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("display name is empty")]
    EmptyName,

    #[error("display name exceeds maximum length of {MAX_NAME_CHARS} characters")]
    NameTooLong,

    #[error("no local identity; set a display name first")]
    IdentityRequired,

    #[error("no document is open")]
    NoOpenDocument,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Bold,
    Italic,
    Underline,
}

impl FormatKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Bold => "b",
            Self::Italic => "i",
            Self::Underline => "u",
        }
    }
}

/// What the UI needs to render a freshly opened document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenedDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub version: u64,
    pub stats: TextStats,
}

/// Buffered state of the open document, ahead of the last commit.
struct OpenDocument {
    id: String,
    title: String,
    content: String,
}

pub struct Editor {
    store: DocumentStore,
    scheduler: Scheduler,
    autosave: Debouncer,
    clock: Clock,
    local_user: Option<User>,
    open: Option<OpenDocument>,
    editor_active: bool,
    last_saved: Option<DateTime<Utc>>,
    events: Vec<EditorEvent>,
}

impl Editor {
    /// Load documents and identity, and start the ambient presence loop.
    pub fn new(
        persistence: Persistence,
        config: &GhostwriteConfig,
        random: Box<dyn Randomness + Send>,
        clock: Clock,
    ) -> Self {
        let store = DocumentStore::load(persistence, clock.wall_now());
        let local_user = store.persistence().load_user();
        let mut scheduler = Scheduler::new(config.simulation.clone(), random);
        scheduler.start_ambient(clock.now());

        info!(
            documents = store.len(),
            identity = local_user.as_ref().map(|u| u.id.as_str()).unwrap_or("none"),
            "editor ready"
        );

        Self {
            store,
            scheduler,
            autosave: Debouncer::new(config.autosave.clone()),
            clock,
            local_user,
            open: None,
            editor_active: true,
            last_saved: None,
            events: Vec::new(),
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn documents(&self) -> &[Document] {
        self.store.list()
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.store.find(id)
    }

    pub fn local_user(&self) -> Option<&User> {
        self.local_user.as_ref()
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn open_document_id(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.id.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.title.as_str())
    }

    pub fn content(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.content.as_str())
    }

    pub fn is_editor_active(&self) -> bool {
        self.editor_active
    }

    /// Statistics of the open document's buffered content.
    pub fn stats(&self) -> TextStats {
        self.content().map(TextStats::of).unwrap_or_default()
    }

    /// Online collaborators of the open document, in roster order.
    pub fn online_collaborators(&self) -> Vec<User> {
        self.open
            .as_ref()
            .and_then(|open| self.store.find(&open.id))
            .map(|doc| online_collaborators(&doc.collaborators).cloned().collect())
            .unwrap_or_default()
    }

    /// Plain-text export. The open document exports its buffered state.
    pub fn export(&mut self, id: &str) -> Result<PlainTextExport, EditorError> {
        let Some(stored) = self.store.find(id) else {
            return Err(self.not_found(id));
        };
        let mut doc = stored.clone();
        if let Some(open) = self.open.as_ref().filter(|open| open.id == id) {
            doc.title = open.title.clone();
            doc.content = open.content.clone();
        }
        Ok(export_plain_text(&doc))
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Identity ───────────────────────────────────────────────────

    /// Create the local identity or rename it. Renames keep id and color and
    /// are applied to every roster the identity appears in.
    pub fn set_local_name(&mut self, name: &str) -> Result<User, EditorError> {
        let name = match normalize_display_name(name) {
            Ok(name) => name,
            Err(NameError::Empty) => {
                self.notify(Notice::warning("Please enter a display name"));
                return Err(EditorError::EmptyName);
            }
            Err(NameError::TooLong) => {
                self.notify(Notice::warning(format!(
                    "Display names are limited to {MAX_NAME_CHARS} characters"
                )));
                return Err(EditorError::NameTooLong);
            }
        };

        let now = self.clock.wall_now();
        let user = match self.local_user.take() {
            Some(mut user) => {
                user.name = name;
                let mut renamed = 0usize;
                for doc in self.store.documents_mut() {
                    if Roster::of(doc).rename(&user.id, &user.name) {
                        renamed += 1;
                    }
                }
                if renamed > 0 {
                    self.persist_roster();
                }
                debug!(user_id = %user.id, rosters = renamed, "renamed local identity");
                user
            }
            None => {
                let color = COLORS[self.scheduler.randomness().index(COLORS.len())];
                let user = User {
                    id: new_user_id(),
                    name,
                    color: color.to_string(),
                    is_online: true,
                    last_seen: now,
                    cursor_position: 0,
                };
                info!(user_id = %user.id, "created local identity");
                user
            }
        };

        let saved = self.store.persistence().save_user(&user);
        self.local_user = Some(user.clone());
        if let Err(error) = saved {
            warn!(%error, "failed to persist local identity");
            self.notify(Notice::error("Failed to save your name"));
            return Err(error.into());
        }

        if let Some(id) = self.open_document_id().map(str::to_string) {
            self.join_open_document(&id);
        }
        Ok(user)
    }

    // ── Document lifecycle ─────────────────────────────────────────

    pub fn create_document(&mut self) -> Result<Document, EditorError> {
        let now = self.clock.wall_now();
        let creator = match self.local_user.as_ref() {
            Some(user) => {
                User { is_online: true, last_seen: now, cursor_position: 0, ..user.clone() }
            }
            None => return Err(EditorError::IdentityRequired),
        };

        let created = self.store.create(creator, now).map(Document::clone);
        match created {
            Ok(doc) => {
                info!(doc_id = %doc.id, "document created");
                self.events.push(EditorEvent::DocumentsChanged);
                self.notify(Notice::success("New document created"));
                Ok(doc)
            }
            Err(error) => {
                warn!(%error, "failed to create document");
                self.notify(Notice::error("Failed to create document"));
                Err(error.into())
            }
        }
    }

    /// Bind `id` as the open document, closing any other first.
    pub fn open_document(&mut self, id: &str) -> Result<OpenedDocument, EditorError> {
        if self.store.find(id).is_none() {
            return Err(self.not_found(id));
        }
        self.close_document();

        let Some(doc) = self.store.find(id) else {
            return Err(self.not_found(id));
        };
        self.open = Some(OpenDocument {
            id: doc.id.clone(),
            title: doc.title.clone(),
            content: doc.content.clone(),
        });
        let opened = OpenedDocument {
            id: doc.id.clone(),
            title: doc.title.clone(),
            content: doc.content.clone(),
            version: doc.version,
            stats: TextStats::of(&doc.content),
        };

        self.join_open_document(id);
        if self.editor_active {
            self.scheduler.arm(id, self.clock.now());
        }
        info!(doc_id = %id, version = opened.version, "document opened");
        Ok(opened)
    }

    /// Flush pending autosaves, leave the roster and cancel the activity
    /// loop. Returns the id of the document that was open.
    pub fn close_document(&mut self) -> Option<String> {
        let id = self.open_document_id()?.to_string();

        self.flush_autosave();

        let now = self.clock.wall_now();
        if let Some(user_id) = self.local_user.as_ref().map(|u| u.id.clone()) {
            let left = self
                .store
                .find_mut(&id)
                .is_some_and(|doc| Roster::of(doc).mark_offline(&user_id, now));
            if left {
                self.persist_roster();
            }
        }

        let cancelled = self.scheduler.disarm();
        self.open = None;
        debug!(doc_id = %id, cancelled, "document closed");
        Some(id)
    }

    /// Commit the buffered title and content now. Pending title and content
    /// autosaves become redundant and are dropped.
    pub fn commit(&mut self) -> Result<u64, EditorError> {
        self.autosave.cancel(AutosaveKind::Title);
        self.autosave.cancel(AutosaveKind::Content);
        self.commit_open()
    }

    /// Returns `false` if no document has this id.
    pub fn delete_document(&mut self, id: &str) -> Result<bool, EditorError> {
        if self.open_document_id() == Some(id) {
            self.close_document();
        }

        match self.store.delete(id) {
            Ok(false) => Ok(false),
            Ok(true) => {
                info!(doc_id = %id, "document deleted");
                self.events.push(EditorEvent::DocumentsChanged);
                self.notify(Notice::success("Document deleted"));
                Ok(true)
            }
            Err(error) => {
                warn!(doc_id = %id, %error, "failed to delete document");
                self.notify(Notice::error("Failed to delete document"));
                Err(error.into())
            }
        }
    }

    // ── Editing ────────────────────────────────────────────────────

    pub fn edit_title(&mut self, title: &str) -> Result<(), EditorError> {
        let open = self.open.as_mut().ok_or(EditorError::NoOpenDocument)?;
        open.title = title.to_string();
        self.autosave.push_at(AutosaveKind::Title, self.clock.now());
        Ok(())
    }

    pub fn edit_content(&mut self, content: &str) -> Result<(), EditorError> {
        let open = self.open.as_mut().ok_or(EditorError::NoOpenDocument)?;
        open.content = content.to_string();
        self.autosave.push_at(AutosaveKind::Content, self.clock.now());
        Ok(())
    }

    /// Wrap the selected character range in a formatting tag. An empty
    /// selection changes nothing and returns `false`.
    pub fn apply_formatting(
        &mut self,
        kind: FormatKind,
        selection: Range<usize>,
    ) -> Result<bool, EditorError> {
        let open = self.open.as_mut().ok_or(EditorError::NoOpenDocument)?;
        let Some(wrapped) = wrap_selection(&open.content, selection, kind.tag()) else {
            return Ok(false);
        };
        open.content = wrapped;

        let event = EditorEvent::ContentChanged {
            doc_id: open.id.clone(),
            content: open.content.clone(),
            stats: TextStats::of(&open.content),
        };
        self.events.push(event);
        self.autosave.push_at(AutosaveKind::Formatting, self.clock.now());
        Ok(true)
    }

    /// Pause or resume simulated activity. Pausing lets the recurring edit
    /// cycle lapse; resuming re-arms it.
    pub fn set_editor_active(&mut self, active: bool) {
        self.editor_active = active;
        if !active {
            return;
        }
        match self.open_document_id().map(str::to_string) {
            Some(id) if self.scheduler.armed_document() != Some(id.as_str()) => {
                self.scheduler.arm(&id, self.clock.now());
            }
            Some(_) => self.scheduler.resume_cycle(self.clock.now()),
            None => {}
        }
    }

    // ── Time ───────────────────────────────────────────────────────

    /// Earliest pending timer, scheduler or autosave.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scheduler.next_deadline(), self.autosave.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire every timer due at or before `target`, in deadline order, then
    /// move the clock to `target`. On equal deadlines scheduler tasks run
    /// before autosaves.
    pub fn advance_to(&mut self, target: Instant) {
        loop {
            let scheduled = self.scheduler.next_deadline().filter(|at| *at <= target);
            let autosave = self.autosave.next_deadline().filter(|at| *at <= target);
            match (scheduled, autosave) {
                (None, None) => break,
                (Some(task_at), Some(save_at)) if save_at < task_at => self.fire_autosave(save_at),
                (Some(task_at), _) => self.fire_scheduled(task_at),
                (None, Some(save_at)) => self.fire_autosave(save_at),
            }
        }
        self.clock.advance_to(target);
    }

    pub fn advance(&mut self, by: Duration) {
        self.advance_to(self.clock.now() + by);
    }

    /// Teardown: flush pending autosaves and close the open document.
    pub fn shutdown(&mut self) {
        if self.close_document().is_none() {
            self.flush_autosave();
        }
        debug!("editor shut down");
    }

    // ── Internals ──────────────────────────────────────────────────

    fn fire_scheduled(&mut self, at: Instant) {
        self.clock.advance_to(at);
        let Some((at, task)) = self.scheduler.pop_due(at) else {
            return;
        };

        let ctx = ActivityContext {
            store: &mut self.store,
            target: self
                .open
                .as_mut()
                .map(|open| ActivityTarget { doc_id: &open.id, content: &mut open.content }),
            editor_active: self.editor_active,
            wall_now: self.clock.wall_now(),
            events: &mut self.events,
        };
        if self.scheduler.fire(task, at, ctx) {
            self.autosave.push_at(AutosaveKind::Content, at);
        }
    }

    fn fire_autosave(&mut self, at: Instant) {
        self.clock.advance_to(at);
        if let Some((kind, at)) = self.autosave.pop_ready_at(at) {
            self.settle(kind, at, true);
        }
    }

    /// Commit for a settled autosave. A settled formatting edit also starts
    /// one edit cycle unless this is a flush.
    fn settle(&mut self, kind: AutosaveKind, at: Instant, run_cycle: bool) {
        // Store failures are already reported by `commit_open`.
        if let Err(EditorError::NoOpenDocument) = self.commit_open() {
            return;
        }
        if kind != AutosaveKind::Formatting || !run_cycle {
            return;
        }

        let ctx = ActivityContext {
            store: &mut self.store,
            target: self
                .open
                .as_mut()
                .map(|open| ActivityTarget { doc_id: &open.id, content: &mut open.content }),
            editor_active: self.editor_active,
            wall_now: self.clock.wall_now(),
            events: &mut self.events,
        };
        self.scheduler.run_edit_cycle(at, ctx);
    }

    fn flush_autosave(&mut self) {
        let now = self.clock.now();
        for kind in self.autosave.take_pending() {
            self.settle(kind, now, false);
        }
    }

    fn commit_open(&mut self) -> Result<u64, EditorError> {
        let open = self.open.as_ref().ok_or(EditorError::NoOpenDocument)?;
        let Some(stored) = self.store.find(&open.id) else {
            let id = open.id.clone();
            return Err(self.not_found(&id));
        };

        let mut doc = stored.clone();
        doc.title = open.title.clone();
        doc.content = open.content.clone();

        let now = self.clock.wall_now();
        let saved = self.store.save(doc, now).map(|saved| (saved.id.clone(), saved.version));
        match saved {
            Ok((doc_id, version)) => {
                info!(doc_id = %doc_id, version, "document saved");
                self.last_saved = Some(now);
                self.events.push(EditorEvent::Saved { doc_id, version, at: now });
                Ok(version)
            }
            Err(error) => {
                warn!(%error, "failed to save document");
                self.notify(Notice::error("Failed to save document"));
                Err(error.into())
            }
        }
    }

    /// Add or refresh the local identity on the open document's roster.
    fn join_open_document(&mut self, id: &str) {
        let Some(user) = self.local_user.clone() else {
            return;
        };
        let now = self.clock.wall_now();
        let Some(doc) = self.store.find_mut(id) else {
            return;
        };
        Roster::of(doc).ensure_joined(&user, now);
        let online = online_collaborators(&doc.collaborators).cloned().collect();

        self.persist_roster();
        self.events.push(EditorEvent::RosterChanged { doc_id: id.to_string(), online });
    }

    fn persist_roster(&mut self) {
        if let Err(error) = self.store.persist() {
            warn!(%error, "failed to persist roster change");
            self.notify(Notice::error("Failed to save changes"));
        }
    }

    fn not_found(&mut self, id: &str) -> EditorError {
        debug!(doc_id = %id, "document not found");
        self.notify(Notice::error("Document not found"));
        EditorError::NotFound(id.to_string())
    }

    fn notify(&mut self, notice: Notice) {
        self.events.push(EditorEvent::Notice(notice));
    }
}

/// Wrap the characters in `selection` (clamped, either direction) in
/// `<tag>…</tag>`.
fn wrap_selection(content: &str, selection: Range<usize>, tag: &str) -> Option<String> {
    let len = content.chars().count();
    let (a, b) = (selection.start.min(len), selection.end.min(len));
    let (start, end) = (a.min(b), a.max(b));
    if start == end {
        return None;
    }

    let byte = |n: usize| content.char_indices().nth(n).map_or(content.len(), |(i, _)| i);
    let (start, end) = (byte(start), byte(end));
    Some(format!(
        "{}<{tag}>{}</{tag}>{}",
        &content[..start],
        &content[start..end],
        &content[end..]
    ))
}
