// Presence & activity scheduler: the timers that fabricate remote activity.
//
// Two loops share one timer queue:
//
//   ambient loop     every `ambient_period`, across all documents
//                    ghost presence is re-rolled (never cancelled)
//
//   activity loop    armed while a document is open:
//                    open ──3–8s──▶ ghost join
//                    open ──10–30s──▶ edit cycle ──┬─2–5s──▶ typing stopped
//                                                  ├─1–3s──▶ ghost edit
//                                                  └─10–30s─▶ next edit cycle
//
// Every activity-loop handle is tracked so `disarm` cancels all of them.
// Callbacks still re-check that their document is open and the editor is
// active before mutating anything; a stale callback is a silent no-op.

pub mod timers;

use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, Utc};
use ghostwrite_common::identity::new_ghost_id;
use ghostwrite_common::palette::{GhostProfile, GHOST_FRAGMENTS, GHOST_PROFILES};
use ghostwrite_common::text::stats::TextStats;
use ghostwrite_common::types::{Notice, User};
use tracing::{debug, info, trace, warn};

use self::timers::{TimerId, TimerQueue};
use crate::config::SimulationConfig;
use crate::events::EditorEvent;
use crate::random::Randomness;
use crate::roster::{online_collaborators, Roster};
use crate::store::documents::DocumentStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    AmbientPresence,
    GhostJoin { doc_id: String },
    EditCycle { doc_id: String },
    TypingStopped { doc_id: String, profile: GhostProfile },
    GhostEdit { doc_id: String, profile: GhostProfile },
}

/// The open document as seen by a firing callback.
pub struct ActivityTarget<'a> {
    pub doc_id: &'a str,
    /// The displayed (not yet committed) content.
    pub content: &'a mut String,
}

/// Everything a callback may touch, handed in explicitly per firing.
pub struct ActivityContext<'a> {
    pub store: &'a mut DocumentStore,
    pub target: Option<ActivityTarget<'a>>,
    pub editor_active: bool,
    pub wall_now: DateTime<Utc>,
    pub events: &'a mut Vec<EditorEvent>,
}

struct ArmedDocument {
    doc_id: String,
    handles: HashSet<TimerId>,
    /// Handle of the pending recurring edit cycle, if any.
    cycle: Option<TimerId>,
}

pub struct Scheduler {
    timers: TimerQueue<Task>,
    armed: Option<ArmedDocument>,
    config: SimulationConfig,
    random: Box<dyn Randomness + Send>,
}

impl Scheduler {
    pub fn new(config: SimulationConfig, random: Box<dyn Randomness + Send>) -> Self {
        Self { timers: TimerQueue::new(), armed: None, config, random }
    }

    pub fn randomness(&mut self) -> &mut (dyn Randomness + Send) {
        self.random.as_mut()
    }

    /// Start the process-wide ambient presence loop.
    pub fn start_ambient(&mut self, now: Instant) {
        self.timers.schedule(now + self.config.ambient_period(), Task::AmbientPresence);
    }

    /// Arm the activity loop for `doc_id`, replacing any armed document.
    pub fn arm(&mut self, doc_id: &str, now: Instant) {
        self.disarm();
        self.armed = Some(ArmedDocument {
            doc_id: doc_id.to_string(),
            handles: HashSet::new(),
            cycle: None,
        });

        let join_at = now + self.random.delay(self.config.join_delay());
        self.schedule_for_document(join_at, Task::GhostJoin { doc_id: doc_id.to_string() });
        self.schedule_cycle(doc_id, now);
        debug!(doc_id, "activity loop armed");
    }

    /// Cancel every pending activity-loop timer. Returns how many were
    /// cancelled.
    pub fn disarm(&mut self) -> usize {
        let Some(armed) = self.armed.take() else {
            return 0;
        };
        let cancelled = armed.handles.into_iter().filter(|id| self.timers.cancel(*id)).count();
        debug!(doc_id = %armed.doc_id, cancelled, "activity loop disarmed");
        cancelled
    }

    pub fn armed_document(&self) -> Option<&str> {
        self.armed.as_ref().map(|armed| armed.doc_id.as_str())
    }

    /// Pending activity-loop timers for the armed document.
    pub fn pending_for_document(&self) -> usize {
        self.armed.as_ref().map_or(0, |armed| armed.handles.len())
    }

    pub fn has_recurring_cycle(&self) -> bool {
        self.armed.as_ref().is_some_and(|armed| armed.cycle.is_some())
    }

    /// Re-arm the recurring edit cycle after it self-cancelled.
    pub fn resume_cycle(&mut self, now: Instant) {
        let Some(doc_id) = self.armed_document().map(str::to_string) else {
            return;
        };
        if !self.has_recurring_cycle() {
            self.schedule_cycle(&doc_id, now);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Take the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, Task)> {
        let (id, at, task) = self.timers.pop_due(now)?;
        if let Some(armed) = self.armed.as_mut() {
            armed.handles.remove(&id);
            if armed.cycle == Some(id) {
                armed.cycle = None;
            }
        }
        Some((at, task))
    }

    /// Run a popped task. Returns `true` when a ghost edited the target's
    /// content, so the caller can schedule an autosave.
    pub fn fire(&mut self, task: Task, at: Instant, mut ctx: ActivityContext<'_>) -> bool {
        match task {
            Task::AmbientPresence => {
                self.start_ambient(at);
                self.ambient_pass(&mut ctx);
                false
            }
            Task::GhostJoin { doc_id } => {
                self.ghost_join(&doc_id, &mut ctx);
                false
            }
            Task::EditCycle { doc_id } => {
                if !self.is_live(&ctx, &doc_id) {
                    trace!(doc_id, "edit cycle self-cancelled");
                    return false;
                }
                self.begin_edit_cycle(&doc_id, at, &mut ctx);
                self.schedule_cycle(&doc_id, at);
                false
            }
            Task::TypingStopped { doc_id, profile } => {
                if ctx.target.as_ref().is_some_and(|t| t.doc_id == doc_id) {
                    let name = profile.name.to_string();
                    ctx.events.push(EditorEvent::TypingStopped { doc_id, name });
                }
                false
            }
            Task::GhostEdit { doc_id, profile } => self.ghost_edit(&doc_id, profile, &mut ctx),
        }
    }

    /// One non-recurring edit cycle, used when a formatting action settles.
    pub fn run_edit_cycle(&mut self, at: Instant, mut ctx: ActivityContext<'_>) -> bool {
        let Some(doc_id) = ctx.target.as_ref().map(|t| t.doc_id.to_string()) else {
            return false;
        };
        if !self.is_live(&ctx, &doc_id) {
            return false;
        }
        self.begin_edit_cycle(&doc_id, at, &mut ctx);
        true
    }

    fn is_live(&self, ctx: &ActivityContext<'_>, doc_id: &str) -> bool {
        ctx.editor_active
            && ctx.target.as_ref().is_some_and(|t| t.doc_id == doc_id)
            && self.armed_document() == Some(doc_id)
    }

    fn schedule_for_document(&mut self, at: Instant, task: Task) -> Option<TimerId> {
        let armed = self.armed.as_mut()?;
        let id = self.timers.schedule(at, task);
        armed.handles.insert(id);
        Some(id)
    }

    fn schedule_cycle(&mut self, doc_id: &str, from: Instant) {
        let at = from + self.random.delay(self.config.edit_period());
        let id = self.schedule_for_document(at, Task::EditCycle { doc_id: doc_id.to_string() });
        if let Some(armed) = self.armed.as_mut() {
            armed.cycle = id;
        }
    }

    fn pick_profile(&mut self) -> GhostProfile {
        GHOST_PROFILES[self.random.index(GHOST_PROFILES.len())]
    }

    fn ambient_pass(&mut self, ctx: &mut ActivityContext<'_>) {
        let probability = self.config.online_probability;
        let window = self.config.last_seen_window();
        let mut touched = 0usize;

        for doc in ctx.store.documents_mut() {
            let mut roster = Roster::of(doc);
            for ghost in roster.ghosts_mut() {
                ghost.is_online = self.random.chance(probability);
                let ago = chrono::Duration::from_std(self.random.delay(window))
                    .unwrap_or_else(|_| chrono::Duration::zero());
                ghost.last_seen = ctx.wall_now.checked_sub_signed(ago).unwrap_or(ctx.wall_now);
                touched += 1;
            }
        }

        if touched == 0 {
            return;
        }
        if let Err(error) = ctx.store.persist() {
            warn!(%error, "failed to persist ambient presence pass");
        }
        trace!(ghosts = touched, "ambient presence pass");

        let Some(target) = ctx.target.as_ref() else {
            return;
        };
        if let Some(doc) = ctx.store.find(target.doc_id) {
            if doc.collaborators.iter().any(User::is_ghost) {
                let online = online_collaborators(&doc.collaborators).cloned().collect();
                ctx.events.push(EditorEvent::RosterChanged { doc_id: doc.id.clone(), online });
            }
        }
    }

    fn ghost_join(&mut self, doc_id: &str, ctx: &mut ActivityContext<'_>) {
        if !self.is_live(ctx, doc_id) {
            trace!(doc_id, "stale ghost join ignored");
            return;
        }

        let profile = self.pick_profile();
        let candidate = User {
            id: new_ghost_id(),
            name: profile.name.to_string(),
            color: profile.color.to_string(),
            is_online: true,
            last_seen: ctx.wall_now,
            cursor_position: 0,
        };

        let Some(doc) = ctx.store.find_mut(doc_id) else {
            return;
        };
        if !Roster::of(doc).inject_ghost(candidate) {
            debug!(doc_id, ghost = profile.name, "ghost already on roster");
            return;
        }
        let online = online_collaborators(&doc.collaborators).cloned().collect();

        persist_or_report(ctx.store, ctx.events);
        ctx.events.push(EditorEvent::RosterChanged { doc_id: doc_id.to_string(), online });
        ctx.events.push(EditorEvent::Notice(Notice::info(format!(
            "{} joined the document",
            profile.name
        ))));
        info!(doc_id, ghost = profile.name, "ghost joined");
    }

    fn begin_edit_cycle(&mut self, doc_id: &str, at: Instant, ctx: &mut ActivityContext<'_>) {
        let profile = self.pick_profile();
        ctx.events.push(EditorEvent::TypingStarted {
            doc_id: doc_id.to_string(),
            name: profile.name.to_string(),
            color: profile.color.to_string(),
        });

        let stop_at = at + self.random.delay(self.config.typing_duration());
        self.schedule_for_document(
            stop_at,
            Task::TypingStopped { doc_id: doc_id.to_string(), profile },
        );
        let edit_at = at + self.random.delay(self.config.edit_delay());
        let edit = Task::GhostEdit { doc_id: doc_id.to_string(), profile };
        self.schedule_for_document(edit_at, edit);
        trace!(doc_id, ghost = profile.name, "edit cycle started");
    }

    fn ghost_edit(
        &mut self,
        doc_id: &str,
        profile: GhostProfile,
        ctx: &mut ActivityContext<'_>,
    ) -> bool {
        if !self.is_live(ctx, doc_id) {
            trace!(doc_id, "stale ghost edit ignored");
            return false;
        }
        let Some(target) = ctx.target.as_mut() else {
            return false;
        };

        let fragment = GHOST_FRAGMENTS[self.random.index(GHOST_FRAGMENTS.len())];
        append_fragment(target.content, fragment);
        let content = target.content.clone();
        let cursor = content.chars().count();

        if let Some(doc) = ctx.store.find_mut(doc_id) {
            let mut roster = Roster::of(doc);
            let ghost_id = roster.ghost_named(profile.name).map(|ghost| ghost.id.clone());
            if ghost_id.is_some_and(|id| roster.set_cursor(&id, cursor)) {
                persist_or_report(ctx.store, ctx.events);
            }
        }

        let stats = TextStats::of(&content);
        ctx.events.push(EditorEvent::ContentChanged { doc_id: doc_id.to_string(), content, stats });
        ctx.events
            .push(EditorEvent::Notice(Notice::info(format!("{} made an edit", profile.name))));
        debug!(doc_id, ghost = profile.name, "ghost edit applied");
        true
    }
}

/// Append with a single separating space unless the content already ends in
/// whitespace.
fn append_fragment(content: &mut String, fragment: &str) {
    if content.chars().last().is_some_and(|c| !c.is_whitespace()) {
        content.push(' ');
    }
    content.push_str(fragment);
}

fn persist_or_report(store: &DocumentStore, events: &mut Vec<EditorEvent>) {
    if let Err(error) = store.persist() {
        warn!(%error, "failed to persist simulated activity");
        events.push(EditorEvent::Notice(Notice::error("Failed to save changes")));
    }
}
