// Real-time driver: runs an `Editor` against the tokio clock.
//
// The editor's own clock is virtual. The driver maps tokio instants onto it
// (the editor's `now` at start corresponds to the tokio `now` at start),
// sleeps until the next deadline and advances the editor to match.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::events::EditorEvent;
use crate::session::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown signal was raised or its sender dropped.
    Shutdown,
    /// The requested run duration elapsed.
    Elapsed,
    /// Nobody is listening for events any more.
    ReceiverDropped,
}

/// Drive `editor` in real time until shutdown, until `run_for` has elapsed,
/// or until `events` is closed. Every drained event is forwarded.
///
/// The caller still owns the editor afterwards and decides whether to close
/// or shut it down.
pub async fn drive(
    editor: &mut Editor,
    events: mpsc::UnboundedSender<EditorEvent>,
    mut shutdown: watch::Receiver<bool>,
    run_for: Option<Duration>,
) -> StopReason {
    let started = Instant::now();
    let editor_origin = editor.clock().now();
    let stop_at = run_for.map(|d| started + d);

    let to_editor = |at: Instant| editor_origin + at.saturating_duration_since(started);
    let to_tokio = |at: std::time::Instant| started + at.saturating_duration_since(editor_origin);

    loop {
        if !forward(editor, &events) {
            return StopReason::ReceiverDropped;
        }
        if *shutdown.borrow() {
            return StopReason::Shutdown;
        }

        let wake = match (editor.next_deadline().map(to_tokio), stop_at) {
            (Some(deadline), Some(stop)) => Some(deadline.min(stop)),
            (deadline, stop) => deadline.or(stop),
        };

        tokio::select! {
            _ = async {
                match wake {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            } => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    debug!("shutdown sender dropped");
                    return StopReason::Shutdown;
                }
                continue;
            }
        }

        let now = Instant::now();
        editor.advance_to(to_editor(now));

        if stop_at.is_some_and(|stop| now >= stop) {
            if !forward(editor, &events) {
                return StopReason::ReceiverDropped;
            }
            return StopReason::Elapsed;
        }
    }
}

fn forward(editor: &mut Editor, events: &mpsc::UnboundedSender<EditorEvent>) -> bool {
    editor.drain_events().into_iter().all(|event| events.send(event).is_ok())
}
