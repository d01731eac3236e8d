// `ghostwrite watch` — open a document and print simulated activity as it
// happens. Closes the document (flushing autosave) on exit or Ctrl-C.

use std::io;
use std::time::Duration;

use anyhow::Context as _;
use clap::Args;
use ghostwrite_engine::runtime::{drive, StopReason};
use ghostwrite_engine::session::{Editor, OpenedDocument};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Document id to open.
    pub id: String,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long)]
    seconds: Option<u64>,
}

pub fn run(args: WatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut editor = ctx.open_editor_with_identity()?;
    let opened = editor.open_document(&args.id)?;
    output::print_output(ctx.format, &opened, format_header)?;
    output::write_events(&mut io::stdout().lock(), ctx.format, &editor.drain_events())?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let run_for = args.seconds.map(Duration::from_secs);
    let reason = rt.block_on(follow(&mut editor, run_for, ctx.format));

    editor.shutdown();
    output::write_events(&mut io::stdout().lock(), ctx.format, &editor.drain_events())?;
    info!(doc_id = %args.id, ?reason, "watch finished");
    Ok(())
}

/// Drive the editor, printing events as they arrive, until Ctrl-C or until
/// `run_for` elapses.
pub async fn follow(
    editor: &mut Editor,
    run_for: Option<Duration>,
    format: OutputFormat,
) -> StopReason {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);

    let signal = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = stop_tx.send(true);
            }
            Err(error) => {
                warn!(%error, "could not listen for Ctrl-C");
                // Keep the sender alive so the driver isn't told to stop.
                std::future::pending::<()>().await;
            }
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let _ = output::write_events(&mut io::stdout().lock(), format, &[event]);
        }
    });

    let reason = drive(editor, events_tx, stop_rx, run_for).await;
    signal.abort();
    let _ = printer.await;
    reason
}

fn format_header(opened: &OpenedDocument) -> String {
    format!(
        "Watching {} ({}) · v{} · {} words. Press Ctrl-C to stop.",
        opened.title, opened.id, opened.version, opened.stats.words
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing;

    #[tokio::test(start_paused = true)]
    async fn follow_runs_for_the_requested_time() {
        let mut editor = testing::editor();
        let doc = editor.create_document().unwrap();
        editor.open_document(&doc.id).unwrap();

        let reason = follow(&mut editor, Some(Duration::from_secs(12)), OutputFormat::Json).await;

        assert_eq!(reason, StopReason::Elapsed);
        assert!(!editor.content().unwrap().is_empty());
        assert_eq!(editor.document(&doc.id).unwrap().collaborators.len(), 2);
    }

    #[test]
    fn header_names_the_document() {
        let mut editor = testing::editor();
        let doc = editor.create_document().unwrap();
        let opened = editor.open_document(&doc.id).unwrap();

        let header = format_header(&opened);
        assert!(header.starts_with("Watching Untitled Document"));
        assert!(header.contains(&doc.id));
    }
}
