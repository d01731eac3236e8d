// `ghostwrite show` — document details, roster and statistics.

use chrono::{DateTime, Utc};
use clap::Args;
use ghostwrite_common::text::plain_text;
use ghostwrite_common::text::stats::TextStats;
use ghostwrite_common::types::User;
use ghostwrite_engine::session::{Editor, EditorError};
use serde::Serialize;

use crate::context::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Document id (see `ghostwrite ls`).
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowResult {
    pub id: String,
    pub title: String,
    pub version: u64,
    pub last_modified: DateTime<Utc>,
    pub stats: TextStats,
    pub collaborators: Vec<User>,
    pub content: String,
}

pub fn run(args: ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let editor = ctx.open_editor()?;
    let result = show(&editor, &args.id)?;
    output::print_output(ctx.format, &result, format_human)?;
    Ok(())
}

pub fn show(editor: &Editor, id: &str) -> Result<ShowResult, EditorError> {
    let doc = editor.document(id).ok_or_else(|| EditorError::NotFound(id.to_string()))?;
    Ok(ShowResult {
        id: doc.id.clone(),
        title: doc.title.clone(),
        version: doc.version,
        last_modified: doc.last_modified,
        stats: TextStats::of(&doc.content),
        collaborators: doc.collaborators.clone(),
        content: doc.content.clone(),
    })
}

fn format_human(result: &ShowResult) -> String {
    let mut lines = vec![
        format!("{} ({})", result.title, result.id),
        format!(
            "version {} · modified {} · {} words, {} characters",
            result.version,
            result.last_modified.format("%Y-%m-%d %H:%M:%S"),
            result.stats.words,
            result.stats.characters
        ),
        String::new(),
        "Collaborators:".to_string(),
    ];
    for user in &result.collaborators {
        let presence = if user.is_online {
            "online".to_string()
        } else {
            format!("last seen {}", user.last_seen.format("%Y-%m-%d %H:%M"))
        };
        let kind = if user.is_ghost() { " (simulated)" } else { "" };
        lines.push(format!("  {}{}  {}", user.name, kind, presence));
    }

    let body = plain_text(&result.content);
    if !body.trim().is_empty() {
        lines.push(String::new());
        lines.push(body.trim_end().to_string());
    }
    lines.join("\n")
}
