// `ghostwrite ls` — list documents.

use chrono::{DateTime, Utc};
use clap::Args;
use ghostwrite_common::types::Document;
use ghostwrite_engine::roster::online_collaborators;
use ghostwrite_engine::session::Editor;
use serde::Serialize;

use crate::context::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct LsArgs {}

#[derive(Debug, Clone, Serialize)]
pub struct LsResult {
    pub documents: Vec<DocEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocEntry {
    pub id: String,
    pub title: String,
    pub version: u64,
    pub last_modified: DateTime<Utc>,
    pub collaborators: usize,
    pub online: usize,
}

impl DocEntry {
    pub fn of(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            version: doc.version,
            last_modified: doc.last_modified,
            collaborators: doc.collaborators.len(),
            online: online_collaborators(&doc.collaborators).count(),
        }
    }
}

pub fn run(_args: LsArgs, ctx: &Context) -> anyhow::Result<()> {
    let editor = ctx.open_editor()?;
    output::print_output(ctx.format, &list(&editor), format_human)?;
    Ok(())
}

pub fn list(editor: &Editor) -> LsResult {
    LsResult { documents: editor.documents().iter().map(DocEntry::of).collect() }
}

fn format_human(result: &LsResult) -> String {
    if result.documents.is_empty() {
        return "No documents. Create one with: ghostwrite new".into();
    }

    let mut lines = Vec::new();
    lines.push(format!("{} document(s)", result.documents.len()));
    for d in &result.documents {
        lines.push(format!(
            "  {}  {}  v{}  {}/{} online  {}",
            d.id,
            d.title,
            d.version,
            d.online,
            d.collaborators,
            d.last_modified.format("%Y-%m-%d %H:%M")
        ));
    }
    lines.join("\n")
}
