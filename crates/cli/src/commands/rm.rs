// `ghostwrite rm` — delete a document.

use clap::Args;
use ghostwrite_engine::session::{Editor, EditorError};
use serde::Serialize;

use crate::context::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct RmArgs {
    /// Document id to delete.
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RmResult {
    pub id: String,
    pub deleted: bool,
}

pub fn run(args: RmArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut editor = ctx.open_editor()?;
    let result = remove(&mut editor, &args.id)?;
    output::print_output(ctx.format, &result, |r| format!("Deleted {}", r.id))?;
    Ok(())
}

/// Unlike the editor, the CLI treats an unknown id as an error.
pub fn remove(editor: &mut Editor, id: &str) -> Result<RmResult, EditorError> {
    if !editor.delete_document(id)? {
        return Err(EditorError::NotFound(id.to_string()));
    }
    Ok(RmResult { id: id.to_string(), deleted: true })
}
