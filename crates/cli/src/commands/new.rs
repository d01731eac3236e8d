// `ghostwrite new` — create an empty document.

use clap::Args;
use ghostwrite_engine::session::Editor;

use super::ls::DocEntry;
use crate::context::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Title to give the document instead of the default.
    #[arg(long)]
    title: Option<String>,
}

pub fn run(args: NewArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut editor = ctx.open_editor_with_identity()?;
    let entry = create(&mut editor, args.title.as_deref())?;
    editor.shutdown();
    output::print_output(ctx.format, &entry, format_human)?;
    Ok(())
}

pub fn create(editor: &mut Editor, title: Option<&str>) -> anyhow::Result<DocEntry> {
    let doc = editor.create_document()?;
    let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(DocEntry::of(&doc));
    };

    editor.open_document(&doc.id)?;
    editor.edit_title(title)?;
    editor.commit()?;
    editor.close_document();

    let saved = editor.document(&doc.id).map(DocEntry::of);
    Ok(saved.unwrap_or_else(|| DocEntry::of(&doc)))
}

fn format_human(entry: &DocEntry) -> String {
    format!("Created {} ({})", entry.id, entry.title)
}
