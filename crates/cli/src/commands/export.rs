// `ghostwrite export` — write a document as `<title>.txt`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;
use ghostwrite_engine::session::Editor;
use serde::Serialize;

use crate::context::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Document id to export.
    pub id: String,

    /// Directory to write into (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub id: String,
    pub path: PathBuf,
    pub bytes: usize,
}

pub fn run(args: ExportArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut editor = ctx.open_editor()?;
    let dir = args.out.unwrap_or_else(|| PathBuf::from("."));
    let result = export_to(&mut editor, &args.id, &dir)?;
    output::print_output(ctx.format, &result, |r| {
        format!("Exported {} to {} ({} bytes)", r.id, r.path.display(), r.bytes)
    })?;
    Ok(())
}

pub fn export_to(editor: &mut Editor, id: &str, dir: &Path) -> anyhow::Result<ExportResult> {
    let export = editor.export(id)?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory `{}`", dir.display()))?;

    let path = dir.join(&export.file_name);
    fs::write(&path, &export.body)
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    Ok(ExportResult { id: id.to_string(), path, bytes: export.body.len() })
}
