// `ghostwrite write` — append text to a document and commit it.

use clap::Args;
use ghostwrite_common::text::stats::TextStats;
use ghostwrite_engine::session::Editor;
use serde::Serialize;

use crate::context::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Document id to append to.
    pub id: String,

    /// Text to append.
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteResult {
    pub id: String,
    pub version: u64,
    pub stats: TextStats,
}

pub fn run(args: WriteArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut editor = ctx.open_editor_with_identity()?;
    let result = append(&mut editor, &args.id, &args.text);
    editor.shutdown();
    output::print_output(ctx.format, &result?, |r| {
        format!("Saved {} v{} ({} words)", r.id, r.version, r.stats.words)
    })?;
    Ok(())
}

pub fn append(editor: &mut Editor, id: &str, text: &str) -> anyhow::Result<WriteResult> {
    let opened = editor.open_document(id)?;

    let mut content = opened.content;
    if content.chars().last().is_some_and(|c| !c.is_whitespace()) {
        content.push(' ');
    }
    content.push_str(text);

    editor.edit_content(&content)?;
    let version = editor.commit()?;
    let stats = editor.stats();
    editor.close_document();

    Ok(WriteResult { id: id.to_string(), version, stats })
}

#[cfg(test)]
mod tests {
    use ghostwrite_engine::session::EditorError;

    use super::*;
    use crate::context::testing;

    #[test]
    fn appends_with_a_separating_space() {
        let mut editor = testing::editor();
        let doc = editor.create_document().unwrap();

        append(&mut editor, &doc.id, "first").unwrap();
        let result = append(&mut editor, &doc.id, "second").unwrap();

        assert_eq!(result.version, 3);
        assert_eq!(result.stats.words, 2);
        assert_eq!(editor.document(&doc.id).unwrap().content, "first second");
        assert!(editor.open_document_id().is_none());
    }

    #[test]
    fn missing_document_is_not_found() {
        let mut editor = testing::editor();
        let err = append(&mut editor, "doc-missing", "x").unwrap_err();
        assert!(matches!(err.downcast_ref::<EditorError>(), Some(EditorError::NotFound(_))));
    }
}
