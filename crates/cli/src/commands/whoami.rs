// `ghostwrite whoami` — show or set the local identity.

use clap::Args;
use ghostwrite_common::types::User;
use ghostwrite_engine::session::{Editor, EditorError};
use serde::Serialize;

use crate::context::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct WhoamiArgs {
    /// Create the identity, or rename it everywhere it appears.
    #[arg(long, value_name = "NAME")]
    set: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhoamiResult {
    pub user: Option<User>,
}

pub fn run(args: WhoamiArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut editor = ctx.open_editor()?;
    let result = whoami(&mut editor, args.set.as_deref())?;
    output::print_output(ctx.format, &result, format_human)?;
    Ok(())
}

pub fn whoami(editor: &mut Editor, set: Option<&str>) -> Result<WhoamiResult, EditorError> {
    if let Some(name) = set {
        editor.set_local_name(name)?;
    }
    Ok(WhoamiResult { user: editor.local_user().cloned() })
}

fn format_human(result: &WhoamiResult) -> String {
    match &result.user {
        Some(user) => format!("{} ({}, {})", user.name, user.id, user.color),
        None => "No identity yet. Set one with: ghostwrite whoami --set <name>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing;

    #[test]
    fn shows_current_identity() {
        let mut editor = testing::editor();
        let result = whoami(&mut editor, None).unwrap();

        let user = result.user.clone().unwrap();
        assert_eq!(user.name, "Tess");
        assert!(format_human(&result).starts_with("Tess (user-"));
    }

    #[test]
    fn set_renames_and_rejects_blank() {
        let mut editor = testing::editor();
        let before = editor.local_user().cloned().unwrap();

        let result = whoami(&mut editor, Some("Tess  Morgan")).unwrap();
        let after = result.user.unwrap();
        assert_eq!(after.name, "Tess Morgan");
        assert_eq!(after.id, before.id);

        assert!(matches!(whoami(&mut editor, Some(" ")), Err(EditorError::EmptyName)));
    }

    #[test]
    fn human_format_without_identity() {
        let text = format_human(&WhoamiResult { user: None });
        assert!(text.contains("whoami --set"));
    }
}
