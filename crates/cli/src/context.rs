// Shared command context: database location, output format and editor
// construction.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use ghostwrite_engine::clock::Clock;
use ghostwrite_engine::config::GhostwriteConfig;
use ghostwrite_engine::random::ThreadRandomness;
use ghostwrite_engine::session::{Editor, EditorError};
use ghostwrite_engine::store::kv::SqliteKvStore;
use ghostwrite_engine::store::persistence::Persistence;
use tracing::debug;

use crate::output::OutputFormat;

pub struct Context {
    db: Option<PathBuf>,
    pub format: OutputFormat,
    pub config: GhostwriteConfig,
}

impl Context {
    pub fn new(db: Option<PathBuf>, format: OutputFormat) -> Self {
        Self { db, format, config: GhostwriteConfig::load() }
    }

    /// `--db` wins over the configured path, which wins over the default.
    pub fn db_path(&self) -> Result<PathBuf> {
        self.db
            .clone()
            .or_else(|| self.config.resolved_db_path())
            .context("could not determine home directory; pass --db <path>")
    }

    pub fn open_editor(&self) -> Result<Editor> {
        let path = self.db_path()?;
        debug!(path = %path.display(), "opening document database");
        editor_at(&path, &self.config)
    }

    /// Open the editor and make sure a local identity exists, creating one
    /// from the configured display name if needed.
    pub fn open_editor_with_identity(&self) -> Result<Editor> {
        let mut editor = self.open_editor()?;
        ensure_identity(&mut editor, &self.config)?;
        Ok(editor)
    }
}

pub fn editor_at(path: &Path, config: &GhostwriteConfig) -> Result<Editor> {
    let kv = SqliteKvStore::open(path)
        .with_context(|| format!("failed to open document database `{}`", path.display()))?;
    Ok(Editor::new(Persistence::new(kv), config, Box::new(ThreadRandomness::new()), Clock::start()))
}

pub fn ensure_identity(editor: &mut Editor, config: &GhostwriteConfig) -> Result<()> {
    if editor.local_user().is_some() {
        return Ok(());
    }
    let Some(name) = config.display_name.as_deref() else {
        return Err(EditorError::IdentityRequired.into());
    };
    editor.set_local_name(name).context("configured display_name is invalid")?;
    Ok(())
}
