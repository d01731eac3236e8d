// Local configuration for Ghostwrite.
//
// Global config: `~/.ghostwrite/config.toml`
// Default database: `~/.ghostwrite/ghostwrite.db`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::random::DelayRange;
use crate::security::{ensure_owner_only_dir, ensure_owner_only_file};
use crate::session::AutosaveKind;

const DB_FILE_NAME: &str = "ghostwrite.db";

/// Root directory for Ghostwrite state: `~/.ghostwrite/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".ghostwrite"))
}

/// Path to the global config file: `~/.ghostwrite/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

/// Path to the default document database: `~/.ghostwrite/ghostwrite.db`.
pub fn default_db_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join(DB_FILE_NAME))
}

/// Configuration at `~/.ghostwrite/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GhostwriteConfig {
    /// Display name used to create the local identity when none is stored.
    pub display_name: Option<String>,
    /// Database location override.
    pub db_path: Option<PathBuf>,
    pub simulation: SimulationConfig,
    pub autosave: AutosaveConfig,
}

impl GhostwriteConfig {
    /// Load from `~/.ghostwrite/config.toml`. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load() -> Self {
        global_config_path().and_then(|p| Self::load_from(&p).ok()).unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save to a specific path (creates owner-only parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
            ensure_owner_only_dir(parent).map_err(ConfigError::permissions)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        ensure_owner_only_file(path).map_err(ConfigError::permissions)
    }

    /// Configured database path, falling back to the default location.
    pub fn resolved_db_path(&self) -> Option<PathBuf> {
        self.db_path.clone().or_else(default_db_path)
    }
}

/// Upper bound on `last_seen_window_secs` (30 days).
pub const MAX_LAST_SEEN_WINDOW_SECS: u64 = 30 * 24 * 60 * 60;

/// Timing and probabilities of the simulated collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Period of the ambient presence pass across all documents.
    pub ambient_period_secs: u64,
    /// Probability that a ghost is online after an ambient pass.
    pub online_probability: f64,
    /// How far in the past an ambient pass may place a ghost's `lastSeen`.
    pub last_seen_window_secs: u64,
    /// Delay before a ghost joins a freshly opened document.
    pub join_delay_secs: [u64; 2],
    /// Period of the recurring edit cycle.
    pub edit_period_secs: [u64; 2],
    /// How long a typing indicator stays visible.
    pub typing_secs: [u64; 2],
    /// Delay between the typing indicator and the ghost's edit.
    pub edit_delay_secs: [u64; 2],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ambient_period_secs: 30,
            online_probability: 0.7,
            last_seen_window_secs: 600,
            join_delay_secs: [3, 8],
            edit_period_secs: [10, 30],
            typing_secs: [2, 5],
            edit_delay_secs: [1, 3],
        }
    }
}

impl SimulationConfig {
    pub fn ambient_period(&self) -> Duration {
        Duration::from_secs(self.ambient_period_secs.max(1))
    }

    pub fn last_seen_window(&self) -> DelayRange {
        DelayRange::from_secs(0, self.last_seen_window_secs.min(MAX_LAST_SEEN_WINDOW_SECS))
    }

    pub fn join_delay(&self) -> DelayRange {
        range(self.join_delay_secs)
    }

    /// Never shorter than a second: the cycle reschedules itself.
    pub fn edit_period(&self) -> DelayRange {
        let [min, max] = self.edit_period_secs;
        range([min.max(1), max.max(1)])
    }

    pub fn typing_duration(&self) -> DelayRange {
        range(self.typing_secs)
    }

    pub fn edit_delay(&self) -> DelayRange {
        range(self.edit_delay_secs)
    }
}

fn range([min, max]: [u64; 2]) -> DelayRange {
    DelayRange::from_secs(min, max)
}

/// Debounce windows for autosave.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AutosaveConfig {
    pub title_ms: u64,
    pub content_ms: u64,
    pub formatting_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { title_ms: 1000, content_ms: 2000, formatting_ms: 1000 }
    }
}

impl AutosaveConfig {
    pub fn window(&self, kind: AutosaveKind) -> Duration {
        let ms = match kind {
            AutosaveKind::Title => self.title_ms,
            AutosaveKind::Content => self.content_ms,
            AutosaveKind::Formatting => self.formatting_ms,
        };
        Duration::from_millis(ms)
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config permission error: {0}")]
    Permissions(String),
}

impl ConfigError {
    fn permissions(error: anyhow::Error) -> Self {
        Self::Permissions(format!("{error:#}"))
    }
}
