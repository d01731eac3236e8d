// Owner-only permissions for the config directory and the document database.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const OWNER_ONLY_FILE_MODE: u32 = 0o600;
const OWNER_ONLY_DIR_MODE: u32 = 0o700;

pub fn ensure_owner_only_file(path: &Path) -> Result<()> {
    restrict_mode(path, OWNER_ONLY_FILE_MODE)
}

pub fn ensure_owner_only_dir(path: &Path) -> Result<()> {
    restrict_mode(path, OWNER_ONLY_DIR_MODE)
}

/// Missing paths are left alone; non-Unix platforms are a no-op.
fn restrict_mode(path: &Path, wanted: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if !path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(path)
            .with_context(|| format!("failed to read metadata for `{}`", path.display()))?;
        if metadata.permissions().mode() & 0o777 != wanted {
            fs::set_permissions(path, fs::Permissions::from_mode(wanted)).with_context(|| {
                format!("failed to set mode {wanted:o} on `{}`", path.display())
            })?;
        }
    }

    #[cfg(not(unix))]
    {
        let _ = (path, wanted);
    }

    Ok(())
}
