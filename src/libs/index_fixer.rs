// Replaces a symlinked `index.php` with a regular copy of its target.
// Source+dummy packages link `index.php` into the core tree, which some hosts
// (FollowSymLinks off, chrooted PHP) refuse to serve.

use crate::errors::{BootstrapError, Result};
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Returns `true` if the link was replaced.
pub fn fix_index_file(base: &Path) -> Result<bool> {
    let index = base.join("index.php");
    let failed = |reason: String| BootstrapError::IndexFixFailed {
        path: index.clone(),
        reason,
    };

    let is_link = fs::symlink_metadata(&index)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        log_debug!("[Index] {} is not a symlink, nothing to fix", index.display());
        return Ok(false);
    }

    // `fs::read` follows the link; a dangling link has nothing to copy.
    let contents = match fs::read(&index) {
        Ok(contents) => contents,
        Err(e) => {
            log_warn!(
                "[Index] {} points nowhere ({}); left as is",
                index.display().to_string().yellow(),
                e
            );
            return Ok(false);
        }
    };
    let permissions = fs::metadata(&index).map_err(|e| failed(e.to_string()))?.permissions();

    fs::remove_file(&index).map_err(|e| failed(e.to_string()))?;
    fs::write(&index, contents).map_err(|e| failed(e.to_string()))?;
    fs::set_permissions(&index, permissions).map_err(|e| failed(e.to_string()))?;

    log_info!(
        "[Index] Replaced symlinked {} with a copy",
        index.display().to_string().green()
    );
    Ok(true)
}
