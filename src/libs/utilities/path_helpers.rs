// Our custom logging macros to give us nicely formatted (and colored!) output.
use crate::log_warn;
// The 'colored' crate helps us make our console output look pretty and readable.
use colored::Colorize;
// For working with file paths.
use std::path::{Path, PathBuf};

/// Resolves `~` and `$VAR`/`${VAR}` references in a user-supplied path.
///
/// Paths from config files are plain shell strings, so `STORE=~/cache` or
/// `BASE_PATH=$HOME/www/typo3` must behave as the shell would have expanded them.
/// If a variable is undefined, only the tilde is expanded and a warning is logged.
///
/// # Arguments
/// * `path`: The raw path string.
///
/// # Returns
/// * `PathBuf`: The expanded path.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            log_warn!(
                "[Utils] Could not expand '{}': {}. Using it with only '~' expanded.",
                path.yellow(),
                e
            );
            PathBuf::from(shellexpand::tilde(path).as_ref())
        }
    }
}

/// Joins `path` to the current working directory unless it is already absolute.
/// Used to print unambiguous paths in the final summary.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
