// This module unpacks gzip-compressed tar archives, the format TYPO3 packages ship in.

use crate::errors::{BootstrapError, Result};
// Our custom logging macros to give us nicely formatted (and colored!) output.
use crate::log_debug;
// The 'colored' crate helps us make our console output look pretty and readable.
use colored::Colorize;
// `GzDecoder` strips the gzip layer, `Archive` reads the tar stream beneath it.
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use tar::Archive;

/// Extracts the `.tar.gz` archive at `src` into the existing directory `dest`.
///
/// Entries that would escape `dest` (absolute paths, `..`) are skipped by `tar`.
/// File modes from the archive are preserved; ownership is not.
///
/// # Returns
/// * `Ok(())` once every entry is unpacked.
/// * `ExtractionFailed` if the file cannot be opened, is not gzip, or the tar stream is broken.
pub fn extract_tar_gz(src: &Path, dest: &Path) -> Result<()> {
    log_debug!(
        "[Utils] Extracting archive {} into {}",
        src.to_string_lossy().blue(),
        dest.to_string_lossy().cyan()
    );
    let failed = |reason: String| BootstrapError::ExtractionFailed {
        archive: src.to_path_buf(),
        reason,
    };

    let tar_gz = File::open(src).map_err(|e| failed(e.to_string()))?;
    let decompressor = GzDecoder::new(tar_gz);
    let mut archive = Archive::new(decompressor);
    archive.set_preserve_permissions(true);
    archive.unpack(dest).map_err(|e| failed(e.to_string()))?;

    log_debug!("[Utils] Tar.gz archive extracted successfully.");
    Ok(())
}
