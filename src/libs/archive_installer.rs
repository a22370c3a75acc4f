//! # Archive Installer
//!
//! Unpacks the fetched archive and moves the resulting tree to the base path.
//!
//! The archive is unpacked into a staging directory inside the current working
//! directory, so the final step is a same-filesystem rename and an aborted run
//! leaves no half-extracted tree behind.

use crate::errors::{BootstrapError, Result};
use crate::libs::utilities::compression::extract_tar_gz;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Refuses an existing `base` unless `force` is set. Touches nothing, so it
/// can run before the package is fetched.
pub fn ensure_target_free(base: &Path, force: bool) -> Result<()> {
    if !force && fs::symlink_metadata(base).is_ok() {
        return Err(BootstrapError::TargetAlreadyExists(base.to_path_buf()));
    }
    Ok(())
}

/// Refuses an existing `base` unless `force` is set, in which case it is
/// removed recursively. Nothing is touched when this returns an error.
pub fn prepare_target(base: &Path, force: bool) -> Result<()> {
    ensure_target_free(base, force)?;
    if fs::symlink_metadata(base).is_err() {
        return Ok(());
    }
    log_info!(
        "[Install] --force given, removing existing {}",
        base.display().to_string().yellow()
    );
    if base.is_dir() {
        fs::remove_dir_all(base)?;
    } else {
        fs::remove_file(base)?;
    }
    Ok(())
}

/// Extracts `archive` and moves its top-level directory to `base`.
///
/// Archives with a single top-level directory (the usual `typo3-6.2.4/`) have
/// that directory moved; any other layout has the whole staging directory
/// moved instead. The staging directory is created under `staging_parent`,
/// which must be on the same filesystem as `base`.
pub fn install_staged_in(
    archive: &Path,
    base: &Path,
    force: bool,
    staging_parent: &Path,
) -> Result<PathBuf> {
    prepare_target(base, force)?;

    let staging = tempfile::Builder::new()
        .prefix(".typo3-bootstrap-")
        .tempdir_in(staging_parent)
        .map_err(|e| BootstrapError::ExtractionFailed {
            archive: archive.to_path_buf(),
            reason: format!(
                "cannot create staging directory in {}: {e}",
                staging_parent.display()
            ),
        })?;

    log_info!(
        "[Install] Extracting {}",
        archive.display().to_string().cyan()
    );
    extract_tar_gz(archive, staging.path())?;

    let root = single_top_level_dir(staging.path())?;
    let from = root.clone().unwrap_or_else(|| staging.path().to_path_buf());
    log_debug!("[Install] Moving {} to {}", from.display(), base.display());

    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| move_failed(&from, base, e))?;
    }
    if root.is_some() {
        fs::rename(&from, base).map_err(|e| move_failed(&from, base, e))?;
    } else {
        // The staging directory itself becomes the base; stop `TempDir` from deleting it.
        let kept = staging.keep();
        fs::rename(&kept, base).map_err(|e| {
            let _ = fs::remove_dir_all(&kept);
            move_failed(&kept, base, e)
        })?;
        // Staging directories are created 0700.
        fs::set_permissions(base, fs::Permissions::from_mode(0o755))?;
    }

    log_info!(
        "[Install] Installed into {}",
        base.display().to_string().green()
    );
    Ok(base.to_path_buf())
}

fn move_failed(from: &Path, to: &Path, e: std::io::Error) -> BootstrapError {
    BootstrapError::InstallMoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason: e.to_string(),
    }
}

/// `Some(dir)` when `staging` contains exactly one entry and it is a directory.
fn single_top_level_dir(staging: &Path) -> Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(staging)?.collect::<std::io::Result<Vec<_>>>()?;
    if entries.len() != 1 {
        return Ok(None);
    }
    let entry = entries.remove(0);
    Ok(entry.file_type()?.is_dir().then(|| entry.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::utilities::compression::test_archive;

    #[test]
    fn existing_target_without_force_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("typo3");
        fs::create_dir(&base).unwrap();
        fs::write(base.join("keep.txt"), "mine").unwrap();

        let err = prepare_target(&base, false).unwrap_err();
        assert!(matches!(err, BootstrapError::TargetAlreadyExists(_)));
        assert_eq!(fs::read_to_string(base.join("keep.txt")).unwrap(), "mine");
    }

    #[test]
    fn missing_target_is_free() {
        let dir = tempfile::tempdir().unwrap();
        ensure_target_free(&dir.path().join("typo3"), false).unwrap();
        ensure_target_free(dir.path(), true).unwrap();
        assert!(dir.path().is_dir());
    }

    #[test]
    fn unusable_target_parent_is_install_move_failed() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("typo3-6.2.4.tar.gz");
        test_archive::build(&archive, &[("typo3-6.2.4/index.php", "<?php")]);
        let not_a_dir = dir.path().join("plain-file");
        fs::write(&not_a_dir, "x").unwrap();

        let err = install_staged_in(&archive, &not_a_dir.join("typo3"), false, dir.path()).unwrap_err();
        assert!(matches!(err, BootstrapError::InstallMoveFailed { .. }));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".typo3-bootstrap-"))
            .collect();
        assert!(leftovers.is_empty(), "staging left behind: {leftovers:?}");
    }

    #[test]
    fn force_replaces_previous_installation() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("typo3-6.2.4.tar.gz");
        test_archive::build(&archive, &[("typo3-6.2.4/index.php", "<?php // new")]);
        let base = dir.path().join("typo3");
        fs::create_dir(&base).unwrap();
        fs::write(base.join("stale.txt"), "old").unwrap();

        install_staged_in(&archive, &base, true, dir.path()).unwrap();
        assert!(!base.join("stale.txt").exists());
        assert_eq!(fs::read_to_string(base.join("index.php")).unwrap(), "<?php // new");
    }

    #[test]
    fn flat_archive_moves_whole_staging_directory() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("flat.tar.gz");
        test_archive::build(&archive, &[("index.php", "a"), ("typo3conf/x", "b")]);
        let base = dir.path().join("site");

        install_staged_in(&archive, &base, false, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(base.join("typo3conf/x")).unwrap(), "b");
    }
}
