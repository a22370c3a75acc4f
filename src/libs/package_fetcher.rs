//! # Package Fetcher
//!
//! Makes sure `{store}/{package}-{version}.tar.gz` is present and complete.
//!
//! - No cached archive, or `--force`: download from scratch.
//! - Cached archive without `--force`: continue it with a ranged request. A
//!   server that refuses or ignores the range stops the run and leaves the file
//!   alone, so the operator decides between `--force` and deleting it.

use crate::errors::{BootstrapError, Result};
use crate::libs::utilities::assets::{self, ResumeOutcome};
use crate::schemas::package::PackageDescriptor;
use crate::schemas::settings::Settings;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

/// Fetches the package described by `settings` into the store and returns
/// the archive path.
pub fn fetch(settings: &Settings) -> Result<PathBuf> {
    let package = PackageDescriptor::new(&settings.package, &settings.version);
    let url = package.download_url(&settings.download_url);
    let artifact = package.artifact_path(&settings.store);

    fs::create_dir_all(&settings.store).map_err(|e| BootstrapError::DownloadFailed {
        url: url.clone(),
        reason: format!("cannot create store {}: {e}", settings.store.display()),
    })?;

    if artifact.exists() && !settings.force {
        log_info!(
            "[Fetch] Found cached {}, making sure it is complete",
            artifact.display().to_string().cyan()
        );
        match assets::resume_download(&url, &artifact)? {
            ResumeOutcome::AlreadyComplete => {}
            ResumeOutcome::Appended(n) => log_info!("[Fetch] Retrieved the remaining {} bytes", n),
        }
    } else {
        if artifact.exists() {
            log_info!("[Fetch] --force given, downloading {} again", package.file_name());
        }
        log_info!("[Fetch] Downloading {}", url.blue());
        let bytes = assets::download_file(&url, &artifact)?;
        log_debug!("[Fetch] {} bytes written", bytes);
    }

    log_info!(
        "[Fetch] Package available at {}",
        artifact.display().to_string().green()
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::utilities::assets::test_server::{Reply, serve};

    fn settings_for(url: &str, store: PathBuf, force: bool) -> Settings {
        Settings {
            store,
            version: "6.2.4".into(),
            package: "typo3".into(),
            download_url: format!("{url}/{{package}}-{{version}}.tar.gz"),
            force,
            ..Settings::default()
        }
    }

    #[test]
    fn downloads_into_fresh_store() {
        let (url, requests) = serve(vec![Reply::new("200 OK", b"archive")]);
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store");

        let artifact = fetch(&settings_for(&url, store.clone(), false)).unwrap();
        assert_eq!(artifact, store.join("typo3-6.2.4.tar.gz"));
        assert_eq!(fs::read(&artifact).unwrap(), b"archive");
        assert!(requests.recv().unwrap().starts_with("GET /typo3-6.2.4.tar.gz "));
    }

    #[test]
    fn cached_archive_is_resumed_not_replaced() {
        let (url, requests) = serve(vec![
            Reply::new("206 Partial Content", b"ive").header("Content-Range", "bytes 4-6/7"),
        ]);
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("typo3-6.2.4.tar.gz"), b"arch").unwrap();

        let artifact = fetch(&settings_for(&url, dir.path().to_path_buf(), false)).unwrap();
        assert_eq!(fs::read(&artifact).unwrap(), b"archive");
        assert!(requests.recv().unwrap().to_ascii_lowercase().contains("range: bytes=4-"));
    }

    #[test]
    fn force_downloads_again() {
        let (url, requests) = serve(vec![Reply::new("200 OK", b"fresh")]);
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("typo3-6.2.4.tar.gz"), b"old and long").unwrap();

        let artifact = fetch(&settings_for(&url, dir.path().to_path_buf(), true)).unwrap();
        assert_eq!(fs::read(&artifact).unwrap(), b"fresh");
        assert!(!requests.recv().unwrap().to_ascii_lowercase().contains("range:"));
    }

    #[test]
    fn rejected_resume_leaves_partial_file() {
        let (url, _requests) = serve(vec![Reply::new("500 Internal Server Error", b"")]);
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("typo3-6.2.4.tar.gz");
        fs::write(&partial, b"part").unwrap();

        let err = fetch(&settings_for(&url, dir.path().to_path_buf(), false)).unwrap_err();
        assert!(matches!(err, BootstrapError::DownloadResumeFailed { .. }));
        assert_eq!(fs::read(&partial).unwrap(), b"part");
    }
}
