//! Error types for the bootstrapper.
//!
//! Every variant is terminal: the run stops, the message is printed to the
//! error stream and the process exits with status 1. Messages carry a
//! recovery hint where one exists.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Errors that can occur while provisioning an installation.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A configuration file exists but could not be read.
    #[error("configuration file {path} exists but is not readable: {reason}")]
    ConfigUnreadable {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// A configuration file assigns a value that cannot be used for its key.
    #[error("invalid value '{value}' for {key} in {path}")]
    InvalidConfigValue {
        /// File containing the assignment.
        path: PathBuf,
        /// The offending key.
        key: String,
        /// The offending value.
        value: String,
    },

    /// A flag value looks like another flag, e.g. `--version=--force`.
    #[error("invalid value '{value}' for --{flag}: looks like another option")]
    InvalidArgument {
        /// Name of the flag whose value was rejected.
        flag: String,
        /// The rejected value.
        value: String,
    },

    /// A required host executable is missing from the search path.
    #[error("required tool '{0}' was not found in PATH")]
    MissingDependency(String),

    /// The package download failed.
    #[error("download of {url} failed: {reason}")]
    DownloadFailed {
        /// The requested URL.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// Continuing a partial download failed; the partial file is left in place.
    #[error(
        "resuming the download of {url} into {path} failed: {reason}; \
         re-run with --force to download from scratch or delete the file manually"
    )]
    DownloadResumeFailed {
        /// The requested URL.
        url: String,
        /// The partial file that was left untouched.
        path: PathBuf,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The archive could not be unpacked.
    #[error("extracting {archive} failed: {reason}")]
    ExtractionFailed {
        /// The archive being unpacked.
        archive: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The extracted tree could not be moved to the base path.
    #[error("moving {from} to {to} failed: {reason}")]
    InstallMoveFailed {
        /// Extracted directory.
        from: PathBuf,
        /// Target base path.
        to: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The base path already exists and `--force` was not given.
    #[error("target directory {0} already exists; use --force to replace it")]
    TargetAlreadyExists(PathBuf),

    /// The legacy configuration template could not be backed up.
    #[error("backing up {path} failed: {reason}")]
    BackupFailed {
        /// File that should have been copied.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The configuration file could not be written or patched.
    #[error("writing configuration {path} failed: {reason}")]
    PatchFailed {
        /// File being written.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The configured HTTP daemon group does not exist on this host.
    #[error("group '{0}' does not exist on this host; set --httpd-group")]
    UnknownGroup(String),

    /// The configured owner does not exist on this host.
    #[error("user '{0}' does not exist on this host; set --owner")]
    UnknownUser(String),

    /// A privileged ownership or mode change failed.
    #[error("'{command}' failed: {reason}")]
    PermissionFixFailed {
        /// The rendered command line.
        command: String,
        /// Captured error output or spawn failure.
        reason: String,
    },

    /// Replacing the symlinked index file failed.
    #[error("fixing index file {path} failed: {reason}")]
    IndexFixFailed {
        /// The index file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
