// HTTP download helpers: a fresh download that truncates the destination and a
// ranged download that continues an existing partial file.

use crate::errors::{BootstrapError, Result};
// Our custom logging macros to give us nicely formatted (and colored!) output.
use crate::{log_debug, log_info};
// The 'colored' crate helps us make our console output look pretty and readable.
use colored::Colorize;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::time::Duration;

/// Connect timeout for package downloads. Transfers themselves are not bounded.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a resume attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// The server sent the missing tail; this many bytes were appended.
    Appended(u64),
    /// The server reported the range as unsatisfiable: nothing left to fetch.
    AlreadyComplete,
}

fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .user_agent(concat!("typo3-bootstrap/", env!("CARGO_PKG_VERSION")))
        .timeout_connect(CONNECT_TIMEOUT)
        .build()
}

/// Downloads `url` into `dest`, creating or truncating the file.
///
/// # Returns
/// * `Ok(u64)` with the number of bytes written.
/// * `DownloadFailed` on any network, HTTP status or write error.
pub fn download_file(url: &str, dest: &Path) -> Result<u64> {
    log_debug!("[Utils] Starting download from URL: {}", url.blue());
    let failed = |reason: String| BootstrapError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let response = http_agent()
        .get(url)
        .call()
        .map_err(|e| failed(e.to_string()))?;

    let mut file = File::create(dest).map_err(|e| failed(e.to_string()))?;
    let mut reader = response.into_reader();
    let written = io::copy(&mut reader, &mut file).map_err(|e| failed(e.to_string()))?;

    log_debug!(
        "[Utils] {} bytes downloaded to {}",
        written,
        dest.to_string_lossy().green()
    );
    Ok(written)
}

/// Continues a partial download of `url` in `dest` with a `Range` request
/// starting at the current file length.
///
/// A `206 Partial Content` response whose `Content-Range` starts at that offset
/// is appended. `416 Range Not Satisfiable` means the file is already complete.
/// Anything else, including a plain `200` from a server that ignores ranges,
/// is `DownloadResumeFailed`; the partial file is never truncated.
pub fn resume_download(url: &str, dest: &Path) -> Result<ResumeOutcome> {
    let failed = |reason: String| BootstrapError::DownloadResumeFailed {
        url: url.to_string(),
        path: dest.to_path_buf(),
        reason,
    };

    let offset = dest.metadata().map_err(|e| failed(e.to_string()))?.len();
    log_info!(
        "[Utils] Resuming download of {} at byte {}",
        dest.display().to_string().cyan(),
        offset
    );

    let response = match http_agent()
        .get(url)
        .set("Range", &format!("bytes={offset}-"))
        .call()
    {
        Ok(response) => response,
        Err(ureq::Error::Status(416, _)) => {
            log_info!("[Utils] The file is already fully retrieved; nothing to do.");
            return Ok(ResumeOutcome::AlreadyComplete);
        }
        Err(e) => return Err(failed(e.to_string())),
    };

    if response.status() != 206 {
        return Err(failed(format!(
            "server answered {} instead of 206 Partial Content",
            response.status()
        )));
    }
    let expected = format!("bytes {offset}-");
    match response.header("content-range") {
        Some(range) if range.starts_with(&expected) => {}
        other => {
            return Err(failed(format!(
                "unexpected Content-Range {:?} for offset {offset}",
                other
            )));
        }
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(dest)
        .map_err(|e| failed(e.to_string()))?;
    let mut reader = response.into_reader();
    let appended = io::copy(&mut reader, &mut file).map_err(|e| failed(e.to_string()))?;

    log_debug!("[Utils] Appended {} bytes to {}", appended, dest.display());
    Ok(ResumeOutcome::Appended(appended))
}
