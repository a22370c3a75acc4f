// Verifies the host executables the run relies on before anything is touched.

use crate::errors::{BootstrapError, Result};
use crate::{log_debug, log_info};
use colored::Colorize;
use std::ffi::OsStr;

/// Executables used by the permission fixer.
pub const REQUIRED_TOOLS: &[&str] = &["chown", "chgrp", "chmod"];

/// Checks `tools` against the process `PATH`.
/// The first missing tool aborts with `MissingDependency`.
pub fn check_dependencies(tools: &[&str]) -> Result<()> {
    check_dependencies_in(tools, std::env::var_os("PATH"))
}

/// Same as [`check_dependencies`] with an explicit search path.
pub fn check_dependencies_in<P: AsRef<OsStr>>(tools: &[&str], search_path: Option<P>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    for tool in tools {
        match which::which_in(tool, search_path.as_ref(), &cwd) {
            Ok(found) => log_debug!("[Deps] {} -> {}", tool, found.display()),
            Err(_) => return Err(BootstrapError::MissingDependency((*tool).to_string())),
        }
    }
    log_info!("[Deps] All required tools found: {}", tools.join(", ").green());
    Ok(())
}
