//! # Permission Fixer
//!
//! Creates the runtime directories TYPO3 writes to and hands them to the web
//! server's group:
//!
//! 1. ensure `typo3conf`, `typo3temp`, `uploads`, `fileadmin` exist,
//! 2. `chown -R {owner} {base}`,
//! 3. for each runtime directory, plus the legacy `typo3/ext` when present:
//!    `chgrp -R {httpd_group}` and `chmod -R g+rwX,o-w`.
//!
//! The ownership changes go through a [`PrivilegedFs`]. When the process can
//! neither act as root nor use passwordless `sudo`, [`select_privileged_fs`]
//! hands out a [`DisabledPrivilegedFs`] so the step is skipped with a warning.

use crate::errors::{BootstrapError, Result};
use crate::libs::utilities::platform::{self, CommandExecutor, SystemCommandExecutor};
use crate::schemas::settings::Settings;
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Runtime directories created under the base path and given to the web server group.
pub const RUNTIME_DIRS: &[&str] = &["typo3conf", "typo3temp", "uploads", "fileadmin"];
/// Global extension directory of pre-6.0 installations, relative to the base path.
pub const LEGACY_EXT_DIR: &str = "typo3/ext";
/// Group may read and write, directories become searchable, others lose write.
pub const GROUP_MODE: &str = "g+rwX,o-w";

/// Recursive ownership and mode changes that may need elevated rights.
pub trait PrivilegedFs {
    /// Whether calls actually change anything.
    fn is_enabled(&self) -> bool;
    fn chown_recursive(&self, user: &str, path: &Path) -> Result<()>;
    fn chgrp_recursive(&self, group: &str, path: &Path) -> Result<()>;
    fn chmod_recursive(&self, mode: &str, path: &Path) -> Result<()>;
}

/// Runs `chown`/`chgrp`/`chmod -R`, optionally through `sudo -n`.
pub struct CommandPrivilegedFs<E: CommandExecutor> {
    executor: E,
    use_sudo: bool,
}

impl<E: CommandExecutor> CommandPrivilegedFs<E> {
    pub fn new(executor: E, use_sudo: bool) -> Self {
        Self { executor, use_sudo }
    }

    fn run(&self, tool: &str, arg: &str, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        let mut argv: Vec<&str> = Vec::with_capacity(6);
        if self.use_sudo {
            argv.extend(["-n", tool]);
        }
        // `--` keeps a base path starting with `-` from being read as an option.
        argv.extend(["-R", arg, "--", path.as_ref()]);
        let cmd = if self.use_sudo { "sudo" } else { tool };
        let rendered = format!("{cmd} {}", argv.join(" "));
        log_debug!("[Rights] Running {}", rendered.dimmed());

        let output = self
            .executor
            .run(cmd, &argv)
            .map_err(|e| BootstrapError::PermissionFixFailed {
                command: rendered.clone(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(BootstrapError::PermissionFixFailed {
                command: rendered,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl<E: CommandExecutor> PrivilegedFs for CommandPrivilegedFs<E> {
    fn is_enabled(&self) -> bool {
        true
    }

    fn chown_recursive(&self, user: &str, path: &Path) -> Result<()> {
        self.run("chown", user, path)
    }

    fn chgrp_recursive(&self, group: &str, path: &Path) -> Result<()> {
        self.run("chgrp", group, path)
    }

    fn chmod_recursive(&self, mode: &str, path: &Path) -> Result<()> {
        self.run("chmod", mode, path)
    }
}

/// Stand-in used when no elevated rights are available.
pub struct DisabledPrivilegedFs;

impl PrivilegedFs for DisabledPrivilegedFs {
    fn is_enabled(&self) -> bool {
        false
    }

    fn chown_recursive(&self, _user: &str, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn chgrp_recursive(&self, _group: &str, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn chmod_recursive(&self, _mode: &str, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// How ownership changes get their privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeMode {
    /// Running as root, commands run directly.
    Direct,
    /// Passwordless `sudo -n` works.
    Sudo,
    /// Neither; the step is skipped.
    Disabled,
}

/// Host checks behind [`select_privileged_fs`], replaceable in tests.
pub struct HostPrivileges {
    pub is_root: fn() -> bool,
    pub sudo_works: fn() -> bool,
}

impl Default for HostPrivileges {
    fn default() -> Self {
        Self {
            is_root: platform::is_root,
            sudo_works: passwordless_sudo,
        }
    }
}

fn passwordless_sudo() -> bool {
    which::which("sudo").is_ok()
        && SystemCommandExecutor
            .run("sudo", &["-n", "true"])
            .map(|o| o.status.success())
            .unwrap_or(false)
}

/// Root first, then passwordless sudo. `sudo` is not tried when running as root.
pub fn privilege_mode(host: &HostPrivileges) -> PrivilegeMode {
    if (host.is_root)() {
        PrivilegeMode::Direct
    } else if (host.sudo_works)() {
        PrivilegeMode::Sudo
    } else {
        PrivilegeMode::Disabled
    }
}

/// Picks the implementation for this process: direct commands as root,
/// `sudo -n` when passwordless sudo works, otherwise disabled with a warning.
pub fn select_privileged_fs() -> Box<dyn PrivilegedFs> {
    match privilege_mode(&HostPrivileges::default()) {
        PrivilegeMode::Direct => {
            log_debug!("[Rights] Running as root");
            Box::new(CommandPrivilegedFs::new(SystemCommandExecutor, false))
        }
        PrivilegeMode::Sudo => {
            log_debug!("[Rights] Using passwordless sudo");
            Box::new(CommandPrivilegedFs::new(SystemCommandExecutor, true))
        }
        PrivilegeMode::Disabled => {
            log_warn!(
                "[Rights] Not running as root and sudo needs a password; skipping ownership fixes. \
                 Re-run as root or pass {} to silence this.",
                "--skip-rights".bold()
            );
            Box::new(DisabledPrivilegedFs)
        }
    }
}

/// Name lookups, behind a small seam so tests need not depend on the host's users.
pub struct Accounts {
    pub group_exists: fn(&str) -> bool,
    pub user_exists: fn(&str) -> bool,
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            group_exists: platform::group_exists,
            user_exists: platform::user_exists,
        }
    }
}

/// Creates the runtime directories and applies ownership and modes.
pub fn fix_permissions(settings: &Settings, fs_ops: &dyn PrivilegedFs, accounts: &Accounts) -> Result<()> {
    let base = settings.base_path.as_path();

    for dir in RUNTIME_DIRS {
        let path = base.join(dir);
        if !path.is_dir() {
            log_debug!("[Rights] Creating {}", path.display());
            fs::create_dir_all(&path)?;
        }
    }

    if !fs_ops.is_enabled() {
        return Ok(());
    }

    if !(accounts.group_exists)(&settings.httpd_group) {
        return Err(BootstrapError::UnknownGroup(settings.httpd_group.clone()));
    }
    if !(accounts.user_exists)(&settings.owner) {
        return Err(BootstrapError::UnknownUser(settings.owner.clone()));
    }

    log_info!(
        "[Rights] Setting owner {} on {}",
        settings.owner.cyan(),
        base.display()
    );
    fs_ops.chown_recursive(&settings.owner, base)?;

    let legacy_ext = base.join(LEGACY_EXT_DIR);
    let mut group_dirs: Vec<_> = RUNTIME_DIRS.iter().map(|d| base.join(d)).collect();
    if legacy_ext.is_dir() {
        group_dirs.push(legacy_ext);
    } else {
        log_info!("[Rights] Note: no {} directory, skipping it", LEGACY_EXT_DIR);
    }

    for dir in &group_dirs {
        fs_ops.chgrp_recursive(&settings.httpd_group, dir)?;
        fs_ops.chmod_recursive(GROUP_MODE, dir)?;
    }
    log_info!(
        "[Rights] Group {} can now write to {} directories",
        settings.httpd_group.cyan(),
        group_dirs.len()
    );
    Ok(())
}
