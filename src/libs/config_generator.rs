//! # Configuration Generator
//!
//! Builds the configuration fragment from independent contributors and writes
//! it to the one target file the requested version uses:
//!
//! - 6.x: `typo3conf/AdditionalConfiguration.php`, generated fresh.
//! - older: `typo3conf/localconf.php`, backed up to `localconf.php.orig` and
//!   patched right after the install script marker.
//!
//! The database name is never written. The dummy package's own installer
//! asks for it and refuses to continue when it is preset.

use crate::errors::{BootstrapError, Result};
use crate::libs::install_password::InstallPassword;
use crate::libs::utilities::file_operations::{insert_after_marker, touch, write_lines};
use crate::schemas::fragment::{ConfigFormat, ConfigFragment, LEGACY_MARKER};
use crate::schemas::settings::Settings;
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Marker file that unlocks the TYPO3 install tool.
pub const ENABLE_INSTALL_TOOL: &str = "ENABLE_INSTALL_TOOL";

/// Resolves an executable name to an absolute path, `None` if absent.
pub type ToolLookup<'a> = &'a dyn Fn(&str) -> Option<PathBuf>;

/// Default lookup on the process `PATH`.
pub fn which_lookup(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Collects every enabled contributor's lines, in contribution order.
pub fn build_fragment(
    settings: &Settings,
    password: Option<&InstallPassword>,
    lookup: ToolLookup<'_>,
) -> ConfigFragment {
    let mut fragment = ConfigFragment::new();
    add_db_credentials(&mut fragment, settings);
    if let Some(password) = password {
        fragment.push("BE", "installToolPassword", password.hash());
    }
    if !settings.skip_gm_detect {
        add_graphicsmagick(&mut fragment, lookup);
    }
    if !settings.skip_unzip_detect {
        add_unzip(&mut fragment, lookup);
    }
    log_debug!("[Config] Fragment has {} lines", fragment.lines().len());
    fragment
}

fn add_db_credentials(fragment: &mut ConfigFragment, settings: &Settings) {
    if settings.db_user.is_empty() && settings.db_pass.is_empty() && settings.db_host.is_empty() {
        return;
    }
    fragment.push("DB", "username", settings.db_user.as_str());
    fragment.push("DB", "password", settings.db_pass.as_str());
    fragment.push("DB", "host", settings.db_host.as_str());
    if !settings.db_name.is_empty() {
        log_info!(
            "[Config] Database name '{}' is not written; enter it in the TYPO3 installer",
            settings.db_name.yellow()
        );
    }
}

fn add_graphicsmagick(fragment: &mut ConfigFragment, lookup: ToolLookup<'_>) {
    let Some(gm) = lookup("gm") else {
        log_warn!("[Config] GraphicsMagick ('gm') not found; image processing stays unconfigured");
        return;
    };
    let Some(dir) = gm.parent() else {
        log_warn!("[Config] Cannot derive a directory from {}", gm.display());
        return;
    };
    let dir = format!("{}/", dir.display().to_string().trim_end_matches('/'));
    log_info!("[Config] GraphicsMagick found in {}", dir.green());
    fragment.push("GFX", "im_path", dir.as_str());
    fragment.push("GFX", "im_version_5", "gm");
    fragment.push("GFX", "im_path_lzw", dir);
}

fn add_unzip(fragment: &mut ConfigFragment, lookup: ToolLookup<'_>) {
    match lookup("unzip") {
        Some(unzip) => {
            log_info!("[Config] unzip found at {}", unzip.display().to_string().green());
            fragment.push("BE", "unzip_path", unzip.display().to_string());
        }
        None => log_warn!("[Config] 'unzip' not found; extension uploads from ZIP files are disabled"),
    }
}

/// Writes `fragment` into the target file of `format` under `base`.
/// Returns the path of the written file.
pub fn write_config(base: &Path, format: ConfigFormat, fragment: &ConfigFragment) -> Result<PathBuf> {
    let target = format.target_path(base);
    let lines = fragment.render(format);
    match format {
        ConfigFormat::Additional => write_additional(&target, &lines)?,
        ConfigFormat::Legacy => patch_legacy(&target, &lines)?,
    }
    log_info!(
        "[Config] Wrote {} settings to {}",
        lines.len(),
        target.display().to_string().green()
    );
    Ok(target)
}

fn write_additional(target: &Path, lines: &[String]) -> Result<()> {
    let patch_failed = |e: std::io::Error| BootstrapError::PatchFailed {
        path: target.to_path_buf(),
        reason: e.to_string(),
    };
    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir).map_err(patch_failed)?;
    }
    let mut content = Vec::with_capacity(lines.len() + 1);
    content.push("<?php".to_string());
    content.extend_from_slice(lines);
    write_lines(target, &content).map_err(patch_failed)
}

fn patch_legacy(target: &Path, lines: &[String]) -> Result<()> {
    let mut backup = target.as_os_str().to_owned();
    backup.push(".orig");
    let backup = PathBuf::from(backup);

    fs::copy(target, &backup).map_err(|e| BootstrapError::BackupFailed {
        path: target.to_path_buf(),
        reason: e.to_string(),
    })?;
    log_debug!("[Config] Backup written to {}", backup.display());

    let patch_failed = |reason: String| BootstrapError::PatchFailed {
        path: target.to_path_buf(),
        reason,
    };
    let original = fs::read_to_string(&backup).map_err(|e| patch_failed(e.to_string()))?;
    let patched = insert_after_marker(&original, LEGACY_MARKER, lines)
        .ok_or_else(|| patch_failed("install script marker line not found".to_string()))?;
    fs::write(target, patched).map_err(|e| patch_failed(e.to_string()))
}

/// Creates `typo3conf/ENABLE_INSTALL_TOOL` (and the directory) if missing.
pub fn enable_install_tool(base: &Path) -> Result<PathBuf> {
    let dir = base.join("typo3conf");
    fs::create_dir_all(&dir)?;
    let marker = dir.join(ENABLE_INSTALL_TOOL);
    touch(&marker)?;
    log_debug!("[Config] Install tool enabled via {}", marker.display());
    Ok(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_tools(_: &str) -> Option<PathBuf> {
        None
    }

    fn all_tools(name: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/bin").join(name))
    }

    fn settings() -> Settings {
        Settings {
            db_user: "t3".into(),
            db_pass: "pw".into(),
            db_host: "db".into(),
            db_name: "secret_database_name".into(),
            ..Settings::default()
        }
    }

    #[test]
    fn contributors_in_order() {
        let pw = InstallPassword::from_plaintext("joh316");
        let fragment = build_fragment(&settings(), Some(&pw), &all_tools);
        let keys: Vec<_> = fragment.lines().iter().map(|l| (l.section, l.key)).collect();
        assert_eq!(
            keys,
            vec![
                ("DB", "username"),
                ("DB", "password"),
                ("DB", "host"),
                ("BE", "installToolPassword"),
                ("GFX", "im_path"),
                ("GFX", "im_version_5"),
                ("GFX", "im_path_lzw"),
                ("BE", "unzip_path"),
            ]
        );
        assert_eq!(fragment.lines()[4].value, "/usr/bin/");
        assert_eq!(fragment.lines()[7].value, "/usr/bin/unzip");
    }

    #[test]
    fn skip_toggles_and_missing_tools_drop_lines() {
        let s = Settings {
            skip_gm_detect: true,
            ..settings()
        };
        let fragment = build_fragment(&s, None, &all_tools);
        assert!(fragment.lines().iter().all(|l| l.section != "GFX"));
        assert!(fragment.lines().iter().any(|l| l.key == "unzip_path"));

        let fragment = build_fragment(&settings(), None, &no_tools);
        assert_eq!(fragment.lines().len(), 3);
    }

    #[test]
    fn database_name_never_written_in_either_format() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        let conf = base.join("typo3conf");
        fs::create_dir_all(&conf).unwrap();
        fs::write(conf.join("localconf.php"), format!("<?php\n{LEGACY_MARKER}\n?>\n")).unwrap();

        let fragment = build_fragment(&settings(), None, &no_tools);
        for format in [ConfigFormat::Additional, ConfigFormat::Legacy] {
            let path = write_config(base, format, &fragment).unwrap();
            let text = fs::read_to_string(path).unwrap();
            assert!(!text.contains("secret_database_name"));
            assert!(!text.contains("['DB']['database']"));
            assert!(!text.contains("$typo_db ="));
        }
    }

    #[test]
    fn additional_format_is_a_fresh_php_file() {
        let dir = tempfile::tempdir().unwrap();
        let pw = InstallPassword::from_plaintext("joh316");
        let fragment = build_fragment(&settings(), Some(&pw), &no_tools);

        let path = write_config(dir.path(), ConfigFormat::Additional, &fragment).unwrap();
        assert_eq!(path, dir.path().join("typo3conf/AdditionalConfiguration.php"));
        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("<?php\n"));
        assert!(text.contains(
            "$GLOBALS['TYPO3_CONF_VARS']['BE']['installToolPassword'] = 'bacb98acf97e0b6112b1d1b650b84971';"
        ));
        assert!(!text.contains("joh316"));
    }

    #[test]
    fn legacy_format_backs_up_and_patches_after_marker() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("typo3conf");
        fs::create_dir_all(&conf).unwrap();
        let template = format!("<?php\n$a = 1;\n{LEGACY_MARKER}\n$b = 2;\n?>\n");
        fs::write(conf.join("localconf.php"), &template).unwrap();

        let fragment = build_fragment(&settings(), None, &no_tools);
        write_config(dir.path(), ConfigFormat::Legacy, &fragment).unwrap();

        assert_eq!(fs::read_to_string(conf.join("localconf.php.orig")).unwrap(), template);
        let patched = fs::read_to_string(conf.join("localconf.php")).unwrap();
        assert_eq!(
            patched,
            format!(
                "<?php\n$a = 1;\n{LEGACY_MARKER}\n$typo_db_username = 't3';\n$typo_db_password = 'pw';\n$typo_db_host = 'db';\n$b = 2;\n?>\n"
            )
        );
    }

    #[test]
    fn legacy_without_template_is_backup_failed() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_config(dir.path(), ConfigFormat::Legacy, &ConfigFragment::new()).unwrap_err();
        assert!(matches!(err, BootstrapError::BackupFailed { .. }));
    }

    #[test]
    fn legacy_without_marker_is_patch_failed() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("typo3conf");
        fs::create_dir_all(&conf).unwrap();
        fs::write(conf.join("localconf.php"), "<?php\n?>\n").unwrap();

        let err = write_config(dir.path(), ConfigFormat::Legacy, &ConfigFragment::new()).unwrap_err();
        assert!(matches!(err, BootstrapError::PatchFailed { .. }));
    }

    #[test]
    fn install_tool_marker_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = enable_install_tool(dir.path()).unwrap();
        let second = enable_install_tool(dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::metadata(first).unwrap().len(), 0);
    }
}
