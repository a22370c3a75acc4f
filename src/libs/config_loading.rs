use crate::errors::{BootstrapError, Result};
use crate::libs::utilities::path_helpers::expand_path;
use crate::schemas::settings::{Settings, SettingsOverride};
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an alternative general config file.
pub const GENERAL_CONFIG_ENV: &str = "TYPO3_CONFIG";
/// Environment variable pointing at an alternative tool config file.
pub const TOOL_CONFIG_ENV: &str = "TYPO3_BOOTSTRAP_CONFIG";

/// Locations of the two optional configuration files, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFiles {
    /// Shared by all TYPO3 tooling of the operator: `~/.typo3.conf`.
    pub general: Option<PathBuf>,
    /// Specific to this tool: `~/.typo3-bootstrap.conf`.
    pub tool: Option<PathBuf>,
}

impl ConfigFiles {
    /// Resolves both paths from the environment or the home directory.
    pub fn discover() -> Self {
        Self::discover_with(|var| std::env::var(var).ok(), dirs::home_dir())
    }

    /// [`ConfigFiles::discover`] with the environment lookup and home directory supplied.
    /// An empty variable counts as unset.
    pub fn discover_with(env: impl Fn(&str) -> Option<String>, home: Option<PathBuf>) -> Self {
        let from_env_or_home = |var: &str, file: &str| {
            env(var)
                .filter(|p| !p.is_empty())
                .map(|p| expand_path(&p))
                .or_else(|| home.as_ref().map(|home| home.join(file)))
        };
        Self {
            general: from_env_or_home(GENERAL_CONFIG_ENV, ".typo3.conf"),
            tool: from_env_or_home(TOOL_CONFIG_ENV, ".typo3-bootstrap.conf"),
        }
    }
}

/// Builds the final settings: defaults, general file, tool file, then `cli`.
pub fn resolve_settings(files: &ConfigFiles, cli: SettingsOverride) -> Result<Settings> {
    let mut settings = Settings::default();
    for path in [&files.general, &files.tool].into_iter().flatten() {
        if let Some(layer) = load_config_file(path)? {
            settings = settings.apply(layer);
        }
    }
    let settings = settings.apply(cli);
    log_debug!("[Config] Resolved settings: {:#?}", settings);
    Ok(settings)
}

/// Reads one config file. A missing file yields `Ok(None)`; a file that exists
/// but cannot be read is `ConfigUnreadable`.
pub fn load_config_file(path: &Path) -> Result<Option<SettingsOverride>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log_debug!("[Config] No config file at {}", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(BootstrapError::ConfigUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };
    log_info!(
        "[Config] Loading configuration from {}",
        path.display().to_string().cyan()
    );
    parse_config(&contents, path).map(Some)
}

/// Parses the `KEY=value` format. `path` is only used for diagnostics.
///
/// Quoting follows `sh` for a single word (see [`parse_value`]); variable
/// references outside the path keys are kept as written, not expanded.
pub fn parse_config(contents: &str, path: &Path) -> Result<SettingsOverride> {
    let mut layer = SettingsOverride::default();

    for (number, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
        let Some((key, value)) = line.split_once('=') else {
            log_warn!(
                "[Config] {}:{}: ignoring line without assignment",
                path.display(),
                number + 1
            );
            continue;
        };
        let key = key.trim();
        let (value, literal) = parse_value(value);

        let flag = |v: &str| parse_bool(v).ok_or_else(|| invalid(path, key, v));
        match key {
            "BASE_PATH" => layer.base_path = Some(path_value(&value, literal)),
            "VERSION" => layer.version = Some(value),
            "PACKAGE" => layer.package = Some(value),
            "STORE" => layer.store = Some(path_value(&value, literal)),
            "DOWNLOAD_URL" => layer.download_url = Some(value),
            "SKIP_CONFIG" => layer.skip_config = Some(flag(&value)?),
            "SKIP_RIGHTS" => layer.skip_rights = Some(flag(&value)?),
            "SKIP_GM_DETECT" => layer.skip_gm_detect = Some(flag(&value)?),
            "SKIP_UNZIP_DETECT" => layer.skip_unzip_detect = Some(flag(&value)?),
            "OWNER" => layer.owner = Some(value),
            "HTTPD_GROUP" => layer.httpd_group = Some(value),
            "FIX_INDEX_FILE" => layer.fix_index_file = Some(flag(&value)?),
            "DB_USER" => layer.db_user = Some(value),
            "DB_PASS" => layer.db_pass = Some(value),
            "DB_HOST" => layer.db_host = Some(value),
            "DB_NAME" => layer.db_name = Some(value),
            "FORCE" => layer.force = Some(flag(&value)?),
            "VERBOSE" => layer.verbose = Some(flag(&value)?),
            "QUIET" => layer.quiet = Some(flag(&value)?),
            other => log_warn!(
                "[Config] {}:{}: unknown key '{}' ignored",
                path.display(),
                number + 1,
                other.yellow()
            ),
        }
    }

    Ok(layer)
}

fn invalid(path: &Path, key: &str, value: &str) -> BootstrapError {
    BootstrapError::InvalidConfigValue {
        path: path.to_path_buf(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Reads a value the way `sh` reads a single word. Single quotes are literal.
/// Double quotes honour `\"`, `\\`, `\$` and `` \` ``. An unquoted value ends at
/// a `#` that starts a word. The flag is `true` for single-quoted values,
/// which are exempt from `~`/`$VAR` expansion.
fn parse_value(raw: &str) -> (String, bool) {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix('\'') {
        if let Some(end) = rest.find('\'') {
            return (rest[..end].to_string(), true);
        }
    }
    if let Some(rest) = raw.strip_prefix('"') {
        let mut out = String::with_capacity(rest.len());
        let mut chars = rest.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => return (out, false),
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\' | '$' | '`')) => out.push(next),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                c => out.push(c),
            }
        }
        // Unterminated quote: read it as an unquoted word.
    }

    let mut word_start = true;
    let end = raw
        .char_indices()
        .find(|&(_, c)| {
            let comment = c == '#' && word_start;
            word_start = c.is_whitespace();
            comment
        })
        .map_or(raw.len(), |(i, _)| i);
    (raw[..end].trim_end().to_string(), false)
}

fn path_value(value: &str, literal: bool) -> PathBuf {
    if literal {
        PathBuf::from(value)
    } else {
        expand_path(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_shell_style_assignments() {
        let layer = parse_config(
            "# comment\n\nexport VERSION=\"4.7.20\"\nDB_USER='t3 user'\nSKIP_RIGHTS=yes\nHTTPD_GROUP=apache\n",
            Path::new("test.conf"),
        )
        .unwrap();

        assert_eq!(layer.version.as_deref(), Some("4.7.20"));
        assert_eq!(layer.db_user.as_deref(), Some("t3 user"));
        assert_eq!(layer.skip_rights, Some(true));
        assert_eq!(layer.httpd_group.as_deref(), Some("apache"));
        assert_eq!(layer.force, None);
    }

    #[test]
    fn single_quotes_stay_literal_and_trailing_comments_are_dropped() {
        let layer = parse_config(
            "BASE_PATH='$HOME/x'\nVERSION=6.2.4 # pinned\nDB_PASS=\"a #b\" # quoted hash\nDB_USER=t3#x\nSTORE=/var/t3 #\n",
            Path::new("test.conf"),
        )
        .unwrap();

        assert_eq!(layer.base_path, Some(PathBuf::from("$HOME/x")));
        assert_eq!(layer.version.as_deref(), Some("6.2.4"));
        assert_eq!(layer.db_pass.as_deref(), Some("a #b"));
        assert_eq!(layer.db_user.as_deref(), Some("t3#x"));
        assert_eq!(layer.store, Some(PathBuf::from("/var/t3")));
    }

    #[test]
    fn env_variables_override_home_locations() {
        let home = Some(PathBuf::from("/home/op"));
        let env = |var: &str| match var {
            TOOL_CONFIG_ENV => Some("/etc/t3/bootstrap.conf".to_string()),
            GENERAL_CONFIG_ENV => Some(String::new()),
            _ => None,
        };

        let files = ConfigFiles::discover_with(env, home.clone());
        assert_eq!(files.general, Some(PathBuf::from("/home/op/.typo3.conf")));
        assert_eq!(files.tool, Some(PathBuf::from("/etc/t3/bootstrap.conf")));

        let files = ConfigFiles::discover_with(|_| None, home);
        assert_eq!(files.tool, Some(PathBuf::from("/home/op/.typo3-bootstrap.conf")));

        let files = ConfigFiles::discover_with(|_| None, None);
        assert_eq!(files, ConfigFiles { general: None, tool: None });
    }

    #[test]
    fn rejects_non_boolean_toggle() {
        let err = parse_config("FORCE=maybe\n", Path::new("test.conf")).unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidConfigValue { ref key, .. } if key == "FORCE"));
    }

    #[test]
    fn exported_settings_parse_back() {
        let settings = Settings {
            db_pass: "pa$HOME`id`\"\\".into(),
            skip_gm_detect: true,
            ..Settings::default()
        };
        let layer = parse_config(&settings.to_config_file(), Path::new("export.conf")).unwrap();
        assert_eq!(layer.db_pass.as_deref(), Some("pa$HOME`id`\"\\"));
        assert_eq!(layer.skip_gm_detect, Some(true));
        assert_eq!(Settings::default().apply(layer).db_pass, "pa$HOME`id`\"\\");
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config_file(&dir.path().join("absent.conf")).unwrap(), None);
    }

    #[test]
    fn tool_file_overrides_general_file_and_cli_overrides_both() {
        let dir = tempfile::tempdir().unwrap();
        let general = write(
            dir.path(),
            "general.conf",
            "VERSION=4.5.40\nDB_HOST=db.internal\nOWNER=web\n",
        );
        let tool = write(dir.path(), "tool.conf", "VERSION=4.7.20\nOWNER=deploy\n");
        let files = ConfigFiles {
            general: Some(general),
            tool: Some(tool),
        };
        let cli = SettingsOverride {
            owner: Some("root".into()),
            ..Default::default()
        };

        let settings = resolve_settings(&files, cli).unwrap();
        assert_eq!(settings.version, "4.7.20");
        assert_eq!(settings.db_host, "db.internal");
        assert_eq!(settings.owner, "root");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        // Root can read anything, so the check is meaningless there.
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "locked.conf", "VERSION=1\n");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, BootstrapError::ConfigUnreadable { .. }));
    }
}
