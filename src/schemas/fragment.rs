//! Configuration fragment model.
//!
//! A fragment is an append-only list of `TYPO3_CONF_VARS` assignments. The
//! contributors in `libs::config_generator` push lines in order, and the
//! fragment is rendered once for the target [`ConfigFormat`].

use std::path::{Path, PathBuf};

/// Marker line in a legacy `localconf.php`; generated lines go right after it.
pub const LEGACY_MARKER: &str = "## INSTALL SCRIPT EDIT POINT TOKEN - all lines after this points may be changed by the install script!";

/// The two mutually exclusive configuration file conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TYPO3 6.x: a freshly generated `typo3conf/AdditionalConfiguration.php`.
    Additional,
    /// Older releases: `typo3conf/localconf.php`, patched at [`LEGACY_MARKER`].
    Legacy,
}

impl ConfigFormat {
    /// Selects the format from the requested version.
    pub fn for_version(version: &str) -> Self {
        if version.starts_with("6.") {
            ConfigFormat::Additional
        } else {
            ConfigFormat::Legacy
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ConfigFormat::Additional => "AdditionalConfiguration.php",
            ConfigFormat::Legacy => "localconf.php",
        }
    }

    /// `{base}/typo3conf/{file_name}`
    pub fn target_path(self, base: &Path) -> PathBuf {
        base.join("typo3conf").join(self.file_name())
    }
}

/// One generated assignment, e.g. section `DB`, key `username`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentLine {
    pub section: &'static str,
    pub key: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFragment {
    lines: Vec<FragmentLine>,
}

impl ConfigFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: &'static str, key: &'static str, value: impl Into<String>) {
        self.lines.push(FragmentLine {
            section,
            key,
            value: value.into(),
        });
    }

    pub fn lines(&self) -> &[FragmentLine] {
        &self.lines
    }

    /// Renders each line as a PHP statement for `format`.
    pub fn render(&self, format: ConfigFormat) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| render_line(line, format))
            .collect()
    }
}

fn render_line(line: &FragmentLine, format: ConfigFormat) -> String {
    let value = php_quote(&line.value);
    match (format, line.section) {
        (ConfigFormat::Legacy, "DB") => format!("$typo_db_{} = {value};", line.key),
        (ConfigFormat::Legacy, section) => {
            format!("$TYPO3_CONF_VARS['{section}']['{}'] = {value};", line.key)
        }
        (ConfigFormat::Additional, section) => format!(
            "$GLOBALS['TYPO3_CONF_VARS']['{section}']['{}'] = {value};",
            line.key
        ),
    }
}

/// Single-quoted PHP string literal.
fn php_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_prefix_selects_format() {
        assert_eq!(ConfigFormat::for_version("6.2.4"), ConfigFormat::Additional);
        assert_eq!(ConfigFormat::for_version("6.0.0"), ConfigFormat::Additional);
        assert_eq!(ConfigFormat::for_version("4.7.20"), ConfigFormat::Legacy);
        assert_eq!(ConfigFormat::for_version("7.6.0"), ConfigFormat::Legacy);
        assert_eq!(ConfigFormat::for_version("6"), ConfigFormat::Legacy);
    }

    #[test]
    fn legacy_db_lines_use_typo_db_variables() {
        let mut fragment = ConfigFragment::new();
        fragment.push("DB", "username", "t3");
        fragment.push("BE", "installToolPassword", "abc");

        assert_eq!(
            fragment.render(ConfigFormat::Legacy),
            vec![
                "$typo_db_username = 't3';".to_string(),
                "$TYPO3_CONF_VARS['BE']['installToolPassword'] = 'abc';".to_string(),
            ]
        );
        assert_eq!(
            fragment.render(ConfigFormat::Additional)[0],
            "$GLOBALS['TYPO3_CONF_VARS']['DB']['username'] = 't3';"
        );
    }

    #[test]
    fn values_are_escaped_for_single_quotes() {
        let mut fragment = ConfigFragment::new();
        fragment.push("DB", "password", r"it's\x");
        assert_eq!(
            fragment.render(ConfigFormat::Legacy)[0],
            r"$typo_db_password = 'it\'s\\x';"
        );
    }
}
