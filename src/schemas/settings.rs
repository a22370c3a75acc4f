// Defines the resolved run configuration and the override layers it is built from.
// `Settings` is built once by `Settings::default().apply(..)` per layer and then
// only ever borrowed by the components.

use std::fmt::Write as _;
use std::path::PathBuf;

/// Package download URL template. `{package}` and `{version}` are substituted.
pub const DEFAULT_DOWNLOAD_URL: &str =
    "http://prdownloads.sourceforge.net/typo3/{package}-{version}.tar.gz?download";

/// The fully resolved configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory the package is installed into.
    pub base_path: PathBuf,
    /// Requested TYPO3 version, e.g. `6.2.4`.
    pub version: String,
    /// Package name, the archive is `{package}-{version}.tar.gz`.
    pub package: String,
    /// Local cache directory for downloaded archives.
    pub store: PathBuf,
    pub download_url: String,
    pub skip_config: bool,
    pub skip_rights: bool,
    pub skip_gm_detect: bool,
    pub skip_unzip_detect: bool,
    /// User that owns the whole installed tree.
    pub owner: String,
    /// Group the web server runs as.
    pub httpd_group: String,
    pub fix_index_file: bool,
    pub db_user: String,
    pub db_pass: String,
    pub db_host: String,
    /// Accepted so shared config files can carry it, never written out.
    pub db_name: String,
    pub force: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("typo3"),
            version: "6.2.4".to_string(),
            package: "typo3".to_string(),
            store: PathBuf::from("."),
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            skip_config: false,
            skip_rights: false,
            skip_gm_detect: false,
            skip_unzip_detect: false,
            owner: std::env::var("USER")
                .ok()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| "root".to_string()),
            httpd_group: "www-data".to_string(),
            fix_index_file: false,
            db_user: String::new(),
            db_pass: String::new(),
            db_host: "localhost".to_string(),
            db_name: String::new(),
            force: false,
            verbose: false,
            quiet: false,
        }
    }
}

/// One override layer: a config file or the command line.
/// `None` leaves the previous layer's value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverride {
    pub base_path: Option<PathBuf>,
    pub version: Option<String>,
    pub package: Option<String>,
    pub store: Option<PathBuf>,
    pub download_url: Option<String>,
    pub skip_config: Option<bool>,
    pub skip_rights: Option<bool>,
    pub skip_gm_detect: Option<bool>,
    pub skip_unzip_detect: Option<bool>,
    pub owner: Option<String>,
    pub httpd_group: Option<String>,
    pub fix_index_file: Option<bool>,
    pub db_user: Option<String>,
    pub db_pass: Option<String>,
    pub db_host: Option<String>,
    pub db_name: Option<String>,
    pub force: Option<bool>,
    pub verbose: Option<bool>,
    pub quiet: Option<bool>,
}

/// Escapes everything `sh` interprets inside double quotes.
fn shell_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

macro_rules! take_over {
    ($target:ident, $layer:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $layer.$field {
                $target.$field = value;
            }
        )+
    };
}

impl Settings {
    /// Applies one override layer on top of these settings.
    pub fn apply(mut self, layer: SettingsOverride) -> Self {
        take_over!(
            self,
            layer,
            base_path,
            version,
            package,
            store,
            download_url,
            skip_config,
            skip_rights,
            skip_gm_detect,
            skip_unzip_detect,
            owner,
            httpd_group,
            fix_index_file,
            db_user,
            db_pass,
            db_host,
            db_name,
            force,
            verbose,
            quiet,
        );
        self
    }

    /// Renders the settings in the shell-sourceable config file format,
    /// readable again by `config_loading::parse_config`.
    pub fn to_config_file(&self) -> String {
        let mut out = String::from("# typo3-bootstrap configuration\n");
        let mut line = |key: &str, value: &str| {
            let _ = writeln!(out, "{key}=\"{}\"", shell_escape(value));
        };
        let flag = |b: bool| if b { "1" } else { "0" };

        line("BASE_PATH", &self.base_path.to_string_lossy());
        line("VERSION", &self.version);
        line("PACKAGE", &self.package);
        line("STORE", &self.store.to_string_lossy());
        line("DOWNLOAD_URL", &self.download_url);
        line("SKIP_CONFIG", flag(self.skip_config));
        line("SKIP_RIGHTS", flag(self.skip_rights));
        line("SKIP_GM_DETECT", flag(self.skip_gm_detect));
        line("SKIP_UNZIP_DETECT", flag(self.skip_unzip_detect));
        line("OWNER", &self.owner);
        line("HTTPD_GROUP", &self.httpd_group);
        line("FIX_INDEX_FILE", flag(self.fix_index_file));
        line("DB_USER", &self.db_user);
        line("DB_PASS", &self.db_pass);
        line("DB_HOST", &self.db_host);
        line("DB_NAME", &self.db_name);
        out
    }
}
