use crate::errors::{BootstrapError, Result};
use crate::schemas::settings::SettingsOverride;
use clap::Parser;
use std::path::PathBuf;

/// Defines the command-line interface (CLI) for 'typo3-bootstrap'.
/// `#[derive(Parser)]` automatically generates argument parsing code via `clap`.
///
/// Boolean flags only ever switch a setting on; leaving one out keeps whatever
/// the config files chose.
#[derive(Parser, Debug, Default)]
#[command(name = "typo3-bootstrap")]
#[command(about = "Download, extract, configure and fix permissions of a TYPO3 installation")]
#[command(disable_version_flag = true)] // `--version` selects the TYPO3 version
pub struct Cli {
    /// Print diagnostic details.
    #[arg(short, long)]
    pub verbose: bool,
    /// Print errors only.
    #[arg(short, long)]
    pub quiet: bool,
    /// Replace an existing installation and re-download a cached package.
    #[arg(short, long)]
    pub force: bool,

    /// Check for a newer release of this tool and print upgrade instructions.
    #[arg(long)]
    pub self_update: bool,
    /// Check for a newer release of this tool (exit 0: current, 1: outdated, 2: unknown).
    #[arg(long)]
    pub update_check: bool,
    /// Print the resolved configuration in config file format and exit.
    #[arg(long)]
    pub export_config: bool,
    /// Write the resolved configuration to the tool config file and exit.
    #[arg(long)]
    pub extract_config: bool,

    /// Directory to install into.
    #[arg(long, value_name = "DIR")]
    pub base_path: Option<String>,
    /// TYPO3 version to install, e.g. 6.2.4.
    #[arg(long = "version", value_name = "VERSION")]
    pub version_flag: Option<String>,
    /// Package name; the archive is <PACKAGE>-<VERSION>.tar.gz.
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,
    /// Directory caching downloaded archives.
    #[arg(long, value_name = "DIR")]
    pub store: Option<String>,
    /// Download URL template with {package} and {version} placeholders.
    #[arg(long, value_name = "URL")]
    pub download_url: Option<String>,

    /// Do not write any configuration file.
    #[arg(long)]
    pub skip_config: bool,
    /// Do not change ownership or modes.
    #[arg(long)]
    pub skip_rights: bool,
    /// Do not look for GraphicsMagick.
    #[arg(long)]
    pub skip_gm_detect: bool,
    /// Do not look for unzip.
    #[arg(long)]
    pub skip_unzip_detect: bool,

    /// User owning the installed tree.
    #[arg(long, value_name = "USER")]
    pub owner: Option<String>,
    /// Group the web server runs as.
    #[arg(long, value_name = "GROUP")]
    pub httpd_group: Option<String>,
    /// Replace a symlinked index.php with a copy of its target.
    #[arg(long)]
    pub fix_index_file: bool,

    /// Database user.
    #[arg(long, value_name = "USER")]
    pub db_user: Option<String>,
    /// Database password.
    #[arg(long, value_name = "PASSWORD")]
    pub db_pass: Option<String>,
    /// Database host.
    #[arg(long, value_name = "HOST")]
    pub db_host: Option<String>,
    /// Database name (never written; the TYPO3 installer asks for it).
    #[arg(long, value_name = "NAME")]
    pub db_name: Option<String>,

    /// TYPO3 version; the last one given wins over --version.
    #[arg(value_name = "VERSION")]
    pub versions: Vec<String>,
}

/// Rejects values such as `--version=--force` that are really a mistyped flag.
fn checked(flag: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(v) if v.starts_with("--") => Err(BootstrapError::InvalidArgument {
            flag: flag.to_string(),
            value: v,
        }),
        other => Ok(other),
    }
}

fn switch(on: bool) -> Option<bool> {
    on.then_some(true)
}

impl Cli {
    /// The command line as the last settings layer.
    pub fn to_override(&self) -> Result<SettingsOverride> {
        let positional = self.versions.last().cloned();
        let version = checked("version", positional.or_else(|| self.version_flag.clone()))?;

        Ok(SettingsOverride {
            base_path: checked("base-path", self.base_path.clone())?.map(PathBuf::from),
            version,
            package: checked("package", self.package.clone())?,
            store: checked("store", self.store.clone())?.map(PathBuf::from),
            download_url: checked("download-url", self.download_url.clone())?,
            skip_config: switch(self.skip_config),
            skip_rights: switch(self.skip_rights),
            skip_gm_detect: switch(self.skip_gm_detect),
            skip_unzip_detect: switch(self.skip_unzip_detect),
            owner: checked("owner", self.owner.clone())?,
            httpd_group: checked("httpd-group", self.httpd_group.clone())?,
            fix_index_file: switch(self.fix_index_file),
            db_user: checked("db-user", self.db_user.clone())?,
            db_pass: checked("db-pass", self.db_pass.clone())?,
            db_host: checked("db-host", self.db_host.clone())?,
            db_name: checked("db-name", self.db_name.clone())?,
            force: switch(self.force),
            verbose: switch(self.verbose),
            quiet: switch(self.quiet),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("typo3-bootstrap").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_map_onto_the_override_layer() {
        let cli = parse(&["--version=6.2.4", "--skip-rights", "--skip-gm-detect", "--db-user", "t3"]);
        let layer = cli.to_override().unwrap();
        assert_eq!(layer.version.as_deref(), Some("6.2.4"));
        assert_eq!(layer.skip_rights, Some(true));
        assert_eq!(layer.skip_gm_detect, Some(true));
        assert_eq!(layer.skip_config, None);
        assert_eq!(layer.db_user.as_deref(), Some("t3"));
        assert_eq!(layer.force, None);
    }

    #[test]
    fn last_positional_wins() {
        let cli = parse(&["--version=4.5.40", "4.7.20", "6.2.4"]);
        assert_eq!(cli.to_override().unwrap().version.as_deref(), Some("6.2.4"));
    }

    #[test]
    fn flag_like_value_is_rejected() {
        let cli = parse(&["--version=--force"]);
        let err = cli.to_override().unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidArgument { ref flag, .. } if flag == "version"));

        let cli = parse(&["--owner=--quiet"]);
        assert!(cli.to_override().is_err());
    }

    #[test]
    fn short_toggles() {
        let cli = parse(&["-f", "-q"]);
        let layer = cli.to_override().unwrap();
        assert_eq!(layer.force, Some(true));
        assert_eq!(layer.quiet, Some(true));
    }
}
