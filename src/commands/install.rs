// This file contains the primary logic of a `typo3-bootstrap` run.
// It walks the provisioning steps in order and stops at the first failure;
// re-running the tool is the recovery path.

use crate::errors::Result;
use crate::libs::{
    archive_installer,
    config_generator::{self, ToolLookup},
    dependency_check::{self, REQUIRED_TOOLS},
    index_fixer,
    install_password::InstallPassword,
    package_fetcher,
    permission_fixer::{self, Accounts, DisabledPrivilegedFs, PrivilegedFs},
};
use crate::libs::utilities::path_helpers::absolutize;
use crate::schemas::fragment::ConfigFormat;
use crate::schemas::settings::Settings;
use crate::{log_debug, log_info};
use colored::Colorize;
use prettytable::{Table, row};
use std::ffi::OsString;
use std::path::PathBuf;

/// What a successful run produced.
#[derive(Debug)]
pub struct InstallReport {
    pub base_path: PathBuf,
    pub version: String,
    /// `None` when configuration writing was skipped.
    pub config_file: Option<PathBuf>,
    /// Only set when its hash actually went into `config_file`.
    pub install_password: Option<InstallPassword>,
}

/// Everything the run needs from the host, so tests can substitute it.
pub struct Host<'a> {
    /// Where the archive is unpacked before being moved to the base path.
    pub staging_parent: PathBuf,
    /// Search path for the dependency check, `None` for the process `PATH`.
    pub search_path: Option<OsString>,
    /// GraphicsMagick and unzip lookup.
    pub lookup: ToolLookup<'a>,
    pub privileged: Box<dyn PrivilegedFs>,
    pub accounts: Accounts,
}

impl Host<'static> {
    /// The real host: current directory, process `PATH`, privileges as detected.
    pub fn detect(settings: &Settings) -> Result<Self> {
        let privileged: Box<dyn PrivilegedFs> = if settings.skip_rights {
            log_info!("[Rights] --skip-rights given, ownership and modes stay as extracted");
            Box::new(DisabledPrivilegedFs)
        } else {
            permission_fixer::select_privileged_fs()
        };
        Ok(Self {
            staging_parent: std::env::current_dir()?,
            search_path: None,
            lookup: &config_generator::which_lookup,
            privileged,
            accounts: Accounts::default(),
        })
    }
}

/// Main entry point of an installation run on the real host.
pub fn run(settings: &Settings) -> Result<InstallReport> {
    let host = Host::detect(settings)?;
    run_on(settings, &host)
}

/// Runs every step against `host`.
pub fn run_on(settings: &Settings, host: &Host<'_>) -> Result<InstallReport> {
    log_debug!("Entered install::run_on() function.");
    let password = InstallPassword::generate();

    match &host.search_path {
        Some(path) => dependency_check::check_dependencies_in(REQUIRED_TOOLS, Some(path))?,
        None => dependency_check::check_dependencies(REQUIRED_TOOLS)?,
    }

    // Refuse a re-run over an existing installation before any network traffic.
    archive_installer::ensure_target_free(&settings.base_path, settings.force)?;
    let archive = package_fetcher::fetch(settings)?;
    archive_installer::install_staged_in(
        &archive,
        &settings.base_path,
        settings.force,
        &host.staging_parent,
    )?;

    let config_file = if settings.skip_config {
        log_info!("[Config] --skip-config given, no configuration file written");
        None
    } else {
        let format = ConfigFormat::for_version(&settings.version);
        log_debug!("[Config] Version {} uses {:?} format", settings.version, format);
        let fragment = config_generator::build_fragment(settings, password.as_ref(), host.lookup);
        Some(config_generator::write_config(&settings.base_path, format, &fragment)?)
    };
    config_generator::enable_install_tool(&settings.base_path)?;

    if settings.fix_index_file {
        index_fixer::fix_index_file(&settings.base_path)?;
    }

    permission_fixer::fix_permissions(settings, host.privileged.as_ref(), &host.accounts)?;

    log_info!("'typo3-bootstrap' completed!!");
    Ok(InstallReport {
        base_path: settings.base_path.clone(),
        version: settings.version.clone(),
        install_password: config_file.as_ref().and(password),
        config_file,
    })
}

/// Prints the final summary. In quiet mode only the install tool password is
/// printed, because nothing else records it.
pub fn print_summary(report: &InstallReport, quiet: bool) {
    if quiet {
        if let Some(pw) = &report.install_password {
            println!("{}", pw.plaintext());
        }
        return;
    }

    let mut table = Table::new();
    table.add_row(row!["Installed version", report.version]);
    table.add_row(row!["Base path", absolutize(&report.base_path).display()]);
    match &report.config_file {
        Some(path) => table.add_row(row!["Configuration", path.display()]),
        None => table.add_row(row!["Configuration", "skipped"]),
    };
    match &report.install_password {
        Some(pw) => table.add_row(row!["Install tool password", pw.plaintext()]),
        None => table.add_row(row!["Install tool password", "not set"]),
    };
    table.printstd();

    if report.install_password.is_some() {
        println!(
            "{}",
            "Write the install tool password down now, it is not stored anywhere in plain text.".yellow()
        );
    }
}
