// Command-line definition.
mod cli;
// Actions selected by the command line.
mod commands;
// Error type shared by every step.
mod errors;
// Workflow steps and low-level helpers.
mod libs;
// Leveled, colored terminal output.
mod logger;
// Settings, package and configuration fragment types.
mod schemas;

use clap::Parser;
use clap::error::ErrorKind;
use cli::cmd_enums::Cli;
use colored::Colorize;
use commands::{export_config, install, version};
use libs::config_loading::{self, ConfigFiles};
use logger::Level;
use std::path::PathBuf;
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            if let Err(io_err) = e.print() {
                log_error!("{} (could not print usage: {})", e, io_err);
            }
            process::exit(code);
        }
    };

    logger::init(Level::from_flags(cli.verbose, cli.quiet));

    if cli.update_check || cli.self_update {
        process::exit(version::run(cli.self_update));
    }

    if let Err(e) = run(&cli) {
        log_error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> errors::Result<()> {
    let overrides = cli.to_override()?;
    let files = ConfigFiles::discover();
    let settings = config_loading::resolve_settings(&files, overrides)?;
    // The config files may have switched VERBOSE or QUIET.
    logger::init(Level::from_flags(settings.verbose, settings.quiet));

    if cli.export_config {
        export_config::print(&settings);
        return Ok(());
    }
    if cli.extract_config {
        let target = files.tool.clone().unwrap_or_else(|| {
            log_warn!("No home directory found, writing .typo3-bootstrap.conf to the current directory");
            PathBuf::from(".typo3-bootstrap.conf")
        });
        return export_config::write(&settings, &target);
    }

    let report = install::run(&settings)?;
    install::print_summary(&report, settings.quiet);
    Ok(())
}
