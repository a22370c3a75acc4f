// `--export-config` and `--extract-config`: the resolved settings in config file form.

use crate::errors::{BootstrapError, Result};
use crate::log_info;
use crate::schemas::settings::Settings;
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Prints the settings to stdout, ready to be redirected into a config file.
pub fn print(settings: &Settings) {
    print!("{}", settings.to_config_file());
}

/// Writes the settings to `path`. An existing file is only replaced with `--force`.
pub fn write(settings: &Settings, path: &Path) -> Result<()> {
    if path.exists() && !settings.force {
        return Err(BootstrapError::TargetAlreadyExists(path.to_path_buf()));
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, settings.to_config_file())?;
    log_info!(
        "[Config] Configuration written to {}",
        path.display().to_string().green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::config_loading::load_config_file;

    #[test]
    fn written_file_loads_back_and_is_not_overwritten_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf/typo3-bootstrap.conf");
        let settings = Settings {
            version: "4.7.20".into(),
            ..Settings::default()
        };

        write(&settings, &path).unwrap();
        let layer = load_config_file(&path).unwrap().unwrap();
        assert_eq!(layer.version.as_deref(), Some("4.7.20"));

        let err = write(&settings, &path).unwrap_err();
        assert!(matches!(err, BootstrapError::TargetAlreadyExists(_)));

        let forced = Settings {
            force: true,
            ..settings
        };
        write(&forced, &path).unwrap();
    }
}
