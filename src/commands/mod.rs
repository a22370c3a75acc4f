// Register the application's top-level actions.
// Each module corresponds to one thing `typo3-bootstrap` can be asked to do.

// `--export-config` and `--extract-config`.
pub mod export_config;
// Orchestrates the whole installation.
pub mod install;
// `--update-check` and `--self-update`.
pub mod version;
