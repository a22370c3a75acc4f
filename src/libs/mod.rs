// This is the main module file for the `libs` directory.
// Each module implements one step of a bootstrap run, in the order they run.

// Reading `~/.typo3.conf` and `~/.typo3-bootstrap.conf` into settings layers.
pub mod config_loading;
// Verifying required host executables.
pub mod dependency_check;
// Downloading and resuming the package archive.
pub mod package_fetcher;
// Extracting the archive and moving it into the base path.
pub mod archive_installer;
// Random install tool password and its stored hash.
pub mod install_password;
// Building and writing the TYPO3 configuration.
pub mod config_generator;
// Replacing a symlinked `index.php`.
pub mod index_fixer;
// Ownership, group and modes of the runtime directories.
pub mod permission_fixer;
// Low-level helpers.
pub mod utilities;
