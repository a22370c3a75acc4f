// This is the main module file for the `utilities` directory.
// It declares the low-level helpers the workflow steps are built on.

// HTTP downloads, fresh and resumed.
pub mod assets;
// `.tar.gz` extraction.
pub mod compression;
// Marker-based text patching and small file writes.
pub mod file_operations;
// `~`/`$VAR` expansion.
pub mod path_helpers;
// uid, user/group lookups and external command execution.
pub mod platform;
