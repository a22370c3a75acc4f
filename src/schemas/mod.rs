// Data structures shared between the CLI, the config loader and the workflow steps.

// Generated configuration lines and the two target file formats.
pub mod fragment;
// Package name/version and the derived archive name and URL.
pub mod package;
// Resolved settings and their override layers.
pub mod settings;
