// This file implements the application's logging system.
// It provides macros for different log levels (INFO, WARN, ERROR, DEBUG)
// and handles conditional output for quiet and verbose runs, with colored terminal output.

use colored::*; // Used for adding color to log messages.
use std::sync::OnceLock; // Ensures the level is initialized exactly once.
use std::sync::atomic::{AtomicU8, Ordering}; // For thread-safe, atomic control of the level.

/// Provides convenient logging macros.
/// `#[macro_export]` makes these macros globally available within the crate.

// `log_info!` for general application progress and informational messages.
// Suppressed in quiet mode.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if $crate::logger::is_info_enabled() {
            eprintln!("{} {}", "[INFO]".bright_green(), format!($($arg)*));
        }
    };
}

// `log_warn!` for non-critical issues or noteworthy conditions.
// Suppressed in quiet mode.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if $crate::logger::is_info_enabled() {
            eprintln!("{} {}", "[WARN]".bright_yellow(), format!($($arg)*));
        }
    };
}

// `log_error!` for critical errors. Always printed.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => (eprintln!("{} {}", "[ERROR]".bright_red(), format!($($arg)*)));
}

// `log_debug!` for detailed internal diagnostics.
// Messages are only printed if verbose mode is enabled via `is_debug_enabled()`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
           eprintln!("{} {}", "[DEBUG]".dimmed(), format!($($arg)*));
        }
    };
}

/// Output levels, ordered from the quietest to the chattiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Errors only.
    Quiet = 0,
    /// Errors, warnings and progress.
    Normal = 1,
    /// Everything, including debug diagnostics.
    Verbose = 2,
}

impl Level {
    /// Picks the level from the two command-line toggles. Quiet wins when both are set.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Level::Quiet
        } else if verbose {
            Level::Verbose
        } else {
            Level::Normal
        }
    }
}

// Global level, ensured to be initialized once.
static LEVEL: OnceLock<AtomicU8> = OnceLock::new();

/// Initializes the logger, setting the global output level.
/// Called once at startup and again after the configuration files are
/// resolved, since they may change the `VERBOSE`/`QUIET` toggles.
pub fn init(level: Level) {
    LEVEL
        .get_or_init(|| AtomicU8::new(level as u8))
        .store(level as u8, Ordering::Relaxed);

    log_debug!("Logger initialized in VERBOSE mode");
}

fn current() -> u8 {
    LEVEL
        .get()
        .map(|l| l.load(Ordering::Relaxed))
        .unwrap_or(Level::Normal as u8) // Default to normal if `init` was never called.
}

/// Checks if informational and warning output is enabled.
pub fn is_info_enabled() -> bool {
    current() >= Level::Normal as u8
}

/// Checks if debug logging is currently enabled.
/// Used primarily by the `log_debug!` macro.
pub fn is_debug_enabled() -> bool {
    current() >= Level::Verbose as u8
}
