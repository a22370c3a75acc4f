// Host queries: effective uid, user and group lookups, and running external commands.

use std::ffi::CString;
use std::io;
use std::process::{Command, Output};

/// Abstraction for running external commands, so the privileged steps can be
/// exercised in tests without touching the host.
pub trait CommandExecutor {
    /// Runs `cmd` with `args` and returns the captured output.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        Command::new(cmd).args(args).output()
    }
}

/// `true` when the process runs with an effective uid of 0.
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Looks up a group by name in the host's group database.
pub fn group_exists(name: &str) -> bool {
    let Ok(c_name) = CString::new(name) else {
        return false;
    };
    // SAFETY: `c_name` is a valid NUL-terminated string for the duration of the
    // call; the returned pointer is only compared against null.
    unsafe { !libc::getgrnam(c_name.as_ptr()).is_null() }
}

/// Looks up a user by name in the host's password database.
pub fn user_exists(name: &str) -> bool {
    let Ok(c_name) = CString::new(name) else {
        return false;
    };
    // SAFETY: as in `group_exists`.
    unsafe { !libc::getpwnam(c_name.as_ptr()).is_null() }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_group_and_user_exist() {
        assert!(group_exists("root") || group_exists("wheel"));
        assert!(user_exists("root"));
    }

    #[test]
    fn bogus_names_do_not_resolve() {
        assert!(!group_exists("typo3-bootstrap-no-such-group"));
        assert!(!user_exists("typo3-bootstrap-no-such-user"));
        assert!(!group_exists("nul\0byte"));
    }
}
