// One-time install tool password: random plaintext shown once, MD5 hash persisted.

use crate::log_warn;
use colored::Colorize;
use md5::{Digest, Md5};
use rand::TryRngCore;
use rand::rngs::OsRng;

/// Number of random bytes; the plaintext is their hex encoding.
const PASSWORD_BYTES: usize = 8;

#[derive(Clone, PartialEq, Eq)]
pub struct InstallPassword {
    plaintext: String,
}

// Keeps the plaintext out of `{:?}` output.
impl std::fmt::Debug for InstallPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallPassword")
            .field("hash", &self.hash())
            .finish_non_exhaustive()
    }
}

impl InstallPassword {
    /// Draws a fresh password from the operating system's random source.
    /// Returns `None` (with a warning) when that source is unavailable.
    pub fn generate() -> Option<Self> {
        let mut bytes = [0u8; PASSWORD_BYTES];
        match OsRng.try_fill_bytes(&mut bytes) {
            Ok(()) => Some(Self::from_plaintext(hex::encode(bytes))),
            Err(e) => {
                log_warn!(
                    "[Password] No secure random source available ({}); the install tool password is left unset",
                    e
                );
                None
            }
        }
    }

    pub fn from_plaintext(plaintext: impl Into<String>) -> Self {
        Self {
            plaintext: plaintext.into(),
        }
    }

    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    /// Lowercase hex MD5 of the plaintext, the form TYPO3 stores in `installToolPassword`.
    pub fn hash(&self) -> String {
        hex::encode(Md5::digest(self.plaintext.as_bytes()))
    }
}
