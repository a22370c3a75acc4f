// Package descriptor: name and version, with the derived archive name and URL.

use std::path::{Path, PathBuf};

/// Identifies one downloadable package release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
}

impl PackageDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// `{name}-{version}.tar.gz`
    pub fn file_name(&self) -> String {
        format!("{}-{}.tar.gz", self.name, self.version)
    }

    /// Where the archive is cached inside `store`.
    pub fn artifact_path(&self, store: &Path) -> PathBuf {
        store.join(self.file_name())
    }

    /// Fills the `{package}` and `{version}` placeholders of a URL template.
    pub fn download_url(&self, template: &str) -> String {
        template
            .replace("{package}", &self.name)
            .replace("{version}", &self.version)
    }
}
