// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed [`ConfigStore`].

use crate::store::{ConfigError, ConfigStore};
use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "BUILD_API_CONFIG_DIR";

/// Keeps each key as `<key>.json` under one directory.
///
/// Nothing touches disk until the first write, which also creates the
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Store rooted at `$BUILD_API_CONFIG_DIR`, or the user config directory
    /// (e.g. `~/.config/build_api`) when the variable is unset or empty.
    pub fn new() -> Result<Self, ConfigError> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::at(dir));
        }
        ProjectDirs::from("org", "chromium", "build_api")
            .map(|proj| Self::at(proj.config_dir()))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Store rooted at `base`.
    pub fn at(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The directory holding the files.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.base).map_err(|source| ConfigError::Io {
            path: self.base.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, data).map_err(|source| ConfigError::Io { path, source })
    }

    fn location(&self, key: &str) -> String {
        self.path_for(key).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::at(dir.path());
        assert_eq!(store.read("build_api").unwrap(), None);
        assert!(!dir.path().join("build_api.json").exists());
    }

    #[test]
    fn write_creates_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::at(dir.path().join("nested/config"));
        store.write("build_api", b"{}").unwrap();
        assert!(dir.path().join("nested/config/build_api.json").is_file());
        assert_eq!(store.read("build_api").unwrap().as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn io_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let store = FsConfigStore::at(&blocker);
        let err = store.write("build_api", b"{}").unwrap_err();
        assert!(matches!(err, ConfigError::Io { ref path, .. } if *path == blocker));
        assert!(err.to_string().contains(&blocker.display().to_string()));
    }
}
