// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Storage port for preference blobs.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Where preference blobs live, keyed by logical name.
pub trait ConfigStore {
    /// Bytes stored under `key`, or `None` when nothing is stored yet.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError>;

    /// Replace whatever is stored under `key`.
    fn write(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;

    /// Human-readable location of `key`, for diagnostics.
    fn location(&self, key: &str) -> String;
}

/// Failure reading or writing preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backing file could not be read or written.
    #[error("cannot access {}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Stored bytes are not valid preferences JSON.
    #[error("{location} does not hold valid preferences")]
    Parse {
        /// Where the bytes came from.
        location: String,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// Preferences could not be serialized.
    #[error("cannot encode preferences for {location}")]
    Encode {
        /// Where the bytes were headed.
        location: String,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// Neither an override nor a home directory names a config directory.
    #[error("no config directory: set {} or a home directory", crate::CONFIG_DIR_ENV)]
    NoConfigDir,
}
