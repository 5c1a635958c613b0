// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Preferences for the `build_api` command.

use crate::store::{ConfigError, ConfigStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Key the preferences are stored under.
pub const PREFS_KEY: &str = "build_api";

/// User preferences for `build_api`. Unknown or missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliPrefs {
    /// `tracing` filter directive used when neither `--log-filter` nor
    /// `RUST_LOG` is given.
    pub log_filter: String,
    /// Write output messages as indented JSON.
    pub pretty_output: bool,
}

impl Default for CliPrefs {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            pretty_output: true,
        }
    }
}

/// Reads and writes [`CliPrefs`] through a [`ConfigStore`].
///
/// Loading never writes: a missing or blank entry is `None` and stays that
/// way until [`PrefsService::save`] is called.
#[derive(Debug)]
pub struct PrefsService<S> {
    store: S,
}

impl<S: ConfigStore> PrefsService<S> {
    /// Service over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Where the preferences live.
    pub fn location(&self) -> String {
        self.store.location(PREFS_KEY)
    }

    /// Saved preferences, if any.
    pub fn load(&self) -> Result<Option<CliPrefs>, ConfigError> {
        let Some(bytes) = self.store.read(PREFS_KEY)? else {
            return Ok(None);
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                location: self.location(),
                source,
            })
    }

    /// Persist `prefs` as indented JSON.
    pub fn save(&self, prefs: &CliPrefs) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(prefs).map_err(|source| ConfigError::Encode {
            location: self.location(),
            source,
        })?;
        self.store.write(PREFS_KEY, &data)?;
        debug!(location = %self.location(), "saved preferences");
        Ok(())
    }
}
