// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted preferences for the `build_api` command-line entry point.
//!
//! [`PrefsService`] reads and writes [`CliPrefs`] as JSON through a
//! [`ConfigStore`]. [`FsConfigStore`] keeps one file per key under the platform
//! config directory. Nothing is written unless asked to.

pub mod fs;
pub mod prefs;
pub mod store;

pub use fs::{FsConfigStore, CONFIG_DIR_ENV};
pub use prefs::{CliPrefs, PrefsService, PREFS_KEY};
pub use store::{ConfigError, ConfigStore};
