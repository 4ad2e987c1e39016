//! Environment-driven settings.
//!
//! Resolution order: `FUBBER_*` environment variables over compiled
//! defaults. Invalid numeric values fall back to the default with a warning.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Seconds between auto-update checks.
pub const DEFAULT_UPDATE_THROTTLE_SECS: u64 = 60;
/// Wall-clock budget for the update detection phase, in milliseconds.
pub const DEFAULT_DETECT_TIMEOUT_MS: u64 = 250;
/// Files verified within this window are swept first by the updater.
pub const DEFAULT_RECENT_THRESHOLD_SECS: u64 = 86_400;

/// Runtime settings for the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Run the updater on command execution.
    pub auto_update: bool,
    /// Seconds between auto-update checks per project.
    pub update_throttle_secs: u64,
    /// Millisecond budget for the update detection phase.
    pub detect_timeout_ms: u64,
    /// Recency window for the updater's preferential sweep, in seconds.
    pub recent_threshold_secs: u64,
    /// Strict mode: tokenizer/extractor failures raise instead of degrading.
    pub dev_mode: bool,
    /// The user's home directory, from `HOME`.
    pub home: PathBuf,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or(ConfigError::HomeNotSet)?;

        Ok(Settings {
            auto_update: !env_is_false("FUBBER_AUTO_UPDATE"),
            update_throttle_secs: env_u64("FUBBER_UPDATE_THROTTLE", DEFAULT_UPDATE_THROTTLE_SECS),
            detect_timeout_ms: env_u64("FUBBER_DETECT_TIMEOUT", DEFAULT_DETECT_TIMEOUT_MS),
            recent_threshold_secs: env_u64(
                "FUBBER_RECENT_THRESHOLD",
                DEFAULT_RECENT_THRESHOLD_SECS,
            ),
            dev_mode: env_is_true("FUBBER_DEV"),
            home,
        })
    }

    /// Settings with compiled defaults and an explicit home (for testing).
    pub fn with_home(home: PathBuf) -> Self {
        Settings {
            auto_update: true,
            update_throttle_secs: DEFAULT_UPDATE_THROTTLE_SECS,
            detect_timeout_ms: DEFAULT_DETECT_TIMEOUT_MS,
            recent_threshold_secs: DEFAULT_RECENT_THRESHOLD_SECS,
            dev_mode: false,
            home,
        }
    }

    /// Path of the SQLite store: `$HOME/.local/fubber/index.db`.
    pub fn store_path(&self) -> PathBuf {
        self.home.join(".local").join("fubber").join("index.db")
    }
}

/// True iff the variable is set to `false` or `0`.
fn env_is_false(name: &str) -> bool {
    matches!(
        std::env::var(name).ok().as_deref(),
        Some("false") | Some("0")
    )
}

/// True iff the variable is set to a truthy value.
fn env_is_true(name: &str) -> bool {
    matches!(
        std::env::var(name).ok().as_deref(),
        Some("true") | Some("1")
    )
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, "invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
