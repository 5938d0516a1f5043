use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const CATALOG_VAR: &str = "SYLLOGISM_CATALOG";
pub const CLOCK_TICK_VAR: &str = "SYLLOGISM_CLOCK_TICK_MS";
pub const SEED_VAR: &str = "SYLLOGISM_SEED";

const DEFAULT_CLOCK_TICK: Duration = Duration::from_millis(1000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Runtime settings, read from the environment (and `.env`, if present).
///
/// The bot token itself is read by teloxide from `TELOXIDE_TOKEN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Catalog file to use instead of the bundled one.
    pub catalog_path: Option<PathBuf>,
    /// How often the on-screen question timer is refreshed.
    pub clock_tick: Duration,
    /// Fixed seed for reproducible quiz sequences.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            clock_tick: DEFAULT_CLOCK_TICK,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let catalog_path = value(CATALOG_VAR).map(PathBuf::from);

        let clock_tick = match value(CLOCK_TICK_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: CLOCK_TICK_VAR,
                        value: raw,
                        expected: "a positive number of milliseconds",
                    })
                }
            },
            None => DEFAULT_CLOCK_TICK,
        };

        let seed = match value(SEED_VAR) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: SEED_VAR,
                value: raw.clone(),
                expected: "an unsigned 64-bit integer",
            })?),
            None => None,
        };

        Ok(Self {
            catalog_path,
            clock_tick,
            seed,
        })
    }
}
