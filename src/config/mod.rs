//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;

use crate::game::r#match::{DEFAULT_ROUND_SECONDS, DEFAULT_TOTAL_ROUNDS};
use crate::util::time::SIMULATION_TPS;

/// Upper bounds for match tunables
const MAX_TOTAL_ROUNDS: u32 = 99;
const MAX_ROUND_SECONDS: u32 = 3600;

/// Host configuration loaded from environment variables
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Frames per second the runner paces itself at
    pub sim_tps: u32,
    pub total_rounds: u32,
    pub round_seconds: u32,
    /// Seed for the demo bots
    pub bot_seed: u64,
    /// Pace at `sim_tps` instead of stepping back to back
    pub realtime: bool,
    /// Publish every n-th frame (frames with events are always published)
    pub snapshot_interval: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let config = Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: match lookup("LOG_FORMAT").as_deref().map(str::trim) {
                None | Some("") | Some("text") => false,
                Some("json") => true,
                Some(other) => {
                    return Err(ConfigError::Invalid {
                        key: "LOG_FORMAT",
                        value: other.to_string(),
                    })
                }
            },
            sim_tps: parse_or(&lookup, "SIM_TPS", SIMULATION_TPS)?,
            total_rounds: parse_or(&lookup, "TOTAL_ROUNDS", DEFAULT_TOTAL_ROUNDS)?,
            round_seconds: parse_or(&lookup, "ROUND_SECONDS", DEFAULT_ROUND_SECONDS)?,
            bot_seed: parse_or(&lookup, "BOT_SEED", 42)?,
            realtime: parse_or(&lookup, "REALTIME", false)?,
            snapshot_interval: parse_or(&lookup, "SNAPSHOT_INTERVAL", SIMULATION_TPS)?,
        };

        if config.sim_tps == 0 {
            return Err(ConfigError::Zero("SIM_TPS"));
        }
        if config.total_rounds == 0 {
            return Err(ConfigError::Zero("TOTAL_ROUNDS"));
        }
        if config.round_seconds == 0 {
            return Err(ConfigError::Zero("ROUND_SECONDS"));
        }
        if config.total_rounds > MAX_TOTAL_ROUNDS {
            return Err(ConfigError::TooLarge {
                key: "TOTAL_ROUNDS",
                max: MAX_TOTAL_ROUNDS,
            });
        }
        if config.round_seconds > MAX_ROUND_SECONDS {
            return Err(ConfigError::TooLarge {
                key: "ROUND_SECONDS",
                max: MAX_ROUND_SECONDS,
            });
        }
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Environment variable {0} must be greater than zero")]
    Zero(&'static str),

    #[error("Environment variable {key} must be at most {max}")]
    TooLarge { key: &'static str, max: u32 },
}
