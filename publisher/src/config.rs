//! Publisher configuration
//!
//! Every setting has a default matching the stock deployment (listen on
//! udpin://0.0.0.0:14571, 20 Hz). Environment variables override:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `VISION_ENDPOINT` | `udpin://0.0.0.0:14571` |
//! | `VISION_RATE_HZ` | `20` |
//! | `VISION_SYSTEM_ID` | `245` |
//! | `VISION_COMPONENT_ID` | `190` |
//! | `VISION_HEARTBEAT_TIMEOUT_MS` | `3000` |
//!
//! An invalid endpoint or rate is an error. The ids and the heartbeat timeout
//! fall back to their defaults with a warning.

use mocap_link::{
    Endpoint, LinkConfig, LinkError, DEFAULT_COMPONENT_ID, DEFAULT_HEARTBEAT_TIMEOUT,
    DEFAULT_SYSTEM_ID,
};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const ENV_ENDPOINT: &str = "VISION_ENDPOINT";
pub const ENV_RATE_HZ: &str = "VISION_RATE_HZ";
pub const ENV_SYSTEM_ID: &str = "VISION_SYSTEM_ID";
pub const ENV_COMPONENT_ID: &str = "VISION_COMPONENT_ID";
pub const ENV_HEARTBEAT_TIMEOUT_MS: &str = "VISION_HEARTBEAT_TIMEOUT_MS";

pub const DEFAULT_RATE_HZ: f64 = 20.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("VISION_ENDPOINT: {0}")]
    Endpoint(#[source] LinkError),
    #[error("VISION_RATE_HZ must give a positive, non-zero period, got {0}")]
    InvalidRate(f64),
    #[error("VISION_RATE_HZ is not a number: {0:?}")]
    MalformedRate(String),
}

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub link: LinkConfig,
    pub rate_hz: f64,
}

impl PublisherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, test map, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = match lookup(ENV_ENDPOINT) {
            Some(raw) => raw.parse::<Endpoint>().map_err(ConfigError::Endpoint)?,
            None => Endpoint::default(),
        };

        let rate_hz = match lookup(ENV_RATE_HZ) {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::MalformedRate(raw.clone()))?,
            None => DEFAULT_RATE_HZ,
        };
        let config = PublisherConfig {
            link: LinkConfig {
                endpoint,
                system_id: parse_or(&lookup, ENV_SYSTEM_ID, DEFAULT_SYSTEM_ID),
                component_id: parse_or(&lookup, ENV_COMPONENT_ID, DEFAULT_COMPONENT_ID),
                heartbeat_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    ENV_HEARTBEAT_TIMEOUT_MS,
                    DEFAULT_HEARTBEAT_TIMEOUT.as_millis() as u64,
                )),
            },
            rate_hz,
        };

        if !(rate_hz.is_finite() && rate_hz > 0.0) || config.period().is_zero() {
            return Err(ConfigError::InvalidRate(rate_hz));
        }
        Ok(config)
    }

    pub fn period(&self) -> Duration {
        if self.rate_hz.is_finite() && self.rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / self.rate_hz)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            rate_hz: DEFAULT_RATE_HZ,
        }
    }
}

/// Parse `key`, falling back to `default` (with a warning) when unset or malformed
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("{}={:?} is not valid, using {}", key, raw, default);
                default
            }
        },
        None => default,
    }
}
