use std::env;

use thiserror::Error;
use tracing::info;

const DEFAULT_STORE_BUFFER: usize = 32;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the hosted record platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub project_id: Option<String>,
    /// Mailbox size of the record store.
    pub store_buffer: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let project_id = optional(&lookup, "MATCHMAKING_PROJECT_ID");
        let store_buffer = match lookup("MATCHMAKING_STORE_BUFFER") {
            Some(raw) => parse_buffer(&raw)?,
            None => {
                info!("MATCHMAKING_STORE_BUFFER not set, using default: {DEFAULT_STORE_BUFFER}");
                DEFAULT_STORE_BUFFER
            }
        };

        Ok(Self {
            project_id,
            store_buffer,
        })
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    let value = lookup(key).filter(|v| !v.trim().is_empty());
    if value.is_none() {
        info!("{key} not set");
    }
    value
}

fn parse_buffer(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "MATCHMAKING_STORE_BUFFER",
        value: raw.to_string(),
        reason,
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(invalid("must be at least 1".to_string())),
        Ok(size) => Ok(size),
        Err(e) => Err(invalid(e.to_string())),
    }
}
