//! Connection policy: where to connect and how often to retry a call that
//! never obtained a response.
//!
//! # Design
//! The policy is plain data. Resolution of a single call never looks at it;
//! only `ApiClient::with_policy` turns it into a retry loop. Values come
//! either from serde (e.g. a JSON config file) or from the environment.

use std::str::FromStr;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

pub const ADDRESS_ENV: &str = "JSONAPI_ADDRESS";
pub const RETRY_INTERVAL_ENV: &str = "JSONAPI_RETRY_INTERVAL_MS";
pub const MAX_RETRIES_ENV: &str = "JSONAPI_MAX_RETRIES";

const DEFAULT_ADDRESS: &str = "http://127.0.0.1:3000";
const DEFAULT_RETRY_INTERVAL_MS: u64 = 1000;
const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPolicy {
    pub address: String,
    #[serde(
        rename = "retry_interval_ms",
        with = "duration_ms",
        default = "default_retry_interval"
    )]
    pub retry_interval: Duration,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl ConnectionPolicy {
    pub fn new(address: impl Into<String>, retry_interval: Duration, max_retries: u32) -> Self {
        Self {
            address: address.into(),
            retry_interval,
            max_retries,
        }
    }

    /// Policy that performs exactly one attempt.
    pub fn no_retry(address: impl Into<String>) -> Self {
        Self::new(address, Duration::ZERO, 0)
    }

    /// Read the policy from `JSONAPI_*` environment variables, falling back
    /// to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let address = lookup(ADDRESS_ENV).unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let retry_interval = parse_var(&lookup, RETRY_INTERVAL_ENV)
            .map(Duration::from_millis)
            .unwrap_or_else(default_retry_interval);
        let max_retries = parse_var(&lookup, MAX_RETRIES_ENV).unwrap_or(DEFAULT_MAX_RETRIES);
        Self {
            address,
            retry_interval,
            max_retries,
        }
    }

    /// Total attempts a retrying client makes before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// `None` when `key` is unset or does not parse; the latter is logged.
fn parse_var<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {key}={raw:?}: not a non-negative integer, using the default");
            None
        }
    }
}

fn default_retry_interval() -> Duration {
    Duration::from_millis(DEFAULT_RETRY_INTERVAL_MS)
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
