//! Delivery limits. Loaded from env: TELEGRAM_LENGTH_LIMIT, TELEGRAM_MIN_INTERVAL_SECS,
//! TELEGRAM_MAX_RETRY, TELEGRAM_RETRY_INTERVAL_SECS.

use crate::retry::RetryPolicy;
use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Message length limit, per-chat dispatch interval, and flood retry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryConfig {
    /// Max characters per delivered message, prefix included.
    pub length_limit: usize,
    /// Min gap between two calls to the same chat.
    pub min_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            length_limit: 4096,
            min_interval: Duration::from_secs(3),
            retry: RetryPolicy::default(),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not valid: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

fn secs_env_or(key: &str, default: Duration) -> Result<Duration> {
    let secs: f64 = env_or(key, default.as_secs_f64())?;
    if !secs.is_finite() || secs < 0.0 {
        bail!("{} must be a non-negative number of seconds, got {}", key, secs);
    }
    Ok(Duration::from_secs_f64(secs))
}

impl DeliveryConfig {
    /// Loads from environment variables; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let length_limit = env_or("TELEGRAM_LENGTH_LIMIT", defaults.length_limit)?;
        let min_interval = secs_env_or("TELEGRAM_MIN_INTERVAL_SECS", defaults.min_interval)?;
        let max_attempts = env_or("TELEGRAM_MAX_RETRY", defaults.retry.max_attempts)?;
        let interval = secs_env_or("TELEGRAM_RETRY_INTERVAL_SECS", defaults.retry.interval)?;
        Ok(Self {
            length_limit,
            min_interval,
            retry: RetryPolicy::new(max_attempts, interval),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.length_limit == 0 {
            bail!("TELEGRAM_LENGTH_LIMIT must be positive");
        }
        if self.retry.max_attempts == 0 {
            bail!("TELEGRAM_MAX_RETRY must be at least 1");
        }
        Ok(())
    }
}
