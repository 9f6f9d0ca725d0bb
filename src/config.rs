//! Config module.
//!
//! This module contains the representation of the cache
//! configuration shared by every account.

use chrono::Duration;
use serde::Deserialize;
use std::{env, path::PathBuf};

/// Fallback refresh interval in minutes (one day).
pub const DEFAULT_REFRESH_INTERVAL: i64 = 24 * 60;
/// Lifetime of an update lease in minutes.
pub const DEFAULT_LEASE_TTL: i64 = 10;
pub const DEFAULT_CALENDAR_NAME: &str = "Calendar";

/// Represents the configuration of the calendar cache.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Represents the refresh interval in minutes used when the
    /// provider does not give a usable one.
    pub default_refresh_interval: Option<i64>,
    /// Represents the update lease lifetime in minutes.
    pub lease_ttl: Option<i64>,
    /// Represents the path of the local event database.
    pub database_path: Option<PathBuf>,
    /// Represents the display name used when the account has none.
    pub default_name: Option<String>,
}

impl CacheConfig {
    pub fn default_refresh_interval(&self) -> i64 {
        self.default_refresh_interval
            .filter(|interval| *interval > 0)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL)
    }

    pub fn lease_ttl(&self) -> Duration {
        Duration::minutes(
            self.lease_ttl
                .filter(|ttl| *ttl > 0)
                .unwrap_or(DEFAULT_LEASE_TTL),
        )
    }

    /// Gets the database path, falling back to the user data
    /// directory, then to the temporary directory.
    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(env::temp_dir)
                .join("extcal")
                .join("cache.sqlite")
        })
    }

    pub fn default_name(&self) -> &str {
        self.default_name
            .as_deref()
            .unwrap_or(DEFAULT_CALENDAR_NAME)
    }
}
