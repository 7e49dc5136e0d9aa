//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::service::TtlPolicy;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep task interval in seconds
    pub sweep_interval: u64,
    /// TTL for id and email lookups, in seconds
    pub detail_ttl: u64,
    /// TTL for list pages, in seconds
    pub list_ttl: u64,
    /// TTL for the user count, in seconds
    pub count_ttl: u64,
    /// TTL for email uniqueness checks, in seconds
    pub uniqueness_ttl: u64,
    /// Whether to create the admin account at startup
    pub seed_admin: bool,
}

/// Reads `name` from the environment, falling back to `default` when unset
/// or unparsable.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 30)
    /// - `DETAIL_TTL` - Id/email lookup TTL in seconds (default: 300)
    /// - `LIST_TTL` - List page TTL in seconds (default: 300)
    /// - `COUNT_TTL` - Count TTL in seconds (default: 300)
    /// - `UNIQUENESS_TTL` - Email uniqueness TTL in seconds (default: 120)
    /// - `SEED_ADMIN` - Seed admin@example.com on startup (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            detail_ttl: env_or("DETAIL_TTL", defaults.detail_ttl),
            list_ttl: env_or("LIST_TTL", defaults.list_ttl),
            count_ttl: env_or("COUNT_TTL", defaults.count_ttl),
            uniqueness_ttl: env_or("UNIQUENESS_TTL", defaults.uniqueness_ttl),
            seed_admin: env_or("SEED_ADMIN", defaults.seed_admin),
        }
    }

    /// Per-query TTLs for the user service.
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy {
            detail: Duration::from_secs(self.detail_ttl),
            list: Duration::from_secs(self.list_ttl),
            count: Duration::from_secs(self.count_ttl),
            uniqueness: Duration::from_secs(self.uniqueness_ttl),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            sweep_interval: 30,
            detail_ttl: 300,
            list_ttl: 300,
            count_ttl: 300,
            uniqueness_ttl: 120,
            seed_admin: true,
        }
    }
}
