//! Process configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_SEED_PATH: &str = "color_codes.txt";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraConfig {
    /// Postgres connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub seed_path: PathBuf,
    pub probe_timeout: Duration,
    /// Upper bound for any single live store call after connecting.
    pub operation_timeout: Duration,
    /// Fixed seed for demo quantities (reproducible demo data).
    pub demo_rng_seed: Option<u64>,
    pub max_connections: u32,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            seed_path: PathBuf::from(DEFAULT_SEED_PATH),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
            demo_rng_seed: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl InfraConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let probe_timeout = match var("STORE_PROBE_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse_number("STORE_PROBE_TIMEOUT_MS", &raw)?),
            None => defaults.probe_timeout,
        };
        let operation_timeout = match var("STORE_OPERATION_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse_number("STORE_OPERATION_TIMEOUT_MS", &raw)?),
            None => defaults.operation_timeout,
        };
        let demo_rng_seed = var("DEMO_RNG_SEED")
            .map(|raw| parse_number("DEMO_RNG_SEED", &raw))
            .transpose()?;
        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => parse_number("DATABASE_MAX_CONNECTIONS", &raw)?,
            None => defaults.max_connections,
        };

        Ok(Self {
            database_url: var("DATABASE_URL"),
            seed_path: var("SEED_PATH").map(PathBuf::from).unwrap_or(defaults.seed_path),
            probe_timeout,
            operation_timeout,
            demo_rng_seed,
            max_connections,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_string(),
    })
}
