use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::sheet::SchemaMode;

const ENV_PREFIX: &str = "SHEET_DASHBOARD_";

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub max_file_size: usize,
    pub preview_rows: usize,
    pub schema_mode: SchemaMode,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_file_size: default_max_file_size(),
            preview_rows: 100,
            schema_mode: SchemaMode::Permissive,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Builds a config from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let strict: bool = read_var(&lookup, "STRICT_SCHEMA")?.unwrap_or(false);

        Ok(Config {
            addr: read_var(&lookup, "ADDR")?.unwrap_or(defaults.addr),
            max_file_size: read_var(&lookup, "MAX_FILE_SIZE")?.unwrap_or(defaults.max_file_size),
            preview_rows: read_var(&lookup, "PREVIEW_ROWS")?.unwrap_or(defaults.preview_rows),
            schema_mode: if strict { SchemaMode::Strict } else { SchemaMode::Permissive },
            fetch_timeout: read_var(&lookup, "FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
        })
    }
}

fn read_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    let key = format!("{}{}", ENV_PREFIX, name);
    match lookup(&key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        _ => Ok(None),
    }
}

pub fn load_config() -> Result<Config> {
    // Load .env file first
    dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);
    Ok(config)
}
