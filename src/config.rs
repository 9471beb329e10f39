//! Enrichment configuration.
//!
//! Settings are resolved in priority order:
//! 1. CLI flags (`--endpoint`, `--timeout-ms`, `--key-column`)
//! 2. The config file (`--config`, else `<config_dir>/gridfill/config.json`)
//! 3. `GRIDFILL_API_URL` / `GRIDFILL_TIMEOUT_MS` environment variables
//! 4. Built-in defaults
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Current schema version for `config.json`.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_KEY_COLUMN: usize = 0;
pub const ENDPOINT_ENV: &str = "GRIDFILL_API_URL";
pub const TIMEOUT_ENV: &str = "GRIDFILL_TIMEOUT_MS";

/// Resolved settings for talking to the enrichment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichConfig {
    pub schema_version: u32,
    /// Base URL of the enrichment service, without a trailing path.
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Column whose values name the subject of every enrichment.
    pub key_column: usize,
}

impl EnrichConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// On-disk form; every setting is optional so a file can override just one.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    schema_version: u32,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    key_column: Option<usize>,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
    pub key_column: Option<usize>,
}

pub fn default_config() -> EnrichConfig {
    EnrichConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        endpoint: DEFAULT_ENDPOINT.to_string(),
        timeout_ms: DEFAULT_TIMEOUT_MS,
        key_column: DEFAULT_KEY_COLUMN,
    }
}

/// Per-user config location, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gridfill").join("config.json"))
}

pub fn write_config(path: &Path, config: &EnrichConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(config).context("serialize config")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Resolve settings from flags, file, and the process environment.
pub fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<EnrichConfig> {
    resolve_config_with_env(path, overrides, |key| std::env::var(key).ok())
}

/// Resolve settings with an injectable environment lookup.
///
/// An explicit `path` must exist; the default per-user path is optional.
pub fn resolve_config_with_env<E>(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
    env: E,
) -> Result<EnrichConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let mut config = default_config();

    if let Some(endpoint) = env(ENDPOINT_ENV).filter(|value| !value.trim().is_empty()) {
        config.endpoint = endpoint;
    }
    if let Some(raw) = env(TIMEOUT_ENV) {
        config.timeout_ms = raw
            .trim()
            .parse()
            .with_context(|| format!("parse {TIMEOUT_ENV}={raw}"))?;
    }

    let file = match path {
        Some(path) => Some(load_config_file(path)?),
        None => match default_config_path() {
            Some(path) if path.is_file() => Some(load_config_file(&path)?),
            _ => None,
        },
    };
    if let Some(file) = file {
        if file.schema_version != CONFIG_SCHEMA_VERSION {
            return Err(anyhow!(
                "unsupported config schema_version {} (expected {})",
                file.schema_version,
                CONFIG_SCHEMA_VERSION
            ));
        }
        if let Some(endpoint) = file.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(timeout_ms) = file.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(key_column) = file.key_column {
            config.key_column = key_column;
        }
    }

    if let Some(endpoint) = &overrides.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(key_column) = overrides.key_column {
        config.key_column = key_column;
    }

    config.endpoint = config.endpoint.trim().trim_end_matches('/').to_string();
    validate_config(&config)?;
    Ok(config)
}

/// Load a complete config file, filling unspecified settings with defaults.
pub fn load_config(path: &Path) -> Result<EnrichConfig> {
    let overrides = ConfigOverrides::default();
    resolve_config_with_env(Some(path), &overrides, |_| None)
}

pub fn validate_config(config: &EnrichConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if !(config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://")) {
        return Err(anyhow!(
            "endpoint must be an http(s) URL, got {:?}",
            config.endpoint
        ));
    }
    if config.timeout_ms == 0 {
        return Err(anyhow!("timeout_ms must be greater than zero"));
    }
    Ok(())
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse config {}", path.display()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
