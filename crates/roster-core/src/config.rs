use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{ClientSettings, TransportConfig};
use crate::retry::RetryPolicy;

/// Environment variable overriding `upstream.base_url`.
pub const ENV_SERVICE_URL: &str = "ROSTER_SERVICE_URL";
/// Environment variable overriding `upstream.request_timeout_ms`.
pub const ENV_CLIENT_TIMEOUT_MS: &str = "ROSTER_CLIENT_TIMEOUT_MS";
/// Environment variable overriding `retry.max_attempts`.
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "ROSTER_RETRY_MAX_ATTEMPTS";

/// Where the upstream lives and how long we wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Budget for one logical call, retries and delays included.
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout_ms: 10_000,
            connect_timeout_ms: 500,
            read_timeout_ms: 500,
            write_timeout_ms: 500,
        }
    }
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per call (including the first).
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 100,
        }
    }
}

/// Bind address of the fault-injection provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub bind: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/roster/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl RosterConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (environment variable name to value).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVICE_URL) {
            self.upstream.base_url = url;
        }
        if let Some(raw) = lookup(ENV_CLIENT_TIMEOUT_MS) {
            self.upstream.request_timeout_ms = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{ENV_CLIENT_TIMEOUT_MS}={raw:?} is not a number"))?;
        }
        if let Some(raw) = lookup(ENV_RETRY_MAX_ATTEMPTS) {
            let max_attempts = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("{ENV_RETRY_MAX_ATTEMPTS}={raw:?} is not a number"))?;
            self.retry.get_or_insert_with(RetryConfig::default).max_attempts = max_attempts;
        }
        Ok(())
    }

    /// Settings for [`crate::client::UpstreamClient::new`].
    pub fn client_settings(&self) -> ClientSettings {
        let retry = self.retry.clone().unwrap_or_default();
        ClientSettings {
            base_url: self.upstream.base_url.clone(),
            request_timeout: Duration::from_millis(self.upstream.request_timeout_ms),
            transport: TransportConfig {
                connect_timeout: Duration::from_millis(self.upstream.connect_timeout_ms),
                write_timeout: Duration::from_millis(self.upstream.write_timeout_ms),
                read_timeout: Duration::from_millis(self.upstream.read_timeout_ms),
            },
            retry: RetryPolicy::new(retry.max_attempts, Duration::from_millis(retry.delay_ms)),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("roster")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path`, creating a default file if none exists.
pub fn load_from(path: &Path) -> Result<RosterConfig> {
    if !path.exists() {
        let default_cfg = RosterConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: RosterConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Load the XDG config file, then apply environment overrides.
pub fn load_or_init() -> Result<RosterConfig> {
    let mut cfg = load_from(&config_path()?)?;
    cfg.apply_env_overrides()?;
    Ok(cfg)
}
