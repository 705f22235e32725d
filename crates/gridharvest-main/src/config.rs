// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridHarvest.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Application configuration, loaded from `gridharvest.toml`.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working configuration as soon as the API token is supplied. The token is
//! taken from `ENTSOE_API_KEY` when set, which wins over the file; tokens in
//! files tend to end up in version control.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use gridharvest_core::FetcherConfig;

const DEFAULT_CONFIG_PATH: &str = "gridharvest.toml";
const TOKEN_ENV_VAR: &str = "ENTSOE_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Transparency API endpoint and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Rate limiting and retry policy
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL, only ever changed to point at a test double
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Security token; `ENTSOE_API_KEY` overrides this
    #[serde(default)]
    pub token: Option<String>,

    /// UTC boundary of the market day as HHMM ("2200" for CET winter)
    #[serde(default = "default_boundary")]
    pub period_boundary_hhmm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Hard API cap per sliding minute
    #[serde(default = "default_max_requests")]
    pub max_requests_per_minute: u32,

    /// Headroom kept below the hard cap
    #[serde(default = "default_buffer")]
    pub rate_limit_buffer: u32,

    /// Retry attempts for throttling and network errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Cooldown after HTTP 429 (seconds)
    #[serde(default = "default_cooldown_secs")]
    pub throttle_cooldown_secs: u64,

    /// First network-error backoff delay (seconds)
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,

    /// Network-error backoff ceiling (seconds)
    #[serde(default = "default_backoff_cap_secs")]
    pub backoff_cap_secs: u64,

    /// Fixed pause between consecutive requests (milliseconds)
    #[serde(default = "default_politeness_ms")]
    pub politeness_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for collected CSV arrays
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Audit log of skipped days
    #[serde(default = "default_skip_log")]
    pub skip_log: PathBuf,
}

fn default_base_url() -> String {
    "https://web-api.tp.entsoe.eu/api".to_owned()
}

fn default_boundary() -> String {
    "2200".to_owned()
}

fn default_max_requests() -> u32 {
    400
}

fn default_buffer() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    10
}

fn default_cooldown_secs() -> u64 {
    605
}

fn default_backoff_base_secs() -> u64 {
    2
}

fn default_backoff_cap_secs() -> u64 {
    60
}

fn default_politeness_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    305
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_skip_log() -> PathBuf {
    PathBuf::from("skipped_days.log")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            period_boundary_hhmm: default_boundary(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_requests_per_minute: default_max_requests(),
            rate_limit_buffer: default_buffer(),
            max_retries: default_max_retries(),
            throttle_cooldown_secs: default_cooldown_secs(),
            backoff_base_secs: default_backoff_base_secs(),
            backoff_cap_secs: default_backoff_cap_secs(),
            politeness_delay_ms: default_politeness_ms(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            skip_log: default_skip_log(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            limits: LimitsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or `gridharvest.toml` if present, or pure
    /// defaults. The `ENTSOE_API_KEY` environment variable overrides any
    /// token from the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    info!("📋 no {} found, using defaults", DEFAULT_CONFIG_PATH);
                    Self::default()
                }
            }
        };
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR)
            && !token.trim().is_empty()
        {
            config.api.token = Some(token);
        }
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        info!("📋 loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let token_ok = self
            .api
            .token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !token_ok {
            bail!(
                "no API token configured: set [api] token in {} or the {} environment variable",
                DEFAULT_CONFIG_PATH,
                TOKEN_ENV_VAR
            );
        }
        let boundary = &self.api.period_boundary_hhmm;
        if boundary.len() != 4 || !boundary.bytes().all(|b| b.is_ascii_digit()) {
            bail!("period_boundary_hhmm must be four digits, got '{boundary}'");
        }
        if self.limits.max_requests_per_minute == 0 {
            bail!("max_requests_per_minute must be positive");
        }
        if self.limits.rate_limit_buffer >= self.limits.max_requests_per_minute {
            bail!(
                "rate_limit_buffer ({}) must be below max_requests_per_minute ({})",
                self.limits.rate_limit_buffer,
                self.limits.max_requests_per_minute
            );
        }
        if self.limits.backoff_cap_secs < self.limits.backoff_base_secs {
            bail!("backoff_cap_secs must be at least backoff_base_secs");
        }
        Ok(())
    }

    /// Map onto the fetcher's tunables.
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            base_url: self.api.base_url.clone(),
            token: self.api.token.clone().unwrap_or_default(),
            max_requests_per_minute: self.limits.max_requests_per_minute,
            rate_limit_buffer: self.limits.rate_limit_buffer,
            max_retries: self.limits.max_retries,
            throttle_cooldown: Duration::from_secs(self.limits.throttle_cooldown_secs),
            backoff_base: Duration::from_secs(self.limits.backoff_base_secs),
            backoff_cap: Duration::from_secs(self.limits.backoff_cap_secs),
            politeness_delay: Duration::from_millis(self.limits.politeness_delay_ms),
            timeout: Duration::from_secs(self.limits.request_timeout_secs),
        }
    }
}
