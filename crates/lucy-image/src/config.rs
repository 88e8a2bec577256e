//! Runtime configuration with precedence
//!
//! Loads configuration from the following sources (low to high):
//! 1. Built-in defaults
//! 2. YAML config file (`--config`, else `lucy.yaml` in the working directory)
//! 3. Environment variables (LUCY_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::Platform;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use tracing::debug;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "lucy.yaml";

/// Settings passed explicitly to the resolver and evaluator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LucyConfig {
    /// Platform used to pick a child from a manifest list when the other
    /// image is single-platform
    pub platform: Platform,
    pub network: NetworkConfig,
    pub registries: RegistriesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NetworkConfig {
    pub http_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            user_agent: format!("lucy/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RegistriesConfig {
    /// Registries reached over plain `http://` (e.g. "localhost:5000")
    pub plain_http: Vec<String>,
}

impl LucyConfig {
    /// Load configuration from `path`, or from `lucy.yaml` if it exists,
    /// then apply environment overrides
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None if Utf8Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Utf8Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env_overrides()
    }

    /// Parse a YAML config file; missing keys keep their defaults
    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        debug!("Loading config from {}", path);
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config(format!("config file not found: {}", path))
            } else {
                Error::Io(e)
            }
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Apply LUCY_* environment variable overrides
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(val) = env::var("LUCY_PLATFORM") {
            self.platform = val.parse()?;
        }

        if let Ok(val) = env::var("LUCY_HTTP_TIMEOUT_SECS") {
            self.network.http_timeout_secs = val
                .parse()
                .map_err(|_| Error::config("LUCY_HTTP_TIMEOUT_SECS must be a valid number"))?;
        }

        if let Ok(val) = env::var("LUCY_PLAIN_HTTP_REGISTRIES") {
            self.registries.plain_http = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(self)
    }

    /// URL scheme used for a registry host
    pub fn scheme_for(&self, registry: &str) -> &'static str {
        if self.registries.plain_http.iter().any(|r| r == registry) {
            "http"
        } else {
            "https"
        }
    }
}
