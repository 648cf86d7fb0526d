use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::providers::{DEFAULT_HOST, DEFAULT_MAX_CONCURRENT_REQUESTS};

/// Configuration file structure for sentry2csv.
///
/// Lets users keep the token, host and enrichment mappings out of their shell
/// history. Command-line flags take precedence over anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub sentry: SentryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SentryConfig {
    /// Sentry API token
    pub token: Option<String>,

    /// Sentry host, for self-hosted installations
    #[serde(default = "default_host")]
    pub host: String,

    /// Only export issues seen in this environment
    pub environment: Option<String>,

    /// Enrichment mappings, e.g. "contexts.os.name=OS,release.version=Release"
    pub enrich: Option<String>,

    /// Maximum number of latest-event requests in flight
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            token: None,
            host: default_host(),
            environment: None,
            enrich: None,
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./sentry2csv.toml
    /// 3. ./sentry2csv.json
    /// 4. ./sentry2csv.yaml
    /// 5. ./sentry2csv.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Ok(Self::default());
            }
            return Self::load_from_path(path);
        }

        let candidates = [
            "sentry2csv.toml",
            "sentry2csv.json",
            "sentry2csv.yaml",
            "sentry2csv.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}
