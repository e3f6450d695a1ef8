//! Layered configuration.
//!
//! Resolution order: an explicit path (from `--config` or `OSSA_CONFIG`),
//! then `ossa.toml` in the working directory, then built-in defaults.
//! Every section is optional and every field defaults.
//!
//! ```toml
//! [discovery]
//! detector_timeout_secs = 10
//! include_filename_heuristics = true
//!
//! [translation]
//! strict = true
//!
//! [validation.tiers]
//! platinum = 97.0
//!
//! [registry]
//! cache_path = ".ossa/cache/agents.json"
//! max_size = 500
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ossa_discovery::DiscoveryConfig;
use ossa_policy::ScoringWeights;
use ossa_registry::RegistryConfig;
use ossa_translate::TranslatorConfig;

use crate::error::{CoreError, CoreResult};

pub const DEFAULT_CONFIG_FILE: &str = "ossa.toml";
pub const CONFIG_ENV: &str = "OSSA_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OssaConfig {
    pub discovery: DiscoveryConfig,
    pub translation: TranslatorConfig,
    pub validation: ScoringWeights,
    pub registry: RegistryConfig,
}

impl OssaConfig {
    /// Load from `explicit` if given, else `./ossa.toml` if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> CoreResult<Self> {
        let cwd = std::env::current_dir()?;
        Self::resolve(explicit, &cwd)
    }

    /// Same as [`load`](Self::load) with `dir` standing in for the working directory.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> CoreResult<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(CoreError::ConfigNotFound(path.to_path_buf()));
            }
            return Self::from_path(path);
        }

        let fallback = dir.join(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::from_path(&fallback);
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse a config file, choosing the format by extension.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config: OssaConfig = match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| CoreError::invalid_config(path, e))?,
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| CoreError::invalid_config(path, e))?,
            "json" => serde_json::from_str(&content).map_err(|e| CoreError::invalid_config(path, e))?,
            other => return Err(CoreError::UnsupportedConfigFormat(other.to_string())),
        };
        config.validate().map_err(|e| CoreError::invalid_config(path, e))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.discovery.validate()?;
        self.validation.validate()?;
        self.registry.validate()?;
        Ok(())
    }
}
