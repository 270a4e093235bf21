//! Configuration for constructions.
//!
//! All types implement [`serde::Deserialize`] and are usually read from a
//! TOML file by [`load_config`].
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining label and engine settings.
//! - [`LabelConfig`] - Controls how labels are drawn from the alphabet.
//! - [`EngineConfig`] - Controls the exact arithmetic engine.
//!
//! # Example
//!
//! ```toml
//! [labels]
//! pools = "shared"
//!
//! [engine]
//! factor_limit = 1000000
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use straightedge_core::{engine::ExactEngine, number::DEFAULT_FACTOR_LIMIT};

use crate::label::LabelPools;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration combining label and engine settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Label allocation section.
    #[serde(default)]
    labels: LabelConfig,

    /// Arithmetic engine section.
    #[serde(default)]
    engine: EngineConfig,
}

impl AppConfig {
    pub fn new(labels: LabelConfig, engine: EngineConfig) -> Self {
        Self { labels, engine }
    }

    /// Returns the label configuration.
    pub fn labels(&self) -> &LabelConfig {
        &self.labels
    }

    /// Returns the engine configuration.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the factoring limit is below 2.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.factor_limit < 2 {
            return Err(ConfigError::Validation(format!(
                "engine.factor_limit must be at least 2, got {}",
                self.engine.factor_limit
            )));
        }
        Ok(())
    }
}

/// Label allocation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelConfig {
    /// Whether points and other elements draw from separate counters.
    #[serde(default)]
    pools: LabelPools,
}

impl LabelConfig {
    pub fn new(pools: LabelPools) -> Self {
        Self { pools }
    }

    pub fn pools(&self) -> LabelPools {
        self.pools
    }
}

/// Exact arithmetic settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Trial division bound when taking square roots of rationals.
    #[serde(default = "default_factor_limit")]
    factor_limit: u64,
}

fn default_factor_limit() -> u64 {
    DEFAULT_FACTOR_LIMIT
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            factor_limit: DEFAULT_FACTOR_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn new(factor_limit: u64) -> Self {
        Self { factor_limit }
    }

    pub fn factor_limit(&self) -> u64 {
        self.factor_limit
    }

    /// Builds the exact engine these settings describe.
    pub fn build(&self) -> ExactEngine {
        ExactEngine::new(self.factor_limit)
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (straightedge/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or fails validation
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("straightedge/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "straightedge", "straightedge") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file.
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.labels().pools(), LabelPools::Separate);
        assert_eq!(config.engine().factor_limit(), DEFAULT_FACTOR_LIMIT);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str("[labels]\npools = \"shared\"\n").unwrap();
        assert_eq!(config.labels().pools(), LabelPools::Shared);
        assert_eq!(config.engine().factor_limit(), DEFAULT_FACTOR_LIMIT);
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nfactor_limit = 5000").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.engine().factor_limit(), 5000);
        assert_eq!(config.engine().build().factor_limit(), 5000);
    }

    #[test]
    fn test_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(ConfigError::MissingFile(path)) if path == missing
        ));
    }

    #[test]
    fn test_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[labels]\npools = \"tiered\"").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Parse(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nfactor_limit = 1").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Validation(_))
        ));
    }
}
