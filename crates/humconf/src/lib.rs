//! Configuration loading for the Humdrum tools.
//!
//! # Usage
//!
//! ```rust,no_run
//! use humconf::HumConfig;
//!
//! let config = HumConfig::load().expect("Failed to load config");
//!
//! println!("log level: {}", config.logging.log_level);
//! println!("rhythm spines: {:?}", config.analysis.rhythm_spines);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/humdrum/config.toml` (system)
//! 2. `~/.config/humdrum/config.toml` (user)
//! 3. `./humdrum.toml` (local override), or the path given on the command line
//! 4. Environment variables (`HUMDRUM_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [logging]
//! log_level = "warn"
//!
//! [output]
//! format = "text"
//!
//! [analysis]
//! rhythm_spines = ["**kern", "**recip"]
//! null_report = "all"
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files_with_override, expand_path, ConfigLayer, ConfigSources};
pub use settings::{AnalysisConfig, LoggingConfig, NullReport, OutputConfig, OutputFormat};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HumConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl HumConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/humdrum/config.toml`
    /// 3. `~/.config/humdrum/config.toml`
    /// 4. `./humdrum.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./humdrum.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = HumConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        // Built by hand for stable key order and comments
        let mut output = String::new();

        output.push_str("# Humdrum tools configuration\n\n");

        output.push_str("[logging]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.logging.log_level));

        output.push_str("\n[output]\n");
        output.push_str(&format!("format = \"{}\"\n", self.output.format));

        output.push_str("\n[analysis]\n");
        output.push_str("rhythm_spines = [");
        let spines: Vec<String> = self
            .analysis
            .rhythm_spines
            .iter()
            .map(|s| format!("\"{}\"", s))
            .collect();
        output.push_str(&spines.join(", "));
        output.push_str("]\n");
        output.push_str(&format!("null_report = \"{}\"\n", self.analysis.null_report));

        output
    }
}
