//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log filtering for the command-line tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive for tracing (e.g. "warn", "humdrum=debug").
    /// Default: warn
    #[serde(default = "LoggingConfig::default_log_level")]
    pub log_level: String,
}

impl LoggingConfig {
    fn default_log_level() -> String {
        "warn".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

/// How reports are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format {:?} (expected text or json)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Which null tokens a report lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullReport {
    #[default]
    All,
    Unresolved,
}

impl FromStr for NullReport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(NullReport::All),
            "unresolved" => Ok(NullReport::Unresolved),
            other => Err(format!("unknown null report {:?} (expected all or unresolved)", other)),
        }
    }
}

impl fmt::Display for NullReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullReport::All => f.write_str("all"),
            NullReport::Unresolved => f.write_str("unresolved"),
        }
    }
}

/// Analysis knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Exclusive interpretations whose tokens carry durations.
    /// Default: ["**kern", "**recip"]
    #[serde(default = "AnalysisConfig::default_rhythm_spines")]
    pub rhythm_spines: Vec<String>,

    #[serde(default)]
    pub null_report: NullReport,
}

impl AnalysisConfig {
    pub(crate) fn default_rhythm_spines() -> Vec<String> {
        vec!["**kern".to_string(), "**recip".to_string()]
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rhythm_spines: Self::default_rhythm_spines(),
            null_report: NullReport::default(),
        }
    }
}
