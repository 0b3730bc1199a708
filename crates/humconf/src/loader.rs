//! Config file discovery, loading, and environment variable overlay.

use crate::settings::{NullReport, OutputFormat};
use crate::{ConfigError, HumConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/humdrum/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("humdrum/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // An explicit path is loaded even if missing so the read error surfaces
    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("humdrum.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// The keys one config file actually sets. Unset keys leave earlier layers
/// alone, even when the earlier value is not the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub log_level: Option<String>,
    pub format: Option<OutputFormat>,
    pub rhythm_spines: Option<Vec<String>>,
    pub null_report: Option<NullReport>,
}

/// Load one config layer from a TOML file.
pub fn load_from_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_layer(&contents, path)
}

/// Parse the keys present in a TOML string.
pub fn parse_layer(contents: &str, path: &Path) -> Result<ConfigLayer, ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let invalid = |key: &str, message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("{}: {}", key, message),
    };
    let section = |name: &str| table.get(name).and_then(|v| v.as_table());

    let mut layer = ConfigLayer::default();

    if let Some(logging) = section("logging") {
        layer.log_level = logging
            .get("log_level")
            .and_then(|v| v.as_str())
            .map(str::to_string);
    }

    if let Some(v) = section("output").and_then(|o| o.get("format")).and_then(|v| v.as_str()) {
        layer.format = Some(v.parse().map_err(|e| invalid("output.format", e))?);
    }

    if let Some(analysis) = section("analysis") {
        layer.rhythm_spines = analysis.get("rhythm_spines").and_then(|v| v.as_array()).map(|spines| {
            spines
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        });
        if let Some(v) = analysis.get("null_report").and_then(|v| v.as_str()) {
            layer.null_report = Some(v.parse().map_err(|e| invalid("analysis.null_report", e))?);
        }
    }

    Ok(layer)
}

/// Parse a complete config from a TOML string. Missing keys keep their
/// defaults.
pub fn parse_toml(contents: &str, path: &Path) -> Result<HumConfig, ConfigError> {
    Ok(merge_configs(HumConfig::default(), parse_layer(contents, path)?))
}

/// Lay `overlay` over `base`: every key the overlay sets wins.
pub fn merge_configs(mut base: HumConfig, overlay: ConfigLayer) -> HumConfig {
    if let Some(v) = overlay.log_level {
        base.logging.log_level = v;
    }
    if let Some(v) = overlay.format {
        base.output.format = v;
    }
    if let Some(v) = overlay.rhythm_spines {
        base.analysis.rhythm_spines = v;
    }
    if let Some(v) = overlay.null_report {
        base.analysis.null_report = v;
    }
    base
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut HumConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

/// Same as [`apply_env_overrides`] with an explicit variable lookup.
pub fn apply_overrides_from(
    config: &mut HumConfig,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("HUMDRUM_LOG_LEVEL") {
        config.logging.log_level = v;
        sources.env_overrides.push("HUMDRUM_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.logging.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    if let Some(v) = lookup("HUMDRUM_FORMAT") {
        if let Ok(format) = v.parse() {
            config.output.format = format;
            sources.env_overrides.push("HUMDRUM_FORMAT".to_string());
        }
    }

    if let Some(v) = lookup("HUMDRUM_RHYTHM_SPINES") {
        config.analysis.rhythm_spines = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        sources.env_overrides.push("HUMDRUM_RHYTHM_SPINES".to_string());
    }

    if let Some(v) = lookup("HUMDRUM_NULL_REPORT") {
        if let Ok(report) = v.parse() {
            config.analysis.null_report = report;
            sources.env_overrides.push("HUMDRUM_NULL_REPORT".to_string());
        }
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
