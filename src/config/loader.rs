// src/config/loader.rs
//! Layered configuration loader
//!
//! Built-in defaults are overlaid with every configuration file that exists, in order,
//! then with `VITALS_`-prefixed environment variables, and finally validated.

use crate::config::{constants::paths, SystemConfig};
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Serialization format of a configuration file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(ConfigFormat::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration loader with file layering and environment overrides
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
    current_config: SystemConfig,
}

impl ConfigLoader {
    /// Create new configuration loader over the conventional locations
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Create loader with custom paths, later paths taking precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
            current_config: SystemConfig::default(),
        }
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load system configuration with validation
    pub fn load_system_config(&mut self) -> Result<SystemConfig> {
        let config = self.load_and_merge_configs()?;
        info!(
            paths = ?self.config_paths,
            rhythm = ?config.engine.initial_rhythm,
            "configuration loaded"
        );
        self.current_config = config.clone();
        Ok(config)
    }

    /// Last successfully loaded configuration, or the defaults
    pub fn current_config(&self) -> &SystemConfig {
        &self.current_config
    }

    /// Validate a single file layered over the defaults, without loading it
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut merged = Self::default_value()?;
        let file_value = Self::load_config_file(path.as_ref())?;
        Self::merge_toml_values(&mut merged, file_value);

        let config: SystemConfig = merged.try_into()?;
        config.validate().map_err(ConfigError::Validation)
    }

    /// Export current configuration to file, TOML or JSON by extension
    pub fn export_config<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(&self.current_config)?,
            ConfigFormat::Json => serde_json::to_string_pretty(&self.current_config)?,
        };
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "configuration exported");
        Ok(())
    }

    fn default_value() -> Result<toml::Value> {
        Ok(toml::Value::try_from(SystemConfig::default())?)
    }

    fn load_and_merge_configs(&self) -> Result<SystemConfig> {
        let mut merged = Self::default_value()?;

        for config_path in &self.config_paths {
            if !config_path.exists() {
                continue;
            }
            match Self::load_config_file(config_path) {
                Ok(file_value) => Self::merge_toml_values(&mut merged, file_value),
                Err(e) => {
                    warn!(path = %config_path.display(), error = %e, "unreadable configuration file");
                    return Err(e);
                }
            }
        }

        self.apply_environment_overrides(&mut merged, std::env::vars());

        let config: SystemConfig = merged.try_into()?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn load_config_file(path: &Path) -> Result<toml::Value> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let value = match format {
            ConfigFormat::Toml => toml::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
        };
        Ok(value)
    }

    fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
        match (base, overlay) {
            (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
                for (key, value) in overlay_table {
                    if let Some(base_value) = base_table.get_mut(&key) {
                        Self::merge_toml_values(base_value, value);
                    } else {
                        base_table.insert(key, value);
                    }
                }
            }
            (base_value, overlay_value) => {
                *base_value = overlay_value;
            }
        }
    }

    fn apply_environment_overrides(
        &self,
        config: &mut toml::Value,
        vars: impl IntoIterator<Item = (String, String)>,
    ) {
        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix(&self.env_prefix) else {
                continue;
            };
            let tokens: Vec<String> = stripped
                .to_lowercase()
                .split('_')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if tokens.is_empty() {
                warn!(variable = %key, "environment override names no configuration key");
                continue;
            }

            let path = match config {
                toml::Value::Table(table) => resolve_key_path(table, &tokens),
                _ => continue,
            };
            debug!(variable = %key, path = %path.join("."), "environment override");
            set_nested_value(config, &path, parse_env_value(&value));
        }
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(paths::DEFAULT_CONFIG_FILE)];

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(paths::USER_CONFIG_DIR).join("config.toml"));
        }

        paths.push(PathBuf::from(paths::LOCAL_CONFIG_FILE));
        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Map `_`-separated tokens onto existing keys, which may contain underscores themselves
///
/// The longest run of tokens naming an existing key wins at each level. Tokens that name
/// nothing become a single new key, so optional fields absent from the defaults can
/// still be overridden.
fn resolve_key_path(table: &toml::value::Table, tokens: &[String]) -> Vec<String> {
    for end in (1..=tokens.len()).rev() {
        let key = tokens[..end].join("_");
        let Some(value) = table.get(&key) else {
            continue;
        };
        if end == tokens.len() {
            return vec![key];
        }
        if let toml::Value::Table(inner) = value {
            let mut path = vec![key];
            path.extend(resolve_key_path(inner, &tokens[end..]));
            return path;
        }
    }
    vec![tokens.join("_")]
}

fn parse_env_value(value: &str) -> toml::Value {
    if let Ok(int_val) = value.parse::<i64>() {
        toml::Value::Integer(int_val)
    } else if let Ok(float_val) = value.parse::<f64>() {
        toml::Value::Float(float_val)
    } else if let Ok(bool_val) = value.parse::<bool>() {
        toml::Value::Boolean(bool_val)
    } else {
        toml::Value::String(value.to_string())
    }
}

fn set_nested_value(config: &mut toml::Value, path: &[String], value: toml::Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = config;
    for part in parents {
        let toml::Value::Table(table) = current else {
            warn!(key = %part, "environment override shadows a non-table value");
            return;
        };
        current = table
            .entry(part.clone())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
    }
    if let toml::Value::Table(table) = current {
        table.insert(last.clone(), value);
    }
}

// Cross-platform directory discovery
mod dirs {
    use std::path::PathBuf;

    pub fn home_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var_os("USERPROFILE").map(PathBuf::from)
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var_os("HOME").map(PathBuf::from)
        }
    }
}
