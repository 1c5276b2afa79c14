//! Object manager configuration
//!
//! Configuration can be read from YAML, TOML or JSON; the format is picked
//! from the file extension. `${VAR}` and `${VAR:-default}` references are
//! expanded from the environment before parsing.

use crate::error::{ObjectError, Result};
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Object manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectManagerConfig {
    /// Catch panics raised by module callbacks and keep dispatching
    pub isolate_callback_panics: bool,

    /// Call `destroy` on each interface purged when its module unloads
    pub notify_on_purge: bool,
}

impl Default for ObjectManagerConfig {
    fn default() -> Self {
        Self {
            isolate_callback_panics: false,
            notify_on_purge: true,
        }
    }
}

impl ObjectManagerConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_from_file(path)
    }

    /// Enable or disable callback panic isolation
    pub fn with_callback_isolation(mut self, isolate: bool) -> Self {
        self.isolate_callback_panics = isolate;
        self
    }

    /// Enable or disable `destroy` notification during unload purge
    pub fn with_purge_notification(mut self, notify: bool) -> Self {
        self.notify_on_purge = notify;
        self
    }
}

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ObjectError::config("Unable to detect config format"))?;

        match ext {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ObjectError::config(format!("Unsupported config format: {ext}"))),
        }
    }
}

/// Load any deserializable document from a file
pub fn load_from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();

    let content = fs::read_to_string(path)
        .map_err(|e| ObjectError::config(format!("Failed to read {}: {e}", path.display())))?;

    let format = ConfigFormat::from_path(path)?;

    load_from_str(&content, format)
}

/// Load any deserializable document from a string
pub fn load_from_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T> {
    let content = expand_env_vars(content)?;

    let parsed = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|e| ObjectError::config(format!("Invalid {format:?} document: {e}")))
}

/// Expand `${VAR}` and `${VAR:-default}` references
///
/// A variable that is unset and has no default is an error.
fn expand_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)(?::-([^}]*))?\}")
        .map_err(|e| ObjectError::config(format!("Invalid pattern: {e}")))?;

    let mut missing = None;
    let expanded = pattern.replace_all(content, |caps: &Captures<'_>| {
        let var = &caps[1];
        match (env::var(var), caps.get(2)) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.as_str().to_string(),
            (Err(_), None) => {
                missing.get_or_insert_with(|| var.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var) => Err(ObjectError::config(format!(
            "Environment variable '{var}' is not set and has no default"
        ))),
        None => Ok(expanded.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = ObjectManagerConfig::default();
        assert!(!config.isolate_callback_panics);
        assert!(config.notify_on_purge);
    }

    #[test]
    fn test_detect_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("objects.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("objects.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("objects.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(&PathBuf::from("objects.ini")).is_err());
        assert!(ConfigFormat::from_path(&PathBuf::from("objects")).is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ObjectManagerConfig =
            load_from_str("isolate_callback_panics: true\n", ConfigFormat::Yaml).unwrap();
        assert!(config.isolate_callback_panics);
        assert!(config.notify_on_purge);
    }

    #[test]
    fn test_toml_and_json() {
        let config: ObjectManagerConfig = load_from_str(
            "isolate_callback_panics = true\nnotify_on_purge = false\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert!(config.isolate_callback_panics);
        assert!(!config.notify_on_purge);

        let config: ObjectManagerConfig =
            load_from_str(r#"{"notify_on_purge": true}"#, ConfigFormat::Json).unwrap();
        assert_eq!(config, ObjectManagerConfig::default());
    }

    #[test]
    fn test_env_default_expansion() {
        let expanded =
            expand_env_vars("notify: ${AURIE_TEST_SURELY_UNSET_VAR:-false}").unwrap();
        assert_eq!(expanded, "notify: false");
    }

    #[test]
    fn test_env_missing_without_default() {
        let err = expand_env_vars("notify: ${AURIE_TEST_SURELY_UNSET_VAR}").unwrap_err();
        assert!(matches!(err, ObjectError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_document() {
        let result: Result<ObjectManagerConfig> =
            load_from_str("notify_on_purge: sometimes\n", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ObjectError::ConfigError(_))));
    }
}
