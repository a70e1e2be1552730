//! # Shelfline Configuration
//!
//! Where the tables live and how the forms behave.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHELFLINE_ITEMS_PATH=/srv/forms/items.csv                          │
//! │     SHELFLINE_OFFLINE=1                                                │
//! │                                                                         │
//! │  2. TOML Config File (--config, or the platform default)              │
//! │     ~/.config/shelfline/shelfline.toml (Linux)                         │
//! │     ~/Library/Application Support/com.shelfline.forms/shelfline.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     items.csv / feedback.csv in the working directory                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! items_path = "data/items.csv"
//! feedback_path = "data/feedback.csv"
//! cache_ttl_secs = 60
//!
//! [catalog]
//! path = "data/catalog.xlsx"
//!
//! [forms]
//! unit_and_cf = true
//! outlets = ["Downtown", "Marina"]
//!
//! [tracking]
//! editable_columns = ["Action Took"]
//! action_options = ["Pending Review", "Ordered", "Completed"]
//! ```

use serde::{Deserialize, Serialize};
use shelfline_core::{default_action_options, Column, EntryFieldSet};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[store]`: table locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// CSV file backing the Items table.
    #[serde(default = "default_items_path")]
    pub items_path: PathBuf,

    /// CSV file backing the Feedback table.
    #[serde(default = "default_feedback_path")]
    pub feedback_path: PathBuf,

    /// Seconds a full-table read is reused.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Open sessions without a store: lookups and buffering only.
    #[serde(default)]
    pub offline: bool,
}

fn default_items_path() -> PathBuf {
    PathBuf::from("items.csv")
}

fn default_feedback_path() -> PathBuf {
    PathBuf::from("feedback.csv")
}

fn default_cache_ttl() -> u64 {
    60
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            items_path: default_items_path(),
            feedback_path: default_feedback_path(),
            cache_ttl_secs: default_cache_ttl(),
            offline: false,
        }
    }
}

impl StoreSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// `[catalog]`: reference catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// `.csv`, `.xlsx`, `.xls` or `.ods`. Without it every lookup misses.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// `[forms]`: item and feedback form behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSettings {
    /// Collect and write Unit and CF.
    #[serde(default = "default_true")]
    pub unit_and_cf: bool,

    /// Allowed outlet names. Empty accepts any.
    #[serde(default)]
    pub outlets: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for FormSettings {
    fn default() -> Self {
        FormSettings {
            unit_and_cf: true,
            outlets: Vec::new(),
        }
    }
}

impl FormSettings {
    pub fn field_set(&self) -> EntryFieldSet {
        EntryFieldSet {
            unit_and_cf: self.unit_and_cf,
        }
    }
}

/// `[tracking]`: action dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSettings {
    #[serde(default = "default_editable_columns")]
    pub editable_columns: Vec<Column>,

    #[serde(default = "default_action_options")]
    pub action_options: Vec<String>,
}

fn default_editable_columns() -> Vec<Column> {
    vec![Column::ActionTook]
}

impl Default for TrackingSettings {
    fn default() -> Self {
        TrackingSettings {
            editable_columns: default_editable_columns(),
            action_options: default_action_options(),
        }
    }
}

// =============================================================================
// Root Config
// =============================================================================

/// Complete Shelfline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelflineConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub forms: FormSettings,

    #[serde(default)]
    pub tracking: TrackingSettings,
}

impl ShelflineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (shelfline.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else if explicit {
                return Err(ConfigError::Invalid(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tracking.editable_columns.is_empty() {
            return Err(ConfigError::Invalid(
                "tracking.editable_columns must name at least one column".into(),
            ));
        }

        if self.tracking.action_options.iter().any(|o| o.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "tracking.action_options must not contain blank entries".into(),
            ));
        }

        if self.forms.outlets.iter().any(|o| o.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "forms.outlets must not contain blank entries".into(),
            ));
        }

        Ok(())
    }

    /// Applies `SHELFLINE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("SHELFLINE_ITEMS_PATH") {
            debug!(path = %path, "Overriding items path from environment");
            self.store.items_path = PathBuf::from(path);
        }

        if let Some(path) = var("SHELFLINE_FEEDBACK_PATH") {
            self.store.feedback_path = PathBuf::from(path);
        }

        if let Some(path) = var("SHELFLINE_CATALOG_PATH") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog.path = Some(PathBuf::from(path));
        }

        if let Some(ttl) = var("SHELFLINE_CACHE_TTL_SECS") {
            match ttl.parse::<u64>() {
                Ok(secs) => self.store.cache_ttl_secs = secs,
                Err(_) => warn!(value = %ttl, "Ignoring invalid SHELFLINE_CACHE_TTL_SECS"),
            }
        }

        if let Some(flag) = var("SHELFLINE_UNIT_AND_CF") {
            match parse_flag(&flag) {
                Some(on) => self.forms.unit_and_cf = on,
                None => warn!(value = %flag, "Ignoring invalid SHELFLINE_UNIT_AND_CF"),
            }
        }

        if let Some(flag) = var("SHELFLINE_OFFLINE") {
            match parse_flag(&flag) {
                Some(on) => self.store.offline = on,
                None => warn!(value = %flag, "Ignoring invalid SHELFLINE_OFFLINE"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shelfline", "forms")
            .map(|dirs| dirs.config_dir().join("shelfline.toml"))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ShelflineConfig::default();
        assert_eq!(config.store.items_path, PathBuf::from("items.csv"));
        assert_eq!(config.store.cache_ttl(), Duration::from_secs(60));
        assert!(config.forms.unit_and_cf);
        assert_eq!(config.tracking.editable_columns, vec![Column::ActionTook]);
        assert_eq!(config.tracking.action_options.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: ShelflineConfig = toml::from_str(
            r#"
            [store]
            items_path = "/srv/forms/items.csv"

            [forms]
            unit_and_cf = false
            outlets = ["Downtown", "Marina"]

            [tracking]
            action_options = ["Open", "Done"]
            "#,
        )
        .unwrap();

        assert_eq!(config.store.items_path, PathBuf::from("/srv/forms/items.csv"));
        assert_eq!(config.store.feedback_path, PathBuf::from("feedback.csv"));
        assert!(!config.forms.field_set().unit_and_cf);
        assert_eq!(config.forms.outlets.len(), 2);
        assert_eq!(config.tracking.editable_columns, vec![Column::ActionTook]);
        assert_eq!(config.tracking.action_options, vec!["Open", "Done"]);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SHELFLINE_ITEMS_PATH", "/tmp/items.csv"),
            ("SHELFLINE_CATALOG_PATH", "/tmp/catalog.xlsx"),
            ("SHELFLINE_CACHE_TTL_SECS", "0"),
            ("SHELFLINE_UNIT_AND_CF", "no"),
            ("SHELFLINE_OFFLINE", "maybe"),
        ]
        .into_iter()
        .collect();

        let mut config = ShelflineConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.items_path, PathBuf::from("/tmp/items.csv"));
        assert_eq!(config.catalog.path, Some(PathBuf::from("/tmp/catalog.xlsx")));
        assert_eq!(config.store.cache_ttl_secs, 0);
        assert!(!config.forms.unit_and_cf);
        assert!(!config.store.offline); // unparseable flag ignored
    }

    #[test]
    fn test_validate_rejects_empty_editable_columns() {
        let mut config = ShelflineConfig::default();
        config.tracking.editable_columns.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shelfline.toml");

        let mut config = ShelflineConfig::default();
        config.forms.outlets = vec!["Downtown".into()];
        config.save(Some(path.clone())).unwrap();

        let loaded = ShelflineConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.forms.outlets, vec!["Downtown"]);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(ShelflineConfig::load(Some(missing)).is_err());
    }
}
