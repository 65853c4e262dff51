//! Store configuration module.
//!
//! Handles loading and validating `pagetree.toml`. Stock defaults are the
//! base layer; a user file only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [validation]
//! use_defaults = true       # Fill declared defaults (ids, frontmatter, hidden)
//! coerce_types = true       # Convert "true" → true, 3 → "3", etc.
//! remove_additional = true  # Strip undeclared keys from closed shapes
//!
//! [ids]
//! words = 3                 # Words per generated slug id
//! separator = "-"           # Joins the words
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::ids::SlugIds;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "pagetree.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Store configuration loaded from `pagetree.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Validation gate switches.
    pub validation: ValidationConfig,
    /// Generated id shape.
    pub ids: IdsConfig,
}

impl StoreConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=8).contains(&self.ids.words) {
            return Err(ConfigError::Validation("ids.words must be 1-8".into()));
        }
        if self.ids.separator.contains('/') {
            return Err(ConfigError::Validation(
                "ids.separator must not contain '/'".into(),
            ));
        }
        Ok(())
    }
}

/// Switches for the validation gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Fill absent properties that declare a default.
    pub use_defaults: bool,
    /// Convert mistyped scalars instead of rejecting them.
    pub coerce_types: bool,
    /// Strip undeclared properties from closed shapes instead of rejecting them.
    pub remove_additional: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            use_defaults: true,
            coerce_types: true,
            remove_additional: true,
        }
    }
}

/// Shape of generated page ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdsConfig {
    pub words: usize,
    pub separator: String,
}

impl Default for IdsConfig {
    fn default() -> Self {
        Self {
            words: 3,
            separator: "-".to_string(),
        }
    }
}

impl IdsConfig {
    pub fn generator(&self) -> SlugIds {
        SlugIds::new(self.words, self.separator.clone())
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StoreConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `pagetree.toml` from `dir` as a raw TOML value, `None` if absent.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Load config from `pagetree.toml` in `dir`, falling back to stock defaults.
pub fn load_config(dir: &Path) -> Result<StoreConfig, ConfigError> {
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: StoreConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `pagetree.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pagetree configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Validation gate
# ---------------------------------------------------------------------------
[validation]
# Fill absent properties that declare a default: page ids, an empty
# frontmatter table, and hidden = false.
use_defaults = true

# Convert mistyped scalars instead of rejecting the node list
# ("true" -> true, 3 -> "3", null -> "").
coerce_types = true

# Strip keys a closed shape does not declare (credentials) instead of
# rejecting the value. Pages are open and keep every key.
remove_additional = true

# ---------------------------------------------------------------------------
# Generated ids
# ---------------------------------------------------------------------------
[ids]
# Words per slug, e.g. 3 -> "swift-amber-otter". Range 1-8.
# A slug already used in the same node list is drawn again, then extended
# with a counter ("otter-2"), so small word counts stay unique.
words = 3

# Joins the words. Must not contain '/'.
separator = "-"
"##
}
