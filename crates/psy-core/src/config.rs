//! Engine configuration
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```toml
//! log_filter = "psy_core=debug"
//! pretty_json = true
//! palette = ["#1f77b4", "#ff7f0e"]
//! ```

use psy_model::Palette;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default `tracing` filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Measure colors, cycled by position
    pub palette: Palette,
    /// `tracing` filter directive
    pub log_filter: String,
    /// Indent saved records
    pub pretty_json: bool,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With palette
    #[inline]
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// With log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// With pretty-printed output
    #[inline]
    #[must_use]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed TOML, [`ConfigError::EmptyLogFilter`]
    /// for a blank filter.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        if config.log_filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }
        Ok(config)
    }

    /// Render as a TOML document
    ///
    /// # Errors
    /// [`ConfigError::Render`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            pretty_json: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_document() {
        let config = EngineConfig::from_toml_str(
            r##"
            pretty_json = false
            palette = ["#000000", "#ffffff"]
            "##,
        )
        .unwrap();
        assert!(!config.pretty_json);
        assert_eq!(config.palette.color_at(1), "#ffffff");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn rejects_blank_filter() {
        assert!(matches!(
            EngineConfig::from_toml_str("log_filter = \"  \""),
            Err(ConfigError::EmptyLogFilter)
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("pretty_json = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = EngineConfig::new().with_log_filter("debug").with_pretty_json(false);
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
