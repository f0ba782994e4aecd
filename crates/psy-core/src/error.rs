//! Error types for record loading and configuration
//!
//! Edit rejections are not errors at this level: they travel inside
//! [`crate::Outcome`]. These types cover the fatal cases a caller has to
//! handle before an editor exists.

/// Record document could not be turned into a [`crate::Record`]
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Input is not valid JSON
    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Document or section has the wrong JSON type
    #[error("invalid record shape: {section} must be {expected}")]
    Shape {
        section: &'static str,
        expected: &'static str,
    },
}

impl RecordError {
    /// Check if the input was readable JSON with the wrong structure
    #[inline]
    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape { .. })
    }
}

/// Engine configuration could not be read
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML syntax or type mismatch
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    /// Log filter is blank
    #[error("log filter must not be empty")]
    EmptyLogFilter,
}
