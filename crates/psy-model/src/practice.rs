//! Practice definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;

/// Name carried by a practice that has not been named yet
pub const PLACEHOLDER_PRACTICE: &str = "New Practice";

/// One tracked intervention, marked present/absent per session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Practice {
    /// Unique name, also the session column key
    #[serde(rename = "Name")]
    pub name: String,

    /// Free text
    #[serde(rename = "Description")]
    pub description: String,
}

impl Practice {
    /// Named practice without description
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    /// Unnamed practice appended by "add"
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_PRACTICE)
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check if this row still carries the placeholder name
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER_PRACTICE
    }

    /// Build a practice from loosely-typed input
    #[must_use]
    pub fn sanitize(raw: &serde_json::Map<String, Value>) -> Self {
        let name = match raw.get("Name") {
            None | Some(Value::Null) => PLACEHOLDER_PRACTICE.to_string(),
            Some(v) => coerce::to_text(v),
        };
        Self {
            name,
            description: raw.get("Description").map(coerce::to_text).unwrap_or_default(),
        }
    }
}

impl Default for Practice {
    fn default() -> Self {
        Self::placeholder()
    }
}
