//! Client profile

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce;

/// Editable field of the client profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientField {
    /// Pseudonymous identifier
    #[serde(rename = "ID")]
    Id,
    /// Age in years
    Age,
    /// Gender
    Gender,
    /// Diagnoses or core symptoms
    Focus,
    /// Free notes
    Notes,
}

impl Display for ClientField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "ID",
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::Focus => "Focus",
            Self::Notes => "Notes",
        })
    }
}

/// Client profile record
///
/// Keys the engine does not know are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(rename = "Age", default)]
    pub age: Option<u32>,

    #[serde(rename = "Gender", default)]
    pub gender: String,

    #[serde(rename = "Focus", default)]
    pub focus: String,

    #[serde(rename = "Notes", default)]
    pub notes: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientInfo {
    /// Build a profile from loosely-typed input
    #[must_use]
    pub fn sanitize(raw: &Map<String, Value>) -> Self {
        let mut info = Self::default();
        for (key, value) in raw {
            match key.as_str() {
                "ID" => info.id = coerce::to_text(value),
                "Age" => info.age = parse_age(value),
                "Gender" => info.gender = coerce::to_text(value),
                "Focus" => info.focus = coerce::to_text(value),
                "Notes" => info.notes = coerce::to_text(value),
                _ => {
                    info.extra.insert(key.clone(), value.clone());
                }
            }
        }
        info
    }

    /// Return a copy with one field replaced
    #[must_use]
    pub fn with_field(&self, field: ClientField, value: &Value) -> Self {
        let mut next = self.clone();
        match field {
            ClientField::Id => next.id = coerce::to_text(value),
            ClientField::Age => next.age = parse_age(value),
            ClientField::Gender => next.gender = coerce::to_text(value),
            ClientField::Focus => next.focus = coerce::to_text(value),
            ClientField::Notes => next.notes = coerce::to_text(value),
        }
        next
    }
}

fn parse_age(value: &Value) -> Option<u32> {
    coerce::to_number(value)
        .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n.trunc() as u32)
}
