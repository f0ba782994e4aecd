//! Measure definitions
//!
//! A measure is a named variable tracked across sessions. Its name doubles
//! as the session column key.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;
use crate::error::ValidationError;

/// Name carried by a measure that has not been named yet
pub const PLACEHOLDER_MEASURE: &str = "New Measure";

/// Rater assigned to new measures
pub const DEFAULT_RATER: &str = "Self";

/// Default lower bound of a Scale measure
pub const DEFAULT_SCALE_MIN: f64 = 0.0;

/// Default upper bound of a Scale measure
pub const DEFAULT_SCALE_MAX: f64 = 100.0;

/// Kind of values a measure records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeasureType {
    /// Bounded numeric scale with explicit Min and Max
    #[default]
    Scale,
    /// Non-negative count with no upper bound
    Count,
}

impl MeasureType {
    /// Display name, as stored in records
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scale => "Scale",
            Self::Count => "Count",
        }
    }

    /// Coerce arbitrary input into a measure type
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownMeasureType`] for anything other
    /// than `Scale` or `Count` (case-insensitive).
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        coerce::to_text(value).parse()
    }
}

impl FromStr for MeasureType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scale" => Ok(Self::Scale),
            "count" => Ok(Self::Count),
            _ => Err(ValidationError::UnknownMeasureType {
                value: s.to_string(),
            }),
        }
    }
}

impl Display for MeasureType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of a measure's range an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bound {
    /// Lower bound
    Min,
    /// Upper bound
    Max,
}

impl Display for Bound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Min => "Min",
            Self::Max => "Max",
        })
    }
}

/// One measure definition
///
/// Serialized with the capitalized keys of the record format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Unique name, also the session column key
    #[serde(rename = "Name")]
    pub name: String,

    /// Scale or Count
    #[serde(rename = "Type")]
    pub measure_type: MeasureType,

    /// Lower bound (always 0 for Count)
    #[serde(rename = "Min")]
    pub min: f64,

    /// Upper bound (`None` for Count)
    #[serde(rename = "Max")]
    pub max: Option<f64>,

    /// Who rates the measure
    #[serde(rename = "Rater")]
    pub rater: String,

    /// Free text
    #[serde(rename = "Description")]
    pub description: String,

    /// Display color, derived from position
    #[serde(rename = "Color", default)]
    pub color: String,

    /// Whether the measure is plotted
    #[serde(rename = "SelectMeasure")]
    pub select_measure: bool,

    /// Whether the measure's rater is selected
    #[serde(rename = "SelectRater")]
    pub select_rater: bool,
}

impl Measure {
    /// Unnamed measure appended by "add"
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            name: PLACEHOLDER_MEASURE.to_string(),
            measure_type: MeasureType::Scale,
            min: DEFAULT_SCALE_MIN,
            max: Some(DEFAULT_SCALE_MAX),
            rater: DEFAULT_RATER.to_string(),
            description: String::new(),
            color: String::new(),
            select_measure: false,
            select_rater: false,
        }
    }

    /// Scale measure with the given name and range
    #[must_use]
    pub fn scale(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max: Some(max),
            ..Self::placeholder()
        }
    }

    /// Count measure with the given name
    #[must_use]
    pub fn count(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            measure_type: MeasureType::Count,
            min: 0.0,
            max: None,
            ..Self::placeholder()
        }
    }

    /// With rater
    #[inline]
    #[must_use]
    pub fn with_rater(mut self, rater: impl Into<String>) -> Self {
        self.rater = rater.into();
        self
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
        self.name == PLACEHOLDER_MEASURE
    }

    /// Effective upper bound for session values
    ///
    /// Count measures are unbounded above.
    #[inline]
    #[must_use]
    pub fn upper_bound(&self) -> f64 {
        match self.measure_type {
            MeasureType::Scale => self.max.unwrap_or(f64::INFINITY),
            MeasureType::Count => f64::INFINITY,
        }
    }

    /// Check if a session value lies inside `[min, upper_bound]`
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        value.is_finite() && self.min <= value && value <= self.upper_bound()
    }

    /// Build a measure from loosely-typed input
    ///
    /// Count measures get `Min=0, Max=None`; Scale measures default missing
    /// bounds to 0/100 and reset both when `Max <= Min`.
    #[must_use]
    pub fn sanitize(raw: &serde_json::Map<String, Value>) -> Self {
        let field = |key: &str| raw.get(key).unwrap_or(&Value::Null);

        let measure_type = MeasureType::from_value(field("Type")).unwrap_or_default();
        let name = match field("Name") {
            Value::Null => PLACEHOLDER_MEASURE.to_string(),
            other => coerce::to_text(other),
        };
        let rater = match field("Rater") {
            Value::Null => DEFAULT_RATER.to_string(),
            other => coerce::to_text(other),
        };

        let (min, max) = match measure_type {
            MeasureType::Count => (0.0, None),
            MeasureType::Scale => {
                let min = coerce::to_number(field("Min")).unwrap_or(DEFAULT_SCALE_MIN);
                let max = coerce::to_number(field("Max")).unwrap_or(DEFAULT_SCALE_MAX);
                if max <= min {
                    (DEFAULT_SCALE_MIN, Some(DEFAULT_SCALE_MAX))
                } else {
                    (min, Some(max))
                }
            }
        };

        Self {
            name,
            measure_type,
            min,
            max,
            rater,
            description: coerce::to_text(field("Description")),
            color: coerce::to_text(field("Color")),
            select_measure: coerce::to_bool(field("SelectMeasure")),
            select_rater: coerce::to_bool(field("SelectRater")),
        }
    }

    /// Header tooltip shown for the measure's session column
    #[must_use]
    pub fn header_tooltip(&self) -> String {
        let max = self
            .max
            .map_or_else(|| "None".to_string(), |m| m.to_string());
        format!(
            "Rater: {}, {}, Min: {}, Max: {}",
            self.rater, self.measure_type, self.min, max
        )
    }
}

impl Default for Measure {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sanitize(value: Value) -> Measure {
        match value {
            Value::Object(map) => Measure::sanitize(&map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn placeholder_defaults() {
        let m = Measure::placeholder();
        assert!(m.is_placeholder());
        assert_eq!(m.measure_type, MeasureType::Scale);
        assert_eq!(m.min, 0.0);
        assert_eq!(m.max, Some(100.0));
        assert_eq!(m.rater, "Self");
    }

    #[test]
    fn measure_type_parse() {
        assert_eq!("Scale".parse::<MeasureType>(), Ok(MeasureType::Scale));
        assert_eq!(" count ".parse::<MeasureType>(), Ok(MeasureType::Count));
        assert!(matches!(
            "Ordinal".parse::<MeasureType>(),
            Err(ValidationError::UnknownMeasureType { .. })
        ));
    }

    #[test]
    fn count_is_unbounded_above() {
        let m = Measure::count("Panic attacks");
        assert!(m.accepts(0.0));
        assert!(m.accepts(1.0e12));
        assert!(!m.accepts(-1.0));
    }

    #[test]
    fn scale_bounds_inclusive() {
        let m = Measure::scale("Mood", 0.0, 10.0);
        assert!(m.accepts(0.0));
        assert!(m.accepts(10.0));
        assert!(!m.accepts(10.5));
        assert!(!m.accepts(f64::NAN));
    }

    #[test]
    fn sanitize_count_forces_range() {
        let m = sanitize(json!({"Name": "Visits", "Type": "Count", "Min": 4, "Max": 9}));
        assert_eq!(m.measure_type, MeasureType::Count);
        assert_eq!(m.min, 0.0);
        assert_eq!(m.max, None);
    }

    #[test]
    fn sanitize_scale_resets_inverted_range() {
        let m = sanitize(json!({"Name": "Mood", "Type": "Scale", "Min": "10", "Max": "2"}));
        assert_eq!((m.min, m.max), (0.0, Some(100.0)));

        let m = sanitize(json!({"Name": "Mood", "Min": "1.5", "Max": "7"}));
        assert_eq!((m.min, m.max), (1.5, Some(7.0)));
    }

    #[test]
    fn sanitize_coerces_flags_and_text() {
        let m = sanitize(json!({"Name": " Sleep ", "SelectMeasure": 1, "SelectRater": null}));
        assert_eq!(m.name, "Sleep");
        assert!(m.select_measure);
        assert!(!m.select_rater);
        assert_eq!(m.rater, "Self");
    }

    #[test]
    fn serializes_record_keys() {
        let value = serde_json::to_value(Measure::count("Visits")).unwrap();
        assert_eq!(value["Name"], json!("Visits"));
        assert_eq!(value["Type"], json!("Count"));
        assert_eq!(value["Max"], json!(null));
    }

    #[test]
    fn tooltip_lists_range() {
        let m = Measure::scale("Mood", 0.0, 10.0).with_rater("Therapist");
        assert_eq!(m.header_tooltip(), "Rater: Therapist, Scale, Min: 0, Max: 10");
    }
}
