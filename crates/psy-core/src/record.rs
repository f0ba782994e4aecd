//! Record document
//!
//! A record bundles the client profile, both registries and the session
//! ledger. The persisted form is a JSON object with four arrays:
//!
//! ```json
//! {"client": [{...}], "measures": [...], "sessions": [...], "practices": [...]}
//! ```
//!
//! Loading is lenient about field values (every field goes through
//! [`psy_model::coerce`]) but strict about the document's shape.

use chrono::NaiveDate;
use psy_ledger::{columns_for, fixed_columns, ColumnSet, ColumnSpec, SessionLedger};
use psy_model::{ClientInfo, Measure, Palette, Practice};
use psy_registry::{demote_invalid_names, MeasureRegistry, PracticeRegistry};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::RecordError;

/// One client's complete record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Client profile
    pub client: ClientInfo,
    pub measures: MeasureRegistry,
    pub practices: PracticeRegistry,
    /// Session rows keyed by the active registry names
    pub sessions: SessionLedger,
}

#[derive(Serialize)]
struct Document<'a> {
    client: [&'a ClientInfo; 1],
    measures: &'a MeasureRegistry,
    sessions: &'a SessionLedger,
    practices: &'a PracticeRegistry,
}

impl Record {
    /// Empty record: default client, one placeholder per registry, one
    /// session dated `today`
    #[must_use]
    pub fn new(palette: Palette, today: NaiveDate) -> Self {
        let measures = MeasureRegistry::new(palette);
        let practices = PracticeRegistry::new();
        let sessions = SessionLedger::new(&ColumnSet::default(), today);
        Self {
            client: ClientInfo::default(),
            measures,
            practices,
            sessions,
        }
    }

    /// Parse and sanitize a JSON record document
    ///
    /// # Errors
    /// [`RecordError::Json`] for malformed JSON, [`RecordError::Shape`] for
    /// a non-object document or a non-array section.
    pub fn from_json_str(source: &str, palette: Palette, today: NaiveDate) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_value(&value, palette, today)
    }

    /// Sanitize a record document
    ///
    /// Missing, `null` or empty sections take their defaults. Rows whose
    /// name a rename would reject become placeholders, so no two columns
    /// share a key. Session values outside their measure's range are
    /// cleared.
    ///
    /// # Errors
    /// [`RecordError::Shape`] for a non-object document or a non-array
    /// section.
    pub fn from_value(value: &Value, palette: Palette, today: NaiveDate) -> Result<Self, RecordError> {
        let Value::Object(document) = value else {
            return Err(RecordError::Shape {
                section: "document",
                expected: "an object",
            });
        };

        let client = section(document, "client")?
            .iter()
            .find_map(Value::as_object)
            .map(ClientInfo::sanitize)
            .unwrap_or_default();

        // measures claim their names first, then practices
        let measure_rows: Vec<Measure> = objects(section(document, "measures")?, "measures")
            .map(Measure::sanitize)
            .collect();
        let measures = MeasureRegistry::from_rows(
            demote_invalid_names(measure_rows, &fixed_columns()),
            palette,
        );
        let practice_rows: Vec<Practice> = objects(section(document, "practices")?, "practices")
            .map(Practice::sanitize)
            .collect();
        let taken = [measures.active_names(), fixed_columns()].concat();
        let practices = PracticeRegistry::from_rows(demote_invalid_names(practice_rows, &taken));

        let columns = ColumnSet::from_rows(&measures, &practices);
        let mut sessions = SessionLedger::sanitize(section(document, "sessions")?, &columns, today);
        for measure in measures.iter().filter(|m| !m.is_placeholder()) {
            let (next, cleared) = sessions.purge_out_of_range(&measure.name, measure.min, measure.upper_bound());
            if cleared > 0 {
                tracing::warn!(measure = %measure.name, cleared, "cleared out-of-range values on load");
            }
            sessions = next;
        }

        tracing::debug!(
            measures = measures.len(),
            practices = practices.len(),
            sessions = sessions.len(),
            "record loaded"
        );
        Ok(Self {
            client,
            measures,
            practices,
            sessions,
        })
    }

    /// Render the persisted JSON form
    ///
    /// # Errors
    /// [`RecordError::Json`] if serialization fails.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, RecordError> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    /// Check if the record equals a fresh one created on `today`
    #[must_use]
    pub fn is_default(&self, today: NaiveDate) -> bool {
        *self == Self::new(self.measures.palette().clone(), today)
    }

    /// Dynamic session columns of the current registries
    #[must_use]
    pub fn columns(&self) -> ColumnSet {
        ColumnSet::from_rows(&self.measures, &self.practices)
    }

    /// Display definitions of the session grid
    #[must_use]
    pub fn column_specs(&self) -> Vec<ColumnSpec> {
        columns_for(&self.measures, &self.practices)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Document {
            client: [&self.client],
            measures: &self.measures,
            sessions: &self.sessions,
            practices: &self.practices,
        }
        .serialize(serializer)
    }
}

fn section<'a>(document: &'a Map<String, Value>, name: &'static str) -> Result<&'a [Value], RecordError> {
    match document.get(name) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(RecordError::Shape {
            section: name,
            expected: "an array",
        }),
    }
}

fn objects<'a>(items: &'a [Value], name: &'static str) -> impl Iterator<Item = &'a Map<String, Value>> {
    items.iter().filter_map(move |item| {
        let object = item.as_object();
        if object.is_none() {
            tracing::warn!(section = name, "skipping non-object entry");
        }
        object
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use psy_model::CellValue;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn load(value: &Value) -> Result<Record, RecordError> {
        Record::from_value(value, Palette::default(), today())
    }

    #[test]
    fn new_record_is_default() {
        let record = Record::new(Palette::default(), today());
        assert!(record.is_default(today()));
        assert_eq!(record.sessions.len(), 1);
        assert!(record.columns().measures().is_empty());
    }

    #[test]
    fn missing_sections_default() {
        let record = load(&json!({})).unwrap();
        assert!(record.is_default(today()));

        let record = load(&json!({"measures": [], "sessions": null})).unwrap();
        assert!(record.is_default(today()));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(load(&json!([])).unwrap_err().is_shape());
        assert!(load(&json!({"measures": {}})).unwrap_err().is_shape());
        assert!(load(&json!({"sessions": "none"})).unwrap_err().is_shape());
    }

    #[test]
    fn malformed_json() {
        let err = Record::from_json_str("{\"client\":", Palette::default(), today()).unwrap_err();
        assert!(matches!(err, RecordError::Json(_)));
    }

    #[test]
    fn sanitizes_sections() {
        let record = load(&json!({
            "client": [{"ID": "C-1", "Age": "41"}],
            "measures": [
                {"Name": "Mood", "Type": "Scale", "Min": "0", "Max": "10", "Rater": "Self"},
                {"Name": "Panic", "Type": "Count", "Min": 5, "Max": 9}
            ],
            "practices": [{"Name": "Exposure"}],
            "sessions": [
                {"session_number": 1, "session_date": "2024-01-01", "Mood": 12, "Panic": "3", "Exposure": true}
            ]
        }))
        .unwrap();

        assert_eq!(record.client.age, Some(41));
        assert_eq!(record.measures.find("Panic").unwrap().max, None);

        let session = record.sessions.get(0).unwrap();
        assert_eq!(session.measure("Mood"), None);
        assert_eq!(session.measure("Panic"), Some(3.0));
        assert_eq!(session.get("Exposure"), Some(&CellValue::Practice(true)));
    }

    #[test]
    fn saves_persisted_shape() {
        let record = Record::new(Palette::default(), today());
        let value: Value = serde_json::from_str(&record.to_json_string(false).unwrap()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["client", "measures", "sessions", "practices"]);
        assert_eq!(value["client"].as_array().unwrap().len(), 1);
        assert_eq!(value["sessions"][0]["session_date"], json!("2024-06-01"));
    }
}
