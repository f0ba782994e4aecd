//! Edit requests
//!
//! One variant per user edit, tagged by `kind`:
//!
//! ```json
//! {"kind": "set_min_max", "index": 0, "bound": "Max", "value": "4"}
//! ```
//!
//! Proposed values are raw JSON and go through field coercion. Requests
//! never carry the caller's old value: the response always returns the
//! authoritative snapshot.

use psy_model::{Bound, ClientField, Session};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A proposed edit to the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditRequest {
    /// Append a placeholder measure
    AddMeasure,

    /// Rename the measure at `index`
    RenameMeasure {
        index: usize,
        #[serde(default)]
        value: Value,
    },

    /// Change the type of the measure at `index`
    SetMeasureType {
        index: usize,
        #[serde(default)]
        value: Value,
    },

    /// Change Min or Max of the measure at `index`
    SetMinMax {
        index: usize,
        bound: Bound,
        #[serde(default)]
        value: Value,
    },

    /// Change the rater of the measure at `index`
    SetRater {
        index: usize,
        #[serde(default)]
        value: Value,
    },

    SetMeasureDescription {
        index: usize,
        #[serde(default)]
        value: Value,
    },

    /// Delete the named measures and their session columns
    DeleteMeasures { names: Vec<String> },

    /// New measure order, a permutation of all current names
    ReorderMeasures { order: Vec<String> },

    /// Dashboard switch for one measure
    SelectMeasure { name: String, selected: bool },

    /// Dashboard switch for every measure of a rater
    SelectRater { rater: String, selected: bool },

    /// Append a placeholder practice
    AddPractice,

    RenamePractice {
        index: usize,
        #[serde(default)]
        value: Value,
    },

    SetPracticeDescription {
        index: usize,
        #[serde(default)]
        value: Value,
    },

    DeletePractices { names: Vec<String> },

    ReorderPractices { order: Vec<String> },

    /// Append a session after the last one
    AddSession,

    /// Delete the sessions equal to the selected rows
    DeleteSessions { selected: Vec<Session> },

    /// Change the date of the session at `row`
    EditDate {
        row: usize,
        #[serde(default)]
        value: Value,
    },

    /// Record a measure value in the session at `row`
    EditMeasureCell {
        row: usize,
        field: String,
        #[serde(default)]
        value: Value,
    },

    /// Set a practice flag in the session at `row`
    EditPracticeCell {
        row: usize,
        field: String,
        #[serde(default)]
        value: Value,
    },

    /// Change one client profile field
    EditClient {
        field: ClientField,
        #[serde(default)]
        value: Value,
    },

    /// Replace the record with an empty one
    NewRecord,
}

impl EditRequest {
    /// Request kind as it appears on the wire
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddMeasure => "add_measure",
            Self::RenameMeasure { .. } => "rename_measure",
            Self::SetMeasureType { .. } => "set_measure_type",
            Self::SetMinMax { .. } => "set_min_max",
            Self::SetRater { .. } => "set_rater",
            Self::SetMeasureDescription { .. } => "set_measure_description",
            Self::DeleteMeasures { .. } => "delete_measures",
            Self::ReorderMeasures { .. } => "reorder_measures",
            Self::SelectMeasure { .. } => "select_measure",
            Self::SelectRater { .. } => "select_rater",
            Self::AddPractice => "add_practice",
            Self::RenamePractice { .. } => "rename_practice",
            Self::SetPracticeDescription { .. } => "set_practice_description",
            Self::DeletePractices { .. } => "delete_practices",
            Self::ReorderPractices { .. } => "reorder_practices",
            Self::AddSession => "add_session",
            Self::DeleteSessions { .. } => "delete_sessions",
            Self::EditDate { .. } => "edit_date",
            Self::EditMeasureCell { .. } => "edit_measure_cell",
            Self::EditPracticeCell { .. } => "edit_practice_cell",
            Self::EditClient { .. } => "edit_client",
            Self::NewRecord => "new_record",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_tagged() {
        let request: EditRequest =
            serde_json::from_value(json!({"kind": "set_min_max", "index": 0, "bound": "Max", "value": "4"}))
                .unwrap();
        assert_eq!(
            request,
            EditRequest::SetMinMax {
                index: 0,
                bound: Bound::Max,
                value: json!("4"),
            }
        );
        assert_eq!(request.label(), "set_min_max");
    }

    #[test]
    fn missing_value_is_null() {
        let request: EditRequest =
            serde_json::from_value(json!({"kind": "edit_measure_cell", "row": 2, "field": "Mood"})).unwrap();
        assert!(matches!(
            request,
            EditRequest::EditMeasureCell { value: Value::Null, .. }
        ));
    }

    #[test]
    fn unit_variants() {
        let request: EditRequest = serde_json::from_value(json!({"kind": "new_record"})).unwrap();
        assert_eq!(request, EditRequest::NewRecord);
        assert_eq!(
            serde_json::to_value(EditRequest::AddSession).unwrap(),
            json!({"kind": "add_session"})
        );
    }

    #[test]
    fn label_matches_wire_tag() {
        let requests = [
            EditRequest::AddMeasure,
            EditRequest::DeleteMeasures { names: vec![] },
            EditRequest::EditClient {
                field: ClientField::Id,
                value: Value::Null,
            },
        ];
        for request in requests {
            let value = serde_json::to_value(&request).unwrap();
            assert_eq!(value["kind"], json!(request.label()));
        }
    }
}
