//! Session column set
//!
//! The ledger has no notion of its own columns. They are derived from the
//! registries: the two fixed fields, then every active measure, then every
//! active practice.

use psy_model::{ColumnKind, Measure, Practice, SESSION_DATE, SESSION_NUMBER};
use serde::Serialize;

/// Dynamic columns derived from the active registry rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    measures: Vec<String>,
    practices: Vec<String>,
}

impl ColumnSet {
    /// Column set from active measure and practice names
    #[must_use]
    pub fn new(measures: Vec<String>, practices: Vec<String>) -> Self {
        Self {
            measures,
            practices,
        }
    }

    /// Column set from registry rows, skipping placeholders
    #[must_use]
    pub fn from_rows<'a>(
        measures: impl IntoIterator<Item = &'a Measure>,
        practices: impl IntoIterator<Item = &'a Practice>,
    ) -> Self {
        Self {
            measures: measures
                .into_iter()
                .filter(|m| !m.is_placeholder())
                .map(|m| m.name.clone())
                .collect(),
            practices: practices
                .into_iter()
                .filter(|p| !p.is_placeholder())
                .map(|p| p.name.clone())
                .collect(),
        }
    }

    /// Active measure columns in display order
    #[inline]
    #[must_use]
    pub fn measures(&self) -> &[String] {
        &self.measures
    }

    /// Active practice columns in display order
    #[inline]
    #[must_use]
    pub fn practices(&self) -> &[String] {
        &self.practices
    }

    /// Kind of the dynamic column `name`, if it is part of the set
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        if self.measures.iter().any(|m| m == name) {
            Some(ColumnKind::Measure)
        } else if self.practices.iter().any(|p| p == name) {
            Some(ColumnKind::Practice)
        } else {
            None
        }
    }

    /// Dynamic columns with their kind, measures first
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        let measures = self.measures.iter().map(|m| (m.as_str(), ColumnKind::Measure));
        let practices = self.practices.iter().map(|p| (p.as_str(), ColumnKind::Practice));
        measures.chain(practices)
    }
}

/// Names of the fixed session fields
#[must_use]
pub fn fixed_columns() -> Vec<String> {
    vec![SESSION_NUMBER.to_string(), SESSION_DATE.to_string()]
}

/// Role of a column in the session grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Read-only position number
    SessionNumber,
    /// Editable ISO date
    SessionDate,
    /// Numeric measure value
    Measure,
    /// Practice checkbox
    Practice,
}

/// Display definition of one session column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Row key
    pub field: String,

    /// Header text
    pub header_name: String,

    /// What the column holds
    pub role: ColumnRole,

    /// Whether cells accept direct text edits
    pub editable: bool,

    /// Range and rater summary, measures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_tooltip: Option<String>,
}

impl ColumnSpec {
    fn fixed(field: &str, header_name: &str, role: ColumnRole, editable: bool) -> Self {
        Self {
            field: field.to_string(),
            header_name: header_name.to_string(),
            role,
            editable,
            header_tooltip: None,
        }
    }
}

/// Column definitions for the session grid
///
/// Session number (read-only), date, one numeric column per active measure
/// with its tooltip, then one checkbox column per active practice.
#[must_use]
pub fn columns_for<'a>(
    measures: impl IntoIterator<Item = &'a Measure>,
    practices: impl IntoIterator<Item = &'a Practice>,
) -> Vec<ColumnSpec> {
    let mut specs = vec![
        ColumnSpec::fixed(SESSION_NUMBER, "Session", ColumnRole::SessionNumber, false),
        ColumnSpec::fixed(SESSION_DATE, "Date", ColumnRole::SessionDate, true),
    ];

    specs.extend(
        measures
            .into_iter()
            .filter(|m| !m.is_placeholder())
            .map(|m| ColumnSpec {
                field: m.name.clone(),
                header_name: m.name.clone(),
                role: ColumnRole::Measure,
                editable: true,
                header_tooltip: Some(m.header_tooltip()),
            }),
    );

    // practice cells toggle on click, never through the text editor
    specs.extend(
        practices
            .into_iter()
            .filter(|p| !p.is_placeholder())
            .map(|p| ColumnSpec {
                field: p.name.clone(),
                header_name: p.name.clone(),
                role: ColumnRole::Practice,
                editable: false,
                header_tooltip: None,
            }),
    );

    specs
}
