//! Session rows
//!
//! A session is a fixed pair of fields (number and date) plus an ordered
//! map of dynamic columns, one per active measure or practice. The map order
//! is display state only.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key of the fixed session number column
pub const SESSION_NUMBER: &str = "session_number";

/// Key of the fixed session date column
pub const SESSION_DATE: &str = "session_date";

/// Which registry a dynamic column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Numeric measure column
    Measure,
    /// Boolean practice column
    Practice,
}

impl ColumnKind {
    /// Value a newly introduced column starts with
    #[inline]
    #[must_use]
    pub fn default_value(self) -> CellValue {
        match self {
            Self::Measure => CellValue::Measure(None),
            Self::Practice => CellValue::Practice(false),
        }
    }
}

/// Value stored in a dynamic session column
///
/// Serialized untagged: a practice is a JSON bool, a measure a number or
/// `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Practice applied in the session
    Practice(bool),
    /// Measure observation, `None` when not recorded
    Measure(Option<f64>),
}

impl CellValue {
    /// Measure value, if this is a recorded measure cell
    #[inline]
    #[must_use]
    pub fn as_measure(&self) -> Option<f64> {
        match self {
            Self::Measure(v) => *v,
            Self::Practice(_) => None,
        }
    }

    /// Practice flag, if this is a practice cell
    #[inline]
    #[must_use]
    pub fn as_practice(&self) -> Option<bool> {
        match self {
            Self::Practice(b) => Some(*b),
            Self::Measure(_) => None,
        }
    }

    /// Kind of column this value belongs in
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Measure(_) => ColumnKind::Measure,
            Self::Practice(_) => ColumnKind::Practice,
        }
    }
}

/// One observation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// 1-based position in the ledger
    pub session_number: u32,

    /// Calendar date, strictly increasing along the ledger
    pub session_date: NaiveDate,

    /// Dynamic measure and practice columns
    #[serde(flatten)]
    pub values: IndexMap<String, CellValue>,
}

impl Session {
    /// Session without dynamic columns
    #[must_use]
    pub fn new(session_number: u32, session_date: NaiveDate) -> Self {
        Self {
            session_number,
            session_date,
            values: IndexMap::new(),
        }
    }

    /// With a column value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, column: impl Into<String>, value: CellValue) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    /// With a measure value
    #[inline]
    #[must_use]
    pub fn with_measure(self, column: impl Into<String>, value: Option<f64>) -> Self {
        self.with_value(column, CellValue::Measure(value))
    }

    /// With a practice flag
    #[inline]
    #[must_use]
    pub fn with_practice(self, column: impl Into<String>, applied: bool) -> Self {
        self.with_value(column, CellValue::Practice(applied))
    }

    /// Get a column value
    #[inline]
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }

    /// Get a measure value (`None` when absent or not recorded)
    #[inline]
    #[must_use]
    pub fn measure(&self, column: &str) -> Option<f64> {
        self.values.get(column).and_then(CellValue::as_measure)
    }

    /// Column names in display order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
