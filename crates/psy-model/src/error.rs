//! Validation errors for record edits
//!
//! Every variant renders as the user-facing message shown next to the
//! rejected edit. Variants that describe a stale target (a row or column
//! that no longer exists) are structural and are reported by
//! [`ValidationError::is_structural`].

use chrono::NaiveDate;

use crate::measure::Bound;

/// User-correctable rejection of a proposed edit
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Name is empty or whitespace only
    #[error("Empty name not allowed. Please choose a different name.")]
    EmptyName,

    /// Name matches a placeholder name
    #[error("Name {name} not allowed. Please choose a different name.")]
    ReservedName { name: String },

    /// Name contains a single or double quote
    #[error("Quotation marks not allowed. Please choose a different name.")]
    QuoteInName { name: String },

    /// Name already used by another row or column
    #[error("Name {name} already in use. Please choose a different name.")]
    DuplicateName { name: String },

    /// Min or Max input is not a number
    #[error("Invalid input for {bound}. Please enter a valid number and use dots for decimals.")]
    InvalidNumber { bound: Bound },

    /// Min/Max edit on a Count measure
    #[error("Min and Max are fixed for measures of Type Count.")]
    FixedCountRange,

    /// Proposed Min is not below Max
    #[error("Min must be smaller than Max.")]
    MinNotBelowMax,

    /// Proposed Max is not above Min
    #[error("Max must be larger than Min.")]
    MaxNotAboveMin,

    /// Measure type text is neither Scale nor Count
    #[error("Type {value} not supported. Please choose Scale or Count.")]
    UnknownMeasureType { value: String },

    /// Session date does not parse as `YYYY-MM-DD`
    #[error("Invalid date format. Please use YYYY-MM-DD format.")]
    InvalidDate,

    /// Session date is not after the previous row's date
    #[error("Date must be after previous date ({previous}).")]
    DateNotAfterPrevious { previous: NaiveDate },

    /// Session date is not before the next row's date
    #[error("Date must be before next date ({next}).")]
    DateNotBeforeNext { next: NaiveDate },

    /// Measure cell input is empty or not a number
    #[error("Invalid value for {field}. Please enter a numerical value and use dots for decimals.")]
    InvalidCellValue { field: String },

    /// Measure cell value outside the measure's range
    #[error("{value} out of range {min} - {max} in {field}.")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Session row index no longer exists
    #[error("session row {index} not found")]
    RowNotFound { index: usize },

    /// Measure row index no longer exists
    #[error("measure row {index} not found")]
    MeasureNotFound { index: usize },

    /// Practice row index no longer exists
    #[error("practice row {index} not found")]
    PracticeNotFound { index: usize },

    /// Column is not part of the current column set
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    /// Reorder request is not a permutation of the current names
    #[error("order {order:?} is not a permutation of the current rows")]
    NotAPermutation { order: Vec<String> },
}

impl ValidationError {
    /// Check if the error stems from a stale target rather than bad input
    ///
    /// Structural errors are treated as no-ops by the editor: the caller's
    /// view is out of date and the committed snapshot is returned unchanged.
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::RowNotFound { .. }
                | Self::MeasureNotFound { .. }
                | Self::PracticeNotFound { .. }
                | Self::ColumnNotFound { .. }
                | Self::NotAPermutation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_alerts() {
        assert_eq!(
            ValidationError::EmptyName.to_string(),
            "Empty name not allowed. Please choose a different name."
        );
        assert_eq!(
            ValidationError::DuplicateName { name: "Mood".into() }.to_string(),
            "Name Mood already in use. Please choose a different name."
        );
        assert_eq!(
            ValidationError::InvalidNumber { bound: Bound::Max }.to_string(),
            "Invalid input for Max. Please enter a valid number and use dots for decimals."
        );
    }

    #[test]
    fn date_messages_reference_neighbor() {
        let previous = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = ValidationError::DateNotAfterPrevious { previous };
        assert_eq!(err.to_string(), "Date must be after previous date (2024-01-01).");
    }

    #[test]
    fn out_of_range_message() {
        let err = ValidationError::OutOfRange {
            field: "Mood".into(),
            value: 11.5,
            min: 0.0,
            max: 10.0,
        };
        assert_eq!(err.to_string(), "11.5 out of range 0 - 10 in Mood.");
    }

    #[test]
    fn structural_classification() {
        assert!(ValidationError::RowNotFound { index: 3 }.is_structural());
        assert!(ValidationError::ColumnNotFound { name: "x".into() }.is_structural());
        assert!(!ValidationError::EmptyName.is_structural());
        assert!(!ValidationError::InvalidDate.is_structural());
    }
}
