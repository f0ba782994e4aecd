//! Session ledger
//!
//! Ordered list of session rows. Two invariants hold for every snapshot the
//! ledger hands out: `session_number` is the 1-based position of the row,
//! and `session_date` strictly increases along the list. Measure values are
//! range-checked on edit and purged when a measure's range narrows.

use chrono::{Days, NaiveDate};
use im::Vector;
use indexmap::IndexMap;
use psy_model::{
    coerce, Cascade, CellValue, ColumnKind, Measure, Session, ValidationError, SESSION_DATE,
    SESSION_NUMBER,
};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::columns::ColumnSet;

/// What replaying a cascade did to the stored values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeEffect {
    /// Measure values nulled by a range purge
    pub cleared: usize,
}

/// Ordered session rows
#[derive(Debug, Clone, PartialEq)]
pub struct SessionLedger {
    rows: Vector<Session>,
}

impl SessionLedger {
    /// Ledger holding one default session dated `today`
    #[must_use]
    pub fn new(columns: &ColumnSet, today: NaiveDate) -> Self {
        Self {
            rows: Vector::new(),
        }
        .add_session(columns, today)
    }

    /// Ledger from rows that already satisfy the numbering and date order
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = Session>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Build a ledger from loosely-typed rows
    ///
    /// Rows are renumbered by position; dates fall back to `today`; only
    /// columns of `columns` are kept, coerced to their kind. Non-object rows
    /// are skipped. An empty result holds one default session.
    #[must_use]
    pub fn sanitize(raw: &[Value], columns: &ColumnSet, today: NaiveDate) -> Self {
        let mut rows = Vector::new();
        for entry in raw {
            let Value::Object(fields) = entry else {
                tracing::warn!(row = %entry, "skipping non-object session row");
                continue;
            };
            let field = |key: &str| fields.get(key).unwrap_or(&Value::Null);

            let number = position_number(rows.len());
            let stored = coerce::to_int(field(SESSION_NUMBER), 0);
            if stored != i64::from(number) {
                tracing::debug!(stored, number, "renumbering session");
            }

            let mut session = Session::new(number, coerce::to_date(field(SESSION_DATE), today));
            for (name, kind) in columns.iter() {
                let value = match kind {
                    ColumnKind::Measure => CellValue::Measure(coerce::to_number(field(name))),
                    ColumnKind::Practice => CellValue::Practice(coerce::to_bool(field(name))),
                };
                session.values.insert(name.to_string(), value);
            }
            rows.push_back(session);
        }

        if rows.is_empty() {
            return Self::new(columns, today);
        }

        let ledger = Self { rows };
        if !ledger.dates_increasing() {
            tracing::warn!("loaded session dates are not strictly increasing");
        }
        ledger
    }

    /// Rows in order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.rows.iter()
    }

    /// Row at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Session> {
        self.rows.get(index)
    }

    /// Number of sessions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the ledger has no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check that dates strictly increase along the rows
    #[must_use]
    pub fn dates_increasing(&self) -> bool {
        self.rows
            .iter()
            .zip(self.rows.iter().skip(1))
            .all(|(a, b)| a.session_date < b.session_date)
    }

    /// Append a session after the last one
    ///
    /// The new row is dated one day after the last row, or `today` for the
    /// first row. Measure columns start as `null`, practices as `false`.
    /// A last row on the final representable date leaves the ledger as is.
    #[must_use]
    pub fn add_session(&self, columns: &ColumnSet, today: NaiveDate) -> Self {
        let date = match self.rows.last() {
            None => today,
            Some(last) => match last.session_date.checked_add_days(Days::new(1)) {
                Some(date) => date,
                None => {
                    tracing::warn!(last = %last.session_date, "no date after the last session");
                    return self.clone();
                }
            },
        };

        let mut session = Session::new(position_number(self.rows.len()), date);
        for (name, kind) in columns.iter() {
            session.values.insert(name.to_string(), kind.default_value());
        }

        let mut rows = self.rows.clone();
        rows.push_back(session);
        Self { rows }
    }

    /// Remove every row equal to one of `selected`
    ///
    /// Remaining rows are renumbered. Removing every row leaves one default
    /// session dated `today`.
    #[must_use]
    pub fn delete_sessions(&self, selected: &[Session], columns: &ColumnSet, today: NaiveDate) -> Self {
        let mut rows = self.rows.clone();
        rows.retain(|row| !selected.contains(row));
        if rows.len() == self.rows.len() {
            return self.clone();
        }
        if rows.is_empty() {
            return Self::new(columns, today);
        }

        for (position, row) in rows.iter_mut().enumerate() {
            row.session_number = position_number(position);
        }
        Self { rows }
    }

    /// Change the date of the row at `row`
    ///
    /// # Errors
    /// [`ValidationError::InvalidDate`] when the input is not `YYYY-MM-DD`,
    /// or a neighbor error when the date would break the strict order.
    pub fn edit_date(&self, row: usize, value: &Value) -> Result<Self, ValidationError> {
        let mut session = self.row(row)?.clone();
        let date = coerce::parse_iso_date(value).ok_or(ValidationError::InvalidDate)?;

        if let Some(previous) = row.checked_sub(1).and_then(|i| self.rows.get(i)) {
            if date <= previous.session_date {
                return Err(ValidationError::DateNotAfterPrevious {
                    previous: previous.session_date,
                });
            }
        }
        if let Some(next) = self.rows.get(row + 1) {
            if date >= next.session_date {
                return Err(ValidationError::DateNotBeforeNext {
                    next: next.session_date,
                });
            }
        }

        session.session_date = date;
        Ok(self.with_row(row, session))
    }

    /// Record a value for `measure` in the row at `row`
    ///
    /// # Errors
    /// [`ValidationError::InvalidCellValue`] for empty or non-numeric input,
    /// [`ValidationError::OutOfRange`] outside the measure's range.
    pub fn edit_measure_cell(
        &self,
        row: usize,
        measure: &Measure,
        value: &Value,
    ) -> Result<Self, ValidationError> {
        let mut session = self.row(row)?.clone();
        let number = coerce::to_number(value).ok_or_else(|| ValidationError::InvalidCellValue {
            field: measure.name.clone(),
        })?;

        if !measure.accepts(number) {
            return Err(ValidationError::OutOfRange {
                field: measure.name.clone(),
                value: number,
                min: measure.min,
                max: measure.upper_bound(),
            });
        }

        session
            .values
            .insert(measure.name.clone(), CellValue::Measure(Some(number)));
        Ok(self.with_row(row, session))
    }

    /// Set the practice flag `field` in the row at `row`
    ///
    /// # Errors
    /// [`ValidationError::RowNotFound`] for a stale row index.
    pub fn edit_practice_cell(&self, row: usize, field: &str, value: &Value) -> Result<Self, ValidationError> {
        let mut session = self.row(row)?.clone();
        session
            .values
            .insert(field.to_string(), CellValue::Practice(coerce::to_bool(value)));
        Ok(self.with_row(row, session))
    }

    /// Move the values of column `old` to `new`
    ///
    /// The column keeps its position. Rows without `old` get `new`
    /// initialized with the kind's default.
    #[must_use]
    pub fn rename_column(&self, old: &str, new: &str, kind: ColumnKind) -> Self {
        self.map_rows(|session| {
            let mut values = IndexMap::with_capacity(session.values.len() + 1);
            let mut moved = false;
            for (key, value) in &session.values {
                if key == old {
                    values.insert(new.to_string(), *value);
                    moved = true;
                } else if key != new {
                    values.insert(key.clone(), *value);
                }
            }
            if !moved {
                let value = session.values.get(new).copied().unwrap_or(kind.default_value());
                values.insert(new.to_string(), value);
            }
            session.values = values;
        })
    }

    /// Remove the named columns from every row
    #[must_use]
    pub fn drop_columns(&self, names: &[String]) -> Self {
        if names.is_empty() {
            return self.clone();
        }
        self.map_rows(|session| {
            session.values.retain(|key, _| !names.contains(key));
        })
    }

    /// Re-key the columns of `kind` into `order`
    ///
    /// Columns not named in `order` stay in front in their current order;
    /// the `order` columns follow, keeping their values. A named column a
    /// row lacks is initialized with the kind's default.
    #[must_use]
    pub fn reorder_columns(&self, order: &[String], kind: ColumnKind) -> Self {
        self.map_rows(|session| {
            let mut values: IndexMap<String, CellValue> = session
                .values
                .iter()
                .filter(|(key, _)| !order.contains(key))
                .map(|(key, value)| (key.clone(), *value))
                .collect();
            for name in order {
                let value = session
                    .values
                    .get(name)
                    .copied()
                    .unwrap_or(kind.default_value());
                values.insert(name.clone(), value);
            }
            session.values = values;
        })
    }

    /// Null every value of `name` outside `[min, max]`
    ///
    /// Returns the new ledger and how many values were cleared.
    #[must_use]
    pub fn purge_out_of_range(&self, name: &str, min: f64, max: f64) -> (Self, usize) {
        let mut cleared = 0;
        let next = self.map_rows(|session| {
            if let Some(cell) = session.values.get_mut(name) {
                if let CellValue::Measure(Some(v)) = *cell {
                    if !(min..=max).contains(&v) {
                        *cell = CellValue::Measure(None);
                        cleared += 1;
                    }
                }
            }
        });
        if cleared == 0 {
            return (self.clone(), 0);
        }
        (next, cleared)
    }

    /// Replay one cascade command
    #[must_use]
    pub fn apply(&self, cascade: &Cascade) -> (Self, CascadeEffect) {
        tracing::debug!(op = cascade.label(), "replaying cascade");
        match cascade {
            Cascade::RenameColumn { old, new, kind } => {
                (self.rename_column(old, new, *kind), CascadeEffect::default())
            }
            Cascade::DropColumns { names } => (self.drop_columns(names), CascadeEffect::default()),
            Cascade::ReorderColumns { order, kind } => {
                (self.reorder_columns(order, *kind), CascadeEffect::default())
            }
            Cascade::PurgeOutOfRange { name, min, max } => {
                let (next, cleared) = self.purge_out_of_range(name, *min, *max);
                (next, CascadeEffect { cleared })
            }
        }
    }

    fn row(&self, index: usize) -> Result<&Session, ValidationError> {
        self.rows.get(index).ok_or(ValidationError::RowNotFound { index })
    }

    fn with_row(&self, index: usize, session: Session) -> Self {
        Self {
            rows: self.rows.update(index, session),
        }
    }

    fn map_rows(&self, mut f: impl FnMut(&mut Session)) -> Self {
        let mut rows = self.rows.clone();
        for session in rows.iter_mut() {
            f(session);
        }
        Self { rows }
    }
}

impl Serialize for SessionLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a SessionLedger {
    type Item = &'a Session;
    type IntoIter = im::vector::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn position_number(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn columns() -> ColumnSet {
        ColumnSet::new(vec!["Mood".into()], vec!["Exposure".into()])
    }

    fn ledger(dates: &[NaiveDate]) -> SessionLedger {
        SessionLedger::from_rows(dates.iter().enumerate().map(|(i, d)| {
            Session::new(position_number(i), *d)
                .with_measure("Mood", Some(5.0))
                .with_practice("Exposure", false)
        }))
    }

    fn numbers(ledger: &SessionLedger) -> Vec<u32> {
        ledger.iter().map(|s| s.session_number).collect()
    }

    #[test]
    fn new_ledger_has_default_session() {
        let ledger = SessionLedger::new(&columns(), day(2024, 3, 1));
        assert_eq!(ledger.len(), 1);
        let first = ledger.get(0).unwrap();
        assert_eq!(first.session_number, 1);
        assert_eq!(first.session_date, day(2024, 3, 1));
        assert_eq!(first.get("Mood"), Some(&CellValue::Measure(None)));
        assert_eq!(first.get("Exposure"), Some(&CellValue::Practice(false)));
    }

    #[test]
    fn add_session_follows_last_date() {
        let ledger = ledger(&[day(2024, 1, 1), day(2024, 1, 5)]);
        let next = ledger.add_session(&columns(), day(2030, 1, 1));
        let added = next.get(2).unwrap();
        assert_eq!(added.session_number, 3);
        assert_eq!(added.session_date, day(2024, 1, 6));
        assert_eq!(added.measure("Mood"), None);
    }

    #[test]
    fn add_session_after_last_date_is_noop() {
        let ledger = ledger(&[day(2024, 1, 1), NaiveDate::MAX]);
        let next = ledger.add_session(&columns(), day(2024, 6, 1));
        assert_eq!(next, ledger);
        assert!(next.dates_increasing());
    }

    #[test]
    fn delete_renumbers() {
        let ledger = ledger(&[day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)]);
        let selected = vec![ledger.get(1).unwrap().clone()];
        let next = ledger.delete_sessions(&selected, &columns(), day(2030, 1, 1));
        assert_eq!(numbers(&next), vec![1, 2]);
        assert_eq!(next.get(1).unwrap().session_date, day(2024, 1, 3));
    }

    #[test]
    fn delete_all_leaves_default_session() {
        let ledger = ledger(&[day(2024, 1, 1), day(2024, 1, 2)]);
        let selected: Vec<Session> = ledger.iter().cloned().collect();
        let next = ledger.delete_sessions(&selected, &columns(), day(2030, 1, 1));
        assert_eq!(next.len(), 1);
        assert_eq!(next.get(0).unwrap().session_date, day(2030, 1, 1));
        assert_eq!(next.get(0).unwrap().session_number, 1);
    }

    #[test]
    fn edit_date_checks_neighbors() {
        let ledger = ledger(&[day(2024, 1, 1), day(2024, 1, 5), day(2024, 1, 9)]);

        assert_eq!(
            ledger.edit_date(1, &json!("2024-01-01")),
            Err(ValidationError::DateNotAfterPrevious {
                previous: day(2024, 1, 1)
            })
        );
        assert_eq!(
            ledger.edit_date(1, &json!("2024-01-09")),
            Err(ValidationError::DateNotBeforeNext { next: day(2024, 1, 9) })
        );
        assert_eq!(
            ledger.edit_date(1, &json!("05/01/2024")),
            Err(ValidationError::InvalidDate)
        );

        let next = ledger.edit_date(1, &json!("2024-01-07")).unwrap();
        assert_eq!(next.get(1).unwrap().session_date, day(2024, 1, 7));
    }

    #[test]
    fn edit_date_stale_row() {
        let ledger = ledger(&[day(2024, 1, 1)]);
        let err = ledger.edit_date(3, &json!("2024-02-01")).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn measure_cell_range_checked() {
        let ledger = ledger(&[day(2024, 1, 1)]);
        let mood = Measure::scale("Mood", 0.0, 10.0);

        let err = ledger.edit_measure_cell(0, &mood, &json!(12)).unwrap_err();
        assert_eq!(err.to_string(), "12 out of range 0 - 10 in Mood.");

        let err = ledger.edit_measure_cell(0, &mood, &json!("")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidCellValue { field: "Mood".into() });

        let next = ledger.edit_measure_cell(0, &mood, &json!("7.5")).unwrap();
        assert_eq!(next.get(0).unwrap().measure("Mood"), Some(7.5));
    }

    #[test]
    fn count_cell_is_unbounded_above() {
        let ledger = ledger(&[day(2024, 1, 1)]);
        let panic = Measure::count("Panic");
        let next = ledger.edit_measure_cell(0, &panic, &json!(1e6)).unwrap();
        assert_eq!(next.get(0).unwrap().measure("Panic"), Some(1e6));

        let err = ledger.edit_measure_cell(0, &panic, &json!(-1)).unwrap_err();
        assert_eq!(err.to_string(), "-1 out of range 0 - inf in Panic.");
    }

    #[test]
    fn practice_cell_coerces() {
        let ledger = ledger(&[day(2024, 1, 1)]);
        let next = ledger.edit_practice_cell(0, "Exposure", &json!(1)).unwrap();
        assert_eq!(next.get(0).unwrap().get("Exposure"), Some(&CellValue::Practice(true)));
    }

    #[test]
    fn rename_keeps_position_and_values() {
        let ledger = ledger(&[day(2024, 1, 1)]);
        let next = ledger.rename_column("Mood", "Affect", ColumnKind::Measure);
        let row = next.get(0).unwrap();
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Affect", "Exposure"]);
        assert_eq!(row.measure("Affect"), Some(5.0));
    }

    #[test]
    fn rename_from_placeholder_initializes() {
        let ledger = ledger(&[day(2024, 1, 1)]);
        let next = ledger.rename_column("New Practice", "Homework", ColumnKind::Practice);
        assert_eq!(
            next.get(0).unwrap().get("Homework"),
            Some(&CellValue::Practice(false))
        );
    }

    #[test]
    fn reorder_appends_named_columns() {
        let ledger = SessionLedger::from_rows([Session::new(1, day(2024, 1, 1))
            .with_measure("A", Some(1.0))
            .with_measure("B", Some(2.0))
            .with_practice("P", true)]);
        let next = ledger.reorder_columns(&["B".into(), "A".into()], ColumnKind::Measure);
        let row = next.get(0).unwrap();
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["P", "B", "A"]);
        assert_eq!(row.measure("A"), Some(1.0));
    }

    #[test]
    fn purge_counts_cleared_values() {
        let ledger = SessionLedger::from_rows([
            Session::new(1, day(2024, 1, 1)).with_measure("Mood", Some(5.0)),
            Session::new(2, day(2024, 1, 2)).with_measure("Mood", Some(2.0)),
            Session::new(3, day(2024, 1, 3)).with_measure("Mood", None),
        ]);
        let (next, cleared) = ledger.purge_out_of_range("Mood", 0.0, 4.0);
        assert_eq!(cleared, 1);
        assert_eq!(next.get(0).unwrap().measure("Mood"), None);
        assert_eq!(next.get(1).unwrap().measure("Mood"), Some(2.0));

        let (same, cleared) = next.purge_out_of_range("Mood", 0.0, 4.0);
        assert_eq!(cleared, 0);
        assert_eq!(same, next);
    }

    #[test]
    fn apply_drop_columns() {
        let ledger = ledger(&[day(2024, 1, 1)]);
        let (next, effect) = ledger.apply(&Cascade::DropColumns {
            names: vec!["Mood".into()],
        });
        assert_eq!(effect, CascadeEffect::default());
        assert_eq!(next.get(0).unwrap().columns().collect::<Vec<_>>(), vec!["Exposure"]);
    }

    #[test]
    fn sanitize_coerces_and_renumbers() {
        let raw = vec![
            json!({"session_number": 7, "session_date": "2024-01-01", "Mood": "4", "Exposure": 1, "Stale": 3}),
            json!("garbage"),
            json!({"session_date": "not a date", "Mood": "abc"}),
        ];
        let ledger = SessionLedger::sanitize(&raw, &columns(), day(2024, 6, 1));
        assert_eq!(numbers(&ledger), vec![1, 2]);

        let first = ledger.get(0).unwrap();
        assert_eq!(first.measure("Mood"), Some(4.0));
        assert_eq!(first.get("Exposure"), Some(&CellValue::Practice(true)));
        assert_eq!(first.get("Stale"), None);

        let second = ledger.get(1).unwrap();
        assert_eq!(second.session_date, day(2024, 6, 1));
        assert_eq!(second.get("Exposure"), Some(&CellValue::Practice(false)));
    }

    #[test]
    fn sanitize_empty_gives_default() {
        let ledger = SessionLedger::sanitize(&[], &columns(), day(2024, 6, 1));
        assert_eq!(ledger.len(), 1);
    }
}
