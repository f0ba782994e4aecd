//! Name validation and the operations shared by both registries
//!
//! Measures and practices follow the same lifecycle: rows are added with a
//! placeholder name, become real once renamed to a unique valid name, and
//! are deleted or reordered by name. [`RegistryRow`] abstracts over the two
//! row types so those rules live in one place.

use std::collections::HashMap;

use im::Vector;
use psy_model::{Cascade, ColumnKind, Measure, Practice, ValidationError, RESERVED_NAMES};

/// Row type owned by a registry
pub trait RegistryRow: Clone + std::fmt::Debug {
    /// Kind of session column the row keys
    const KIND: ColumnKind;

    /// Row name (the session column key)
    fn name(&self) -> &str;

    /// Replace the row name
    fn set_name(&mut self, name: String);

    /// Check if the row still carries the placeholder name
    fn is_placeholder(&self) -> bool;

    /// Fresh unnamed row
    fn placeholder() -> Self;
}

impl RegistryRow for Measure {
    const KIND: ColumnKind = ColumnKind::Measure;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_placeholder(&self) -> bool {
        Measure::is_placeholder(self)
    }

    fn placeholder() -> Self {
        Measure::placeholder()
    }
}

impl RegistryRow for Practice {
    const KIND: ColumnKind = ColumnKind::Practice;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_placeholder(&self) -> bool {
        Practice::is_placeholder(self)
    }

    fn placeholder() -> Self {
        Practice::placeholder()
    }
}

/// Validate a proposed row name
///
/// Checks, in order: non-blank, not a reserved placeholder name
/// (case-insensitive), no quote characters, not already `taken`
/// (case-sensitive).
///
/// # Errors
/// Returns the [`ValidationError`] whose message explains the rejection.
pub fn validate_name<'a>(
    name: &str,
    taken: impl IntoIterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let lowered = name.to_lowercase();
    if RESERVED_NAMES.iter().any(|r| r.to_lowercase() == lowered) {
        return Err(ValidationError::ReservedName {
            name: name.to_string(),
        });
    }

    if name.contains('"') || name.contains('\'') {
        return Err(ValidationError::QuoteInName {
            name: name.to_string(),
        });
    }

    if taken.into_iter().any(|t| t == name) {
        return Err(ValidationError::DuplicateName {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Names of rows that key a session column
#[must_use]
pub fn active_names<R: RegistryRow>(rows: &Vector<R>) -> Vec<String> {
    rows.iter()
        .filter(|r| !r.is_placeholder())
        .map(|r| r.name().to_string())
        .collect()
}

/// Rename the row at `index`
///
/// `foreign` lists names used outside this registry that a row may not take.
/// Returns `Ok(None)` when the name is unchanged.
///
/// # Errors
/// [`ValidationError::MeasureNotFound`]/[`ValidationError::PracticeNotFound`]
/// for a stale index, otherwise the name rejection.
pub(crate) fn rename_row<R: RegistryRow>(
    rows: &Vector<R>,
    index: usize,
    new_name: &str,
    foreign: &[String],
) -> Result<Option<(Vector<R>, Cascade)>, ValidationError> {
    let current = rows.get(index).ok_or_else(|| row_not_found::<R>(index))?;
    // a placeholder keeping its name is still a reserved-name rename
    if current.name() == new_name && !current.is_placeholder() {
        return Ok(None);
    }

    let others = rows
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, r)| r.name());
    validate_name(new_name, others.chain(foreign.iter().map(String::as_str)))?;

    let old = current.name().to_string();
    let mut renamed = current.clone();
    renamed.set_name(new_name.to_string());
    let next = rows.update(index, renamed);

    let cascade = Cascade::RenameColumn {
        old,
        new: new_name.to_string(),
        kind: R::KIND,
    };
    Ok(Some((next, cascade)))
}

/// Remove every row whose name is selected
///
/// An emptied registry gets one placeholder back. The cascade drops the
/// columns of the removed named rows.
pub(crate) fn delete_rows<R: RegistryRow>(
    rows: &Vector<R>,
    selected: &[String],
) -> Option<(Vector<R>, Cascade)> {
    if selected.is_empty() {
        return None;
    }

    let mut next = rows.clone();
    next.retain(|r| !selected.iter().any(|s| s == r.name()));
    if next.len() == rows.len() {
        return None;
    }

    let dropped: Vec<String> = rows
        .iter()
        .filter(|r| !r.is_placeholder() && selected.iter().any(|s| s == r.name()))
        .map(|r| r.name().to_string())
        .collect();

    if next.is_empty() {
        next.push_back(R::placeholder());
    }

    Some((next, Cascade::DropColumns { names: dropped }))
}

/// Arrange rows to follow `order`
///
/// `order` must be a permutation of the current names (duplicates such as
/// several placeholders are matched first-come). Returns `Ok(None)` when the
/// order is unchanged.
///
/// # Errors
/// [`ValidationError::NotAPermutation`] when `order` does not name exactly
/// the current rows.
pub(crate) fn reorder_rows<R: RegistryRow>(
    rows: &Vector<R>,
    order: &[String],
) -> Result<Option<Vector<R>>, ValidationError> {
    let not_permutation = || ValidationError::NotAPermutation {
        order: order.to_vec(),
    };
    if order.len() != rows.len() {
        return Err(not_permutation());
    }

    let mut pending: HashMap<&str, Vec<&R>> = HashMap::new();
    for row in rows.iter().rev() {
        pending.entry(row.name()).or_default().push(row);
    }

    let mut next = Vector::new();
    for name in order {
        let row = pending
            .get_mut(name.as_str())
            .and_then(Vec::pop)
            .ok_or_else(not_permutation)?;
        next.push_back(row.clone());
    }

    let unchanged = rows.iter().map(R::name).eq(next.iter().map(R::name));
    Ok(if unchanged { None } else { Some(next) })
}

/// Turn loaded rows with an unusable name back into placeholders
///
/// Rows are checked in order with the same rules as a rename: a name that
/// is blank, reserved, quoted, already used by an earlier row, or listed in
/// `foreign` loses its column.
#[must_use]
pub fn demote_invalid_names<R: RegistryRow>(rows: Vec<R>, foreign: &[String]) -> Vec<R> {
    let mut seen: Vec<String> = Vec::with_capacity(rows.len());
    rows.into_iter()
        .map(|mut row| {
            if row.is_placeholder() {
                return row;
            }
            let taken = seen.iter().chain(foreign).map(String::as_str);
            match validate_name(row.name(), taken) {
                Ok(()) => seen.push(row.name().to_string()),
                Err(error) => {
                    tracing::warn!(name = row.name(), %error, "demoting loaded row to placeholder");
                    row.set_name(R::placeholder().name().to_string());
                }
            }
            row
        })
        .collect()
}

/// Proposed name as text
///
/// Strings are kept exactly as typed so validation sees surrounding
/// whitespace; other JSON values are coerced.
pub(crate) fn name_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => psy_model::coerce::to_text(other),
    }
}

fn row_not_found<R: RegistryRow>(index: usize) -> ValidationError {
    match R::KIND {
        ColumnKind::Measure => ValidationError::MeasureNotFound { index },
        ColumnKind::Practice => ValidationError::PracticeNotFound { index },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn practices(names: &[&str]) -> Vector<Practice> {
        names.iter().map(|n| Practice::new(*n)).collect()
    }

    fn names(rows: &Vector<Practice>) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn rejects_blank_names() {
        assert_eq!(validate_name("", []), Err(ValidationError::EmptyName));
        assert_eq!(validate_name("   ", []), Err(ValidationError::EmptyName));
    }

    #[test]
    fn rejects_reserved_names_any_case() {
        for name in ["New Measure", "new practice", "NEW MEASURE"] {
            assert!(matches!(
                validate_name(name, []),
                Err(ValidationError::ReservedName { .. })
            ));
        }
    }

    #[test]
    fn rejects_quotes() {
        assert!(matches!(
            validate_name("a\"b", []),
            Err(ValidationError::QuoteInName { .. })
        ));
        assert!(matches!(
            validate_name("it's", []),
            Err(ValidationError::QuoteInName { .. })
        ));
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        assert!(matches!(
            validate_name("Mood", ["Mood"]),
            Err(ValidationError::DuplicateName { .. })
        ));
        assert!(validate_name("mood", ["Mood"]).is_ok());
    }

    #[test]
    fn rename_emits_cascade() {
        let rows = practices(&["A", "B"]);
        let (next, cascade) = rename_row(&rows, 0, "C", &[]).unwrap().unwrap();
        assert_eq!(names(&next), vec!["C", "B"]);
        assert_eq!(
            cascade,
            Cascade::RenameColumn {
                old: "A".into(),
                new: "C".into(),
                kind: ColumnKind::Practice,
            }
        );
    }

    #[test]
    fn rename_to_same_name_is_noop() {
        let rows = practices(&["A"]);
        assert_eq!(rename_row(&rows, 0, "A", &[]), Ok(None));
    }

    #[test]
    fn placeholder_cannot_keep_reserved_name() {
        let rows = practices(&["New Practice"]);
        assert_eq!(
            rename_row(&rows, 0, "New Practice", &[]),
            Err(ValidationError::ReservedName {
                name: "New Practice".into()
            })
        );
    }

    #[test]
    fn demote_keeps_first_of_duplicates() {
        let rows: Vec<Practice> = ["Mood", "Homework", "Homework", "it's", "session_date"]
            .iter()
            .map(|n| Practice::new(*n))
            .collect();
        let foreign = vec!["Mood".to_string(), "session_date".to_string()];
        let names: Vec<String> = demote_invalid_names(rows, &foreign)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(
            names,
            vec!["New Practice", "Homework", "New Practice", "New Practice", "New Practice"]
        );
    }

    #[test]
    fn rename_respects_foreign_names() {
        let rows = practices(&["A"]);
        let result = rename_row(&rows, 0, "Mood", &["Mood".to_string()]);
        assert!(matches!(result, Err(ValidationError::DuplicateName { .. })));
    }

    #[test]
    fn rename_stale_index() {
        let rows = practices(&["A"]);
        assert_eq!(
            rename_row(&rows, 4, "B", &[]),
            Err(ValidationError::PracticeNotFound { index: 4 })
        );
    }

    #[test]
    fn delete_everything_leaves_placeholder() {
        let rows = practices(&["A", "B"]);
        let (next, cascade) = delete_rows(&rows, &["A".into(), "B".into()]).unwrap();
        assert_eq!(next.len(), 1);
        assert!(next[0].is_placeholder());
        assert_eq!(
            cascade,
            Cascade::DropColumns {
                names: vec!["A".into(), "B".into()]
            }
        );
    }

    #[test]
    fn delete_placeholder_drops_no_column() {
        let rows = practices(&["A", "New Practice"]);
        let (next, cascade) = delete_rows(&rows, &["New Practice".into()]).unwrap();
        assert_eq!(names(&next), vec!["A"]);
        assert_eq!(cascade, Cascade::DropColumns { names: vec![] });
    }

    #[test]
    fn delete_unknown_is_noop() {
        let rows = practices(&["A"]);
        assert!(delete_rows(&rows, &["Z".into()]).is_none());
        assert!(delete_rows(&rows, &[]).is_none());
    }

    #[test]
    fn reorder_permutation() {
        let rows = practices(&["A", "B", "C"]);
        let next = reorder_rows(&rows, &["C".into(), "A".into(), "B".into()])
            .unwrap()
            .unwrap();
        assert_eq!(names(&next), vec!["C", "A", "B"]);
    }

    #[test]
    fn reorder_same_order_is_noop() {
        let rows = practices(&["A", "B"]);
        assert_eq!(reorder_rows(&rows, &["A".into(), "B".into()]), Ok(None));
    }

    #[test]
    fn reorder_rejects_non_permutation() {
        let rows = practices(&["A", "B"]);
        assert!(reorder_rows(&rows, &["A".into(), "A".into()]).is_err());
        assert!(reorder_rows(&rows, &["A".into()]).is_err());
        assert!(reorder_rows(&rows, &["A".into(), "X".into()]).is_err());
    }

    #[test]
    fn reorder_handles_duplicate_placeholders() {
        let rows = practices(&["New Practice", "A", "New Practice"]);
        let order = vec!["A".into(), "New Practice".into(), "New Practice".into()];
        let next = reorder_rows(&rows, &order).unwrap().unwrap();
        assert_eq!(names(&next), vec!["A", "New Practice", "New Practice"]);
    }
}
