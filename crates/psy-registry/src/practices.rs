//! Practice registry

use im::Vector;
use psy_model::{coerce, Accepted, Cascade, Practice, ValidationError};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::names::{self, RegistryRow};

/// Ordered collection of practice definitions
///
/// Never empty: an emptied registry holds one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeRegistry {
    rows: Vector<Practice>,
}

impl PracticeRegistry {
    /// Registry holding a single placeholder
    #[must_use]
    pub fn new() -> Self {
        Self::from_rows(Vec::new())
    }

    /// Registry from existing rows
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = Practice>) -> Self {
        let mut rows: Vector<Practice> = rows.into_iter().collect();
        if rows.is_empty() {
            rows.push_back(Practice::placeholder());
        }
        Self { rows }
    }

    /// All rows in display order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Practice> {
        self.rows.iter()
    }

    /// Row at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Practice> {
        self.rows.get(index)
    }

    /// Check if an active practice has this name
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rows.iter().any(|p| !p.is_placeholder() && p.name == name)
    }

    /// Number of rows, placeholders included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false, the registry keeps at least one row
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Names of practices that key a session column
    #[must_use]
    pub fn active_names(&self) -> Vec<String> {
        names::active_names(&self.rows)
    }

    /// Append one placeholder practice
    #[must_use]
    pub fn add(&self) -> Self {
        let mut rows = self.rows.clone();
        rows.push_back(Practice::placeholder());
        Self { rows }
    }

    /// Rename the practice at `index`
    ///
    /// # Errors
    /// Name rejections, or [`ValidationError::PracticeNotFound`] for a stale
    /// index.
    pub fn rename(
        &self,
        index: usize,
        new_name: &Value,
        foreign: &[String],
    ) -> Result<Accepted<Self>, ValidationError> {
        let new_name = names::name_text(new_name);
        Ok(match names::rename_row(&self.rows, index, &new_name, foreign)? {
            Some((rows, cascade)) => {
                tracing::debug!(index, name = %new_name, "practice renamed");
                Accepted::with_cascade(Self { rows }, cascade)
            }
            None => Accepted::local(self.clone()),
        })
    }

    /// Change the description of the practice at `index`
    ///
    /// # Errors
    /// [`ValidationError::PracticeNotFound`] for a stale index.
    pub fn set_description(&self, index: usize, text: &Value) -> Result<Self, ValidationError> {
        let mut practice = self
            .rows
            .get(index)
            .ok_or(ValidationError::PracticeNotFound { index })?
            .clone();
        practice.description = coerce::to_text(text);
        Ok(Self {
            rows: self.rows.update(index, practice),
        })
    }

    /// Delete every practice whose name is selected
    #[must_use]
    pub fn delete(&self, selected: &[String]) -> Accepted<Self> {
        match names::delete_rows(&self.rows, selected) {
            Some((rows, cascade)) => Accepted::with_cascade(Self { rows }, cascade),
            None => Accepted::local(self.clone()),
        }
    }

    /// Arrange practices in `order`
    ///
    /// # Errors
    /// [`ValidationError::NotAPermutation`] when `order` does not name
    /// exactly the current rows.
    pub fn reorder(&self, order: &[String]) -> Result<Accepted<Self>, ValidationError> {
        Ok(match names::reorder_rows(&self.rows, order)? {
            Some(rows) => {
                let next = Self { rows };
                let cascade = Cascade::ReorderColumns {
                    order: next.active_names(),
                    kind: Practice::KIND,
                };
                Accepted::with_cascade(next, cascade)
            }
            None => Accepted::local(self.clone()),
        })
    }
}

impl Default for PracticeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for PracticeRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a PracticeRegistry {
    type Item = &'a Practice;
    type IntoIter = im::vector::Iter<'a, Practice>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
