//! Measure registry
//!
//! Owns the measure definitions. Every operation returns a new registry;
//! edits that change the session keyspace or a measure's range also return
//! the [`Cascade`] commands the ledger has to replay.

use std::collections::BTreeMap;

use im::Vector;
use psy_model::{
    coerce, Accepted, Bound, Cascade, Measure, MeasureType, Palette, ValidationError,
    DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN,
};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::names::{self, RegistryRow};

/// Ordered collection of measure definitions
///
/// Never empty: an emptied registry holds one placeholder. Colors are
/// re-derived from position after every change to the row set.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRegistry {
    rows: Vector<Measure>,
    palette: Palette,
}

impl MeasureRegistry {
    /// Registry holding a single placeholder
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self::from_rows(Vec::new(), palette)
    }

    /// Registry from existing rows
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = Measure>, palette: Palette) -> Self {
        let mut rows: Vector<Measure> = rows.into_iter().collect();
        if rows.is_empty() {
            rows.push_back(Measure::placeholder());
        }
        Self { rows, palette }.recolored()
    }

    /// All rows in display order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Measure> {
        self.rows.iter()
    }

    /// Row at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Measure> {
        self.rows.get(index)
    }

    /// Row named `name` (first match)
    #[inline]
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Measure> {
        self.rows.iter().find(|m| m.name == name)
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

    /// Names of measures that key a session column
    #[must_use]
    pub fn active_names(&self) -> Vec<String> {
        names::active_names(&self.rows)
    }

    /// Palette used for colors
    #[inline]
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Append one placeholder measure
    #[must_use]
    pub fn add(&self) -> Self {
        let mut rows = self.rows.clone();
        rows.push_back(Measure::placeholder());
        self.with_rows(rows)
    }

    /// Rename the measure at `index`
    ///
    /// `foreign` lists names taken outside this registry (practice columns,
    /// fixed session fields).
    ///
    /// # Errors
    /// Name rejections, or [`ValidationError::MeasureNotFound`] for a stale
    /// index.
    pub fn rename(
        &self,
        index: usize,
        new_name: &Value,
        foreign: &[String],
    ) -> Result<Accepted<Self>, ValidationError> {
        let new_name = names::name_text(new_name);
        match names::rename_row(&self.rows, index, &new_name, foreign)? {
            Some((rows, cascade)) => {
                tracing::debug!(index, name = %new_name, "measure renamed");
                Ok(Accepted::with_cascade(self.with_rows(rows), cascade))
            }
            None => Ok(Accepted::local(self.clone())),
        }
    }

    /// Change the type of the measure at `index`
    ///
    /// Count forces `Min=0, Max=None`. Switching to Scale from an unset Max
    /// restores `0..100`; an existing Max is kept. A resulting Scale measure
    /// re-validates stored session values against its range.
    ///
    /// # Errors
    /// [`ValidationError::UnknownMeasureType`] or a stale index.
    pub fn set_type(&self, index: usize, new_type: &Value) -> Result<Accepted<Self>, ValidationError> {
        let current = self.row(index)?;
        let measure_type = MeasureType::from_value(new_type)?;

        let mut measure = current.clone();
        measure.measure_type = measure_type;
        match measure_type {
            MeasureType::Count => {
                measure.min = 0.0;
                measure.max = None;
            }
            MeasureType::Scale if measure.max.is_none() => {
                measure.min = DEFAULT_SCALE_MIN;
                measure.max = Some(DEFAULT_SCALE_MAX);
            }
            MeasureType::Scale => {}
        }

        let next = self.with_row(index, measure.clone());
        Ok(match (measure_type, measure.max) {
            (MeasureType::Scale, Some(max)) => Accepted::with_cascade(
                next,
                Cascade::PurgeOutOfRange {
                    name: measure.name,
                    min: measure.min,
                    max,
                },
            ),
            _ => Accepted::local(next),
        })
    }

    /// Change the rater of the measure at `index`
    ///
    /// A measure joining a rater already in use takes over that rater's
    /// shared selection; otherwise its selection flags reset.
    ///
    /// # Errors
    /// [`ValidationError::MeasureNotFound`] for a stale index.
    pub fn set_rater(&self, index: usize, new_rater: &Value) -> Result<Self, ValidationError> {
        let current = self.row(index)?;
        let rater = coerce::to_text(new_rater);

        let shared = self
            .rows
            .iter()
            .enumerate()
            .find(|(i, m)| *i != index && m.rater == rater)
            .map(|(_, m)| m.select_rater);

        let mut measure = current.clone();
        let selected = shared.unwrap_or(false);
        measure.rater = rater;
        measure.select_measure = selected;
        measure.select_rater = selected;
        Ok(self.with_row(index, measure))
    }

    /// Change Min or Max of the measure at `index`
    ///
    /// # Errors
    /// Non-numeric input, any edit on a Count measure, or a bound that would
    /// leave `Min >= Max`.
    pub fn set_bound(
        &self,
        index: usize,
        bound: Bound,
        new_value: &Value,
    ) -> Result<Accepted<Self>, ValidationError> {
        let current = self.row(index)?;
        let value = coerce::to_number(new_value).ok_or(ValidationError::InvalidNumber { bound })?;

        if current.measure_type == MeasureType::Count {
            return Err(ValidationError::FixedCountRange);
        }

        let max = current.max.unwrap_or(DEFAULT_SCALE_MAX);
        let (min, max) = match bound {
            Bound::Min if value >= max => return Err(ValidationError::MinNotBelowMax),
            Bound::Max if value <= current.min => return Err(ValidationError::MaxNotAboveMin),
            Bound::Min => (value, max),
            Bound::Max => (current.min, value),
        };

        let mut measure = current.clone();
        measure.min = min;
        measure.max = Some(max);
        let cascade = Cascade::PurgeOutOfRange {
            name: measure.name.clone(),
            min,
            max,
        };
        Ok(Accepted::with_cascade(self.with_row(index, measure), cascade))
    }

    /// Change the description of the measure at `index`
    ///
    /// # Errors
    /// [`ValidationError::MeasureNotFound`] for a stale index.
    pub fn set_description(&self, index: usize, text: &Value) -> Result<Self, ValidationError> {
        let mut measure = self.row(index)?.clone();
        measure.description = coerce::to_text(text);
        Ok(self.with_row(index, measure))
    }

    /// Delete every measure whose name is selected
    #[must_use]
    pub fn delete(&self, selected: &[String]) -> Accepted<Self> {
        match names::delete_rows(&self.rows, selected) {
            Some((rows, cascade)) => Accepted::with_cascade(self.with_rows(rows), cascade),
            None => Accepted::local(self.clone()),
        }
    }

    /// Arrange measures in `order`
    ///
    /// # Errors
    /// [`ValidationError::NotAPermutation`] when `order` does not name
    /// exactly the current rows.
    pub fn reorder(&self, order: &[String]) -> Result<Accepted<Self>, ValidationError> {
        Ok(match names::reorder_rows(&self.rows, order)? {
            Some(rows) => {
                let next = self.with_rows(rows);
                let cascade = Cascade::ReorderColumns {
                    order: next.active_names(),
                    kind: Measure::KIND,
                };
                Accepted::with_cascade(next, cascade)
            }
            None => Accepted::local(self.clone()),
        })
    }

    /// Toggle whether the named measure is plotted
    ///
    /// Selecting single measures clears every rater selection.
    ///
    /// # Errors
    /// [`ValidationError::ColumnNotFound`] when no measure has that name.
    pub fn select_measure(&self, name: &str, selected: bool) -> Result<Self, ValidationError> {
        let target = self.find(name).ok_or_else(|| ValidationError::ColumnNotFound {
            name: name.to_string(),
        })?;
        if target.select_measure == selected {
            return Ok(self.clone());
        }

        let rows = self
            .rows
            .iter()
            .map(|m| {
                let mut m = m.clone();
                if m.name == name {
                    m.select_measure = selected;
                }
                m.select_rater = false;
                m
            })
            .collect();
        Ok(Self {
            rows,
            palette: self.palette.clone(),
        })
    }

    /// Toggle every measure of `rater` at once
    ///
    /// Each measure's selection becomes its rater's shared selection.
    ///
    /// # Errors
    /// [`ValidationError::ColumnNotFound`] when no measure has that rater.
    pub fn select_rater(&self, rater: &str, selected: bool) -> Result<Self, ValidationError> {
        let mut selection = self.rater_selection();
        match selection.get(rater) {
            None => {
                return Err(ValidationError::ColumnNotFound {
                    name: rater.to_string(),
                })
            }
            Some(current) if *current == selected => return Ok(self.clone()),
            Some(_) => {
                selection.insert(rater.to_string(), selected);
            }
        }

        let rows = self
            .rows
            .iter()
            .map(|m| {
                let mut m = m.clone();
                let shared = selection.get(&m.rater).copied().unwrap_or(false);
                m.select_measure = shared;
                m.select_rater = shared;
                m
            })
            .collect();
        Ok(Self {
            rows,
            palette: self.palette.clone(),
        })
    }

    /// Shared selection per rater, sorted by rater
    ///
    /// The first measure of each rater decides the rater's value.
    #[must_use]
    pub fn rater_selection(&self) -> BTreeMap<String, bool> {
        let mut selection = BTreeMap::new();
        for m in &self.rows {
            selection.entry(m.rater.clone()).or_insert(m.select_rater);
        }
        selection
    }

    fn row(&self, index: usize) -> Result<&Measure, ValidationError> {
        self.rows
            .get(index)
            .ok_or(ValidationError::MeasureNotFound { index })
    }

    fn with_row(&self, index: usize, measure: Measure) -> Self {
        Self {
            rows: self.rows.update(index, measure),
            palette: self.palette.clone(),
        }
    }

    fn with_rows(&self, rows: Vector<Measure>) -> Self {
        Self {
            rows,
            palette: self.palette.clone(),
        }
        .recolored()
    }

    fn recolored(mut self) -> Self {
        for (position, measure) in self.rows.iter_mut().enumerate() {
            let color = self.palette.color_at(position);
            if measure.color != color {
                measure.color = color.to_string();
            }
        }
        self
    }
}

impl Default for MeasureRegistry {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl Serialize for MeasureRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a MeasureRegistry {
    type Item = &'a Measure;
    type IntoIter = im::vector::Iter<'a, Measure>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
