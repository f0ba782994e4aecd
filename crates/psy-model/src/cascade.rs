//! Cascade commands
//!
//! A registry never touches session rows. When an accepted edit changes the
//! registry's keyspace (or the range of a measure) it emits one or more
//! [`Cascade`] commands; the editor replays them into the session ledger as
//! the second step of the same edit.

use serde::{Deserialize, Serialize};

use crate::session::ColumnKind;

/// Structural change to replay into every session row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Cascade {
    /// Move `old` column values to `new`, or initialize `new` with the
    /// kind's default when `old` is absent
    RenameColumn {
        old: String,
        new: String,
        kind: ColumnKind,
    },

    /// Remove the named columns
    DropColumns { names: Vec<String> },

    /// Re-key the columns of `kind` into `order`
    ReorderColumns { order: Vec<String>, kind: ColumnKind },

    /// Null every value of `name` outside `[min, max]`
    PurgeOutOfRange { name: String, min: f64, max: f64 },
}

impl Cascade {
    /// Short operation label for logs
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::RenameColumn { .. } => "rename_column",
            Self::DropColumns { .. } => "drop_columns",
            Self::ReorderColumns { .. } => "reorder_columns",
            Self::PurgeOutOfRange { .. } => "purge_out_of_range",
        }
    }
}

/// A registry after an accepted edit, with the cascades it requires
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted<R> {
    /// New registry snapshot
    pub next: R,
    /// Commands to replay into the ledger, in order
    pub cascades: Vec<Cascade>,
}

impl<R> Accepted<R> {
    /// Accepted edit with no ledger impact
    #[inline]
    #[must_use]
    pub fn local(next: R) -> Self {
        Self {
            next,
            cascades: Vec::new(),
        }
    }

    /// Accepted edit with one cascade
    #[inline]
    #[must_use]
    pub fn with_cascade(next: R, cascade: Cascade) -> Self {
        Self {
            next,
            cascades: vec![cascade],
        }
    }

    /// Check if the ledger must be updated
    #[inline]
    #[must_use]
    pub fn has_cascades(&self) -> bool {
        !self.cascades.is_empty()
    }
}
