//! Record editor
//!
//! The single entry point for edits. A request is validated by the
//! registry or ledger that owns the target; if accepted, the cascades it
//! emitted are replayed into the session ledger and the new snapshot
//! replaces the old one. A rejected request leaves the snapshot untouched
//! and reports why.
//!
//! ```text
//! EditRequest -> dispatch -> Accepted { next, cascades } -> replay -> commit
//!                         \-> ValidationError -> Outcome (unchanged snapshot)
//! ```

use std::sync::Arc;

use psy_ledger::fixed_columns;
use psy_model::{Cascade, Clock, SystemClock, ValidationError};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::record::Record;
use crate::request::EditRequest;

/// Result of one edit as shown to the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Alert text, if any
    pub message: Option<String>,
    /// Whether the edit was rejected
    pub is_error: bool,
}

impl Outcome {
    /// Nothing to report
    #[inline]
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    /// Accepted edit with an informational message
    #[inline]
    #[must_use]
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            is_error: false,
        }
    }

    /// Rejected edit
    #[inline]
    #[must_use]
    pub fn rejected(error: &ValidationError) -> Self {
        Self {
            message: Some(error.to_string()),
            is_error: true,
        }
    }
}

/// Snapshot returned after every edit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditResponse {
    /// Committed record after the edit
    #[serde(flatten)]
    pub record: Record,
    pub outcome: Outcome,
}

/// Message reported when a range change cleared session values
#[must_use]
pub fn purge_message(measure: &str) -> String {
    format!("Values of {measure} in sessions data were out of range and have been deleted.")
}

/// Message reported when a new record replaces the current one
pub const NEW_RECORD_MESSAGE: &str = "New record initialized.";

/// Owns one record and applies edits to it
#[derive(Debug, Clone)]
pub struct RecordEditor {
    record: Record,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

struct Commit {
    record: Record,
    notices: Vec<String>,
}

impl Commit {
    fn quiet(record: Record) -> Self {
        Self {
            record,
            notices: Vec::new(),
        }
    }
}

impl RecordEditor {
    /// Editor over `record`, dating new sessions by the system clock
    #[must_use]
    pub fn new(record: Record, config: EngineConfig) -> Self {
        Self {
            record,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Editor over an empty record
    #[must_use]
    pub fn empty(config: EngineConfig) -> Self {
        Self::new(Record::new(config.palette.clone(), SystemClock.today()), config)
    }

    /// With clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Take the current snapshot
    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Apply one edit
    ///
    /// Always returns the authoritative snapshot. Rejections carry the
    /// user-facing message; requests against rows or columns that no longer
    /// exist are ignored.
    pub fn apply(&mut self, request: EditRequest) -> EditResponse {
        let kind = request.label();
        tracing::debug!(kind, "applying edit");

        let outcome = match self.dispatch(request) {
            Ok(commit) => {
                self.record = commit.record;
                if commit.notices.is_empty() {
                    Outcome::silent()
                } else {
                    Outcome::notice(commit.notices.join(" "))
                }
            }
            Err(error) if error.is_structural() => {
                tracing::warn!(kind, %error, "stale edit ignored");
                Outcome::silent()
            }
            Err(error) => {
                tracing::info!(kind, %error, "edit rejected");
                Outcome::rejected(&error)
            }
        };

        EditResponse {
            record: self.record.clone(),
            outcome,
        }
    }

    fn dispatch(&self, request: EditRequest) -> Result<Commit, ValidationError> {
        let current = &self.record;
        let today = self.clock.today();

        match request {
            EditRequest::AddMeasure => Ok(Commit::quiet(Record {
                measures: current.measures.add(),
                ..current.clone()
            })),
            EditRequest::RenameMeasure { index, value } => {
                let foreign = [current.practices.active_names(), fixed_columns()].concat();
                let accepted = current.measures.rename(index, &value, &foreign)?;
                Ok(Self::replay(
                    Record {
                        measures: accepted.next,
                        ..current.clone()
                    },
                    &accepted.cascades,
                ))
            }
            EditRequest::SetMeasureType { index, value } => {
                let accepted = current.measures.set_type(index, &value)?;
                Ok(Self::replay(
                    Record {
                        measures: accepted.next,
                        ..current.clone()
                    },
                    &accepted.cascades,
                ))
            }
            EditRequest::SetMinMax { index, bound, value } => {
                let accepted = current.measures.set_bound(index, bound, &value)?;
                Ok(Self::replay(
                    Record {
                        measures: accepted.next,
                        ..current.clone()
                    },
                    &accepted.cascades,
                ))
            }
            EditRequest::SetRater { index, value } => Ok(Commit::quiet(Record {
                measures: current.measures.set_rater(index, &value)?,
                ..current.clone()
            })),
            EditRequest::SetMeasureDescription { index, value } => Ok(Commit::quiet(Record {
                measures: current.measures.set_description(index, &value)?,
                ..current.clone()
            })),
            EditRequest::DeleteMeasures { names } => {
                let accepted = current.measures.delete(&names);
                Ok(Self::replay(
                    Record {
                        measures: accepted.next,
                        ..current.clone()
                    },
                    &accepted.cascades,
                ))
            }
            EditRequest::ReorderMeasures { order } => {
                let accepted = current.measures.reorder(&order)?;
                Ok(Self::replay(
                    Record {
                        measures: accepted.next,
                        ..current.clone()
                    },
                    &accepted.cascades,
                ))
            }
            EditRequest::SelectMeasure { name, selected } => Ok(Commit::quiet(Record {
                measures: current.measures.select_measure(&name, selected)?,
                ..current.clone()
            })),
            EditRequest::SelectRater { rater, selected } => Ok(Commit::quiet(Record {
                measures: current.measures.select_rater(&rater, selected)?,
                ..current.clone()
            })),

            EditRequest::AddPractice => Ok(Commit::quiet(Record {
                practices: current.practices.add(),
                ..current.clone()
            })),
            EditRequest::RenamePractice { index, value } => {
                let foreign = [current.measures.active_names(), fixed_columns()].concat();
                let accepted = current.practices.rename(index, &value, &foreign)?;
                Ok(Self::replay(
                    Record {
                        practices: accepted.next,
                        ..current.clone()
                    },
                    &accepted.cascades,
                ))
            }
            EditRequest::SetPracticeDescription { index, value } => Ok(Commit::quiet(Record {
                practices: current.practices.set_description(index, &value)?,
                ..current.clone()
            })),
            EditRequest::DeletePractices { names } => {
                let accepted = current.practices.delete(&names);
                Ok(Self::replay(
                    Record {
                        practices: accepted.next,
                        ..current.clone()
                    },
                    &accepted.cascades,
                ))
            }
            EditRequest::ReorderPractices { order } => {
                let accepted = current.practices.reorder(&order)?;
                Ok(Self::replay(
                    Record {
                        practices: accepted.next,
                        ..current.clone()
                    },
                    &accepted.cascades,
                ))
            }

            EditRequest::AddSession => Ok(Commit::quiet(Record {
                sessions: current.sessions.add_session(&current.columns(), today),
                ..current.clone()
            })),
            EditRequest::DeleteSessions { selected } => Ok(Commit::quiet(Record {
                sessions: current
                    .sessions
                    .delete_sessions(&selected, &current.columns(), today),
                ..current.clone()
            })),
            EditRequest::EditDate { row, value } => Ok(Commit::quiet(Record {
                sessions: current.sessions.edit_date(row, &value)?,
                ..current.clone()
            })),
            EditRequest::EditMeasureCell { row, field, value } => {
                let measure = current
                    .measures
                    .find(&field)
                    .filter(|m| !m.is_placeholder())
                    .ok_or(ValidationError::ColumnNotFound { name: field })?;
                Ok(Commit::quiet(Record {
                    sessions: current.sessions.edit_measure_cell(row, measure, &value)?,
                    ..current.clone()
                }))
            }
            EditRequest::EditPracticeCell { row, field, value } => {
                if !current.practices.contains(&field) {
                    return Err(ValidationError::ColumnNotFound { name: field });
                }
                Ok(Commit::quiet(Record {
                    sessions: current.sessions.edit_practice_cell(row, &field, &value)?,
                    ..current.clone()
                }))
            }

            EditRequest::EditClient { field, value } => Ok(Commit::quiet(Record {
                client: current.client.with_field(field, &value),
                ..current.clone()
            })),
            EditRequest::NewRecord => {
                if current.is_default(today) {
                    tracing::debug!("record already empty");
                }
                tracing::info!("starting new record");
                Ok(Commit {
                    record: Record::new(self.config.palette.clone(), today),
                    notices: vec![NEW_RECORD_MESSAGE.to_string()],
                })
            }
        }
    }

    /// Replay accepted cascades into the ledger of `record`
    fn replay(record: Record, cascades: &[Cascade]) -> Commit {
        let mut sessions = record.sessions.clone();
        let mut notices = Vec::new();

        for cascade in cascades {
            let (next, effect) = sessions.apply(cascade);
            sessions = next;
            if effect.cleared > 0 {
                if let Cascade::PurgeOutOfRange { name, .. } = cascade {
                    tracing::info!(measure = %name, cleared = effect.cleared, "cleared out-of-range session values");
                    notices.push(purge_message(name));
                }
            }
        }

        if !cascades.is_empty() {
            tracing::info!(count = cascades.len(), "cascades replayed");
        }
        Commit {
            record: Record { sessions, ..record },
            notices,
        }
    }
}
