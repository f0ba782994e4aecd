//! PsyDash Record Engine
//!
//! Keeps a therapy-progress record consistent under edits: a client
//! profile, the measure and practice registries, and the session ledger
//! whose columns they define.
//!
//! # Architecture
//!
//! ```text
//! EditRequest ─▶ RecordEditor ─▶ MeasureRegistry / PracticeRegistry / SessionLedger
//!                     │                  │
//!                     │◀── Accepted { next, cascades }
//!                     └─▶ SessionLedger::apply(cascade) ─▶ EditResponse
//! ```
//!
//! # Example
//!
//! ```rust
//! use psy_core::{EditRequest, EngineConfig, RecordEditor};
//! use serde_json::json;
//!
//! let mut editor = RecordEditor::empty(EngineConfig::default());
//! let response = editor.apply(EditRequest::RenameMeasure { index: 0, value: json!("Mood") });
//! assert!(!response.outcome.is_error);
//! assert_eq!(response.record.columns().measures(), ["Mood".to_string()]);
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod editor;
pub mod error;
pub mod record;
pub mod request;

// Re-exports
pub use config::EngineConfig;
pub use editor::{EditResponse, Outcome, RecordEditor};
pub use error::{ConfigError, RecordError};
pub use record::Record;
pub use request::EditRequest;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the record editor
    pub use crate::{EditRequest, EditResponse, EngineConfig, Outcome, Record, RecordEditor};
    pub use psy_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
