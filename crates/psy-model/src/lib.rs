//! PsyDash Record Model
//!
//! Plain data types shared by the registries, the session ledger and the
//! record editor.
//!
//! # Overview
//!
//! - [`Measure`] / [`Practice`]: registry rows, each with a placeholder form
//! - [`Session`]: one observation row with ordered dynamic [`CellValue`] columns
//! - [`Cascade`]: structural change a registry asks the ledger to replay
//! - [`ValidationError`]: user-correctable rejection of an edit
//! - [`coerce`]: total conversions from loosely-typed JSON input
//!
//! # Example
//!
//! ```rust
//! use psy_model::{coerce, Measure};
//! use serde_json::json;
//!
//! let mood = Measure::scale("Mood", 0.0, 10.0);
//! let value = coerce::to_number(&json!("7.5")).unwrap();
//! assert!(mood.accepts(value));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cascade;
pub mod client;
pub mod clock;
pub mod coerce;
pub mod error;
pub mod measure;
pub mod palette;
pub mod practice;
pub mod session;

// Re-exports
pub use cascade::{Accepted, Cascade};
pub use client::{ClientField, ClientInfo};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ValidationError;
pub use measure::{
    Bound, Measure, MeasureType, DEFAULT_RATER, DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN,
    PLACEHOLDER_MEASURE,
};
pub use palette::Palette;
pub use practice::{Practice, PLACEHOLDER_PRACTICE};
pub use session::{CellValue, ColumnKind, Session, SESSION_DATE, SESSION_NUMBER};

/// Names reserved for unnamed rows, compared case-insensitively on rename
pub const RESERVED_NAMES: [&str; 2] = [PLACEHOLDER_MEASURE, PLACEHOLDER_PRACTICE];

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for record model types
    pub use crate::{
        Accepted, Bound, Cascade, CellValue, ClientInfo, Clock, ColumnKind, Measure, MeasureType,
        Palette, Practice, Session, ValidationError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
