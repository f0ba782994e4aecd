//! PsyDash Session Ledger
//!
//! Ordered session rows whose dynamic columns mirror the active measures
//! and practices.
//!
//! # Overview
//!
//! - [`SessionLedger`]: the rows, with date and cell edits that validate
//!   before committing
//! - [`ColumnSet`]: the dynamic columns derived from the registries
//! - [`columns_for`]: display definitions for the session grid
//!
//! Structural registry changes reach the ledger only as
//! [`psy_model::Cascade`] commands through [`SessionLedger::apply`].
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use psy_ledger::{ColumnSet, SessionLedger};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let columns = ColumnSet::new(vec!["Mood".into()], vec![]);
//! let ledger = SessionLedger::new(&columns, today).add_session(&columns, today);
//! assert_eq!(ledger.get(1).unwrap().session_number, 2);
//! ```

#![warn(unreachable_pub)]

pub mod columns;
pub mod ledger;

// Re-exports
pub use columns::{columns_for, fixed_columns, ColumnRole, ColumnSet, ColumnSpec};
pub use ledger::{CascadeEffect, SessionLedger};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for the session ledger
    pub use crate::{CascadeEffect, ColumnSet, SessionLedger};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
