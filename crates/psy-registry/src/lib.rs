//! PsyDash Registries
//!
//! Ordered, never-empty collections of measure and practice definitions.
//!
//! # Overview
//!
//! Registries are immutable values: every edit returns a new registry. An
//! edit that renames, drops or reorders a column, or narrows a measure's
//! range, also returns the [`psy_model::Cascade`] commands that the session
//! ledger has to replay to stay consistent.
//!
//! - [`MeasureRegistry`]: measures with type, range, rater and color
//! - [`PracticeRegistry`]: practices with description
//! - [`names`]: name validation shared by both
//!
//! # Example
//!
//! ```rust
//! use psy_model::{Cascade, Palette};
//! use psy_registry::MeasureRegistry;
//! use serde_json::json;
//!
//! let registry = MeasureRegistry::new(Palette::default());
//! let accepted = registry.rename(0, &json!("Mood"), &[]).unwrap();
//! assert_eq!(accepted.next.active_names(), vec!["Mood"]);
//! assert!(matches!(accepted.cascades[0], Cascade::RenameColumn { .. }));
//! ```

#![warn(unreachable_pub)]

pub mod measures;
pub mod names;
pub mod practices;

// Re-exports
pub use measures::MeasureRegistry;
pub use names::{active_names, demote_invalid_names, validate_name, RegistryRow};
pub use practices::PracticeRegistry;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for registries
    pub use crate::{MeasureRegistry, PracticeRegistry, RegistryRow};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
