//! Measure color palette
//!
//! Colors cycle by ordinal position. The default palette is the 20-color
//! categorical set with the saturated half first and the light half second.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_COLORS: Lazy<Arc<[String]>> = Lazy::new(|| {
    [
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
        "#bcbd22", "#17becf", "#aec7e8", "#ffbb78", "#98df8a", "#ff9896", "#c5b0d5", "#c49c94",
        "#f7b6d2", "#c7c7c7", "#dbdb8d", "#9edae5",
    ]
    .iter()
    .map(|c| (*c).to_string())
    .collect()
});

/// Ordered, cyclic list of display colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Palette(Arc<[String]>);

impl Palette {
    /// Palette from explicit colors; an empty list falls back to the default
    #[must_use]
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            Self::default()
        } else {
            Self(colors.into())
        }
    }

    /// Color for the row at `position`
    #[inline]
    #[must_use]
    pub fn color_at(&self, position: usize) -> &str {
        &self.0[position % self.0.len()]
    }

    /// Number of distinct colors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the palette has no colors (never true once constructed)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(Arc::clone(&*DEFAULT_COLORS))
    }
}

impl From<Vec<String>> for Palette {
    fn from(colors: Vec<String>) -> Self {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<String> {
    fn from(palette: Palette) -> Self {
        palette.0.to_vec()
    }
}
