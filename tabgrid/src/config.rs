//! Grid configuration.

use serde::{Deserialize, Serialize};

use crate::width::SizingMode;

/// Per-table configuration.
///
/// "Enabled" reserves a pseudo-row; "hidden" suppresses it without
/// forgetting that it was enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub headers_enabled: bool,
    pub headers_hidden: bool,
    pub footers_enabled: bool,
    pub footers_hidden: bool,
    /// Width distribution policy.
    pub sizing_mode: SizingMode,
    /// Fixed spacing between adjacent columns.
    pub gap: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            headers_enabled: false,
            headers_hidden: false,
            footers_enabled: false,
            footers_hidden: false,
            sizing_mode: SizingMode::default(),
            gap: 0.0,
        }
    }
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the header row.
    pub fn headers(mut self) -> Self {
        self.headers_enabled = true;
        self
    }

    /// Enable the footer row.
    pub fn footers(mut self) -> Self {
        self.footers_enabled = true;
        self
    }

    pub fn sizing_mode(mut self, mode: SizingMode) -> Self {
        self.sizing_mode = mode;
        self
    }

    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn headers_visible(&self) -> bool {
        self.headers_enabled && !self.headers_hidden
    }

    pub fn footers_visible(&self) -> bool {
        self.footers_enabled && !self.footers_hidden
    }
}
