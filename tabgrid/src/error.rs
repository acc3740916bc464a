//! Error types

/// Errors raised while expanding row identifiers into item identities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The data source reported the same row identifier twice.
    #[error("Row identifier {row} appears more than once")]
    DuplicateRow { row: i64 },

    /// A row identifier (or its synthesized neighbour) cannot be mapped to an
    /// item identity without overflowing.
    #[error("Row identifier {row} is outside the representable range for {columns} columns")]
    RowOutOfRange { row: i64, columns: usize },
}

/// Errors raised while solving column widths.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// Absolute and estimated widths leave no room for the remaining columns.
    #[error("Fixed column widths ({fixed}) leave no space in available width {available}")]
    Infeasible { fixed: f64, available: f64 },

    /// A column asked for a share of the height where a width was required.
    #[error("Column '{column}' specifies a height fraction where a width is required")]
    HeightFraction { column: String },

    /// The host reported no usable width.
    #[error("Available width must be positive, got {0}")]
    NoAvailableWidth(f64),

    /// The column enumeration has no members.
    #[error("Column enumeration is empty")]
    NoColumns,
}

/// Top-level error for grid operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl LayoutError {
    /// Creates a height fraction error for the given column.
    pub fn height_fraction(column: impl std::fmt::Debug) -> Self {
        Self::HeightFraction {
            column: format!("{column:?}"),
        }
    }
}
