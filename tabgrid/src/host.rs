//! Collaborator traits.
//!
//! The grid core talks to four collaborators:
//! - a [`GridDataSource`] that owns the rows,
//! - a [`SortDelegate`] that reorders them,
//! - an optional [`LayoutDelegate`] for custom column widths,
//! - a [`RenderingHost`] that turns snapshots and layouts into pixels.

use std::collections::HashSet;

use crate::column::ColumnId;
use crate::identity::{CellKind, ItemId, RowId};
use crate::snapshot::Snapshot;
use crate::sort::{SortCompletion, SortOrder};
use crate::width::{LayoutDescription, WidthSpec};

/// Supplies table content.
///
/// `row_index` arguments are data-relative: the synthesized header row is
/// already subtracted, so index 0 is the first data row. Header cells receive
/// index 0 and footer cells the number of data rows.
pub trait GridDataSource<C: ColumnId> {
    /// Content of one cell.
    type Content;
    /// Visual cell produced for one item.
    type Cell;

    /// Row identifiers in display order.
    fn row_ids(&self) -> Vec<RowId>;

    /// Content for the cell at (`row_index`, `column`).
    fn cell_content(&self, kind: CellKind, row_index: usize, column: C) -> Option<Self::Content>;

    /// Build (or recycle) the visual cell at (`row_index`, `column`).
    fn make_cell(&self, kind: CellKind, row_index: usize, column: C) -> Self::Cell;
}

/// Reorders rows on request.
pub trait SortDelegate<C: ColumnId> {
    /// Sort by `column` in `order`, then fire `completion` exactly once.
    ///
    /// The work may happen synchronously or on another thread.
    fn perform_sort(&mut self, column: C, order: SortOrder, completion: SortCompletion<C>);
}

/// Supplies per-column widths under `SizingMode::CustomWidths`.
pub trait LayoutDelegate<C: ColumnId> {
    fn width_spec(&self, column: C) -> WidthSpec;
}

/// Surface that renders the grid.
pub trait RenderingHost<C: ColumnId> {
    /// Apply `snapshot`, diffing against the previously applied one.
    fn apply_snapshot(&mut self, snapshot: Snapshot, animate: bool);

    /// Items currently on screen.
    fn visible_items(&self) -> HashSet<ItemId>;

    /// Rendered content width of `item`, if the host can measure it.
    fn measured_content_width(&self, item: ItemId) -> Option<f64>;

    /// Install a new column layout.
    fn install_layout(&mut self, layout: LayoutDescription<C>);

    /// Width available to the grid.
    fn available_width(&self) -> f64;
}
