//! Item identity space.
//!
//! Every rendered cell is addressed by a flat [`ItemId`] derived from its row
//! identifier and column ordinal:
//!
//! ```text
//! item = ordinal(column) + column_count * row
//! ```
//!
//! Header and footer rows are synthesized by picking row identifiers just
//! outside the live data range (`min - 1` and `max + 1`), so they can never
//! collide with a data row and the mapping stays injective.

use std::collections::HashSet;
use std::fmt;

use crate::column::ColumnId;
use crate::error::IdentityError;

/// Stable identifier of one logical row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub i64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row#{}", self.0)
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Flat identifier of one renderable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// What a rendered row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Data,
    Header,
    Footer,
}

/// One rendered row after expansion: its identifier and its columns in
/// ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedRow<C: ColumnId> {
    pub row: RowId,
    pub kind: CellKind,
    pub columns: Vec<C>,
}

impl<C: ColumnId> ExpandedRow<C> {
    /// Item identities of this row, in column order.
    pub fn items(&self) -> Vec<ItemId> {
        self.columns.iter().map(|c| item_id(self.row, *c)).collect()
    }
}

/// Row identifier used for a synthesized header row.
pub fn header_row_id(rows: &[RowId]) -> Option<RowId> {
    match rows.iter().min() {
        Some(min) => min.0.checked_sub(1).map(RowId),
        None => Some(RowId(-1)),
    }
}

/// Row identifier used for a synthesized footer row.
pub fn footer_row_id(rows: &[RowId]) -> Option<RowId> {
    match rows.iter().max() {
        Some(max) => max.0.checked_add(1).map(RowId),
        None => Some(RowId(0)),
    }
}

/// Expand data rows into rendered rows, adding header and footer pseudo-rows.
///
/// Fails when a row identifier repeats or when any row (synthesized ones
/// included) cannot be represented as item identities.
pub fn expand<C: ColumnId>(
    rows: &[RowId],
    include_header: bool,
    include_footer: bool,
) -> Result<Vec<ExpandedRow<C>>, IdentityError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(*row) {
            return Err(IdentityError::DuplicateRow { row: row.0 });
        }
    }

    let columns = C::ALL.to_vec();
    let mut expanded = Vec::with_capacity(rows.len() + 2);

    if include_header {
        let row = header_row_id(rows).ok_or_else(|| out_of_range::<C>(rows, true))?;
        expanded.push(ExpandedRow {
            row,
            kind: CellKind::Header,
            columns: columns.clone(),
        });
    }

    for row in rows {
        expanded.push(ExpandedRow {
            row: *row,
            kind: CellKind::Data,
            columns: columns.clone(),
        });
    }

    if include_footer {
        let row = footer_row_id(rows).ok_or_else(|| out_of_range::<C>(rows, false))?;
        expanded.push(ExpandedRow {
            row,
            kind: CellKind::Footer,
            columns,
        });
    }

    for entry in &expanded {
        check_representable::<C>(entry.row)?;
    }

    Ok(expanded)
}

fn out_of_range<C: ColumnId>(rows: &[RowId], low: bool) -> IdentityError {
    let edge = if low { rows.iter().min() } else { rows.iter().max() };
    IdentityError::RowOutOfRange {
        row: edge.map_or(0, |r| r.0),
        columns: C::count(),
    }
}

fn check_representable<C: ColumnId>(row: RowId) -> Result<(), IdentityError> {
    let n = C::count() as i64;
    let fits = row
        .0
        .checked_mul(n)
        .and_then(|base| base.checked_add(n.saturating_sub(1)))
        .is_some();
    if fits {
        Ok(())
    } else {
        Err(IdentityError::RowOutOfRange {
            row: row.0,
            columns: C::count(),
        })
    }
}

/// Item identity of the cell at (`row`, `column`).
///
/// Rows accepted by [`expand`] never overflow.
pub fn item_id<C: ColumnId>(row: RowId, column: C) -> ItemId {
    let n = C::count() as i64;
    ItemId(column.ordinal() as i64 + n * row.0)
}

/// Exact inverse of [`item_id`].
///
/// # Panics
///
/// Panics if the identity maps to an ordinal the column enumeration does not
/// define. That only happens when the host hands back an identity this crate
/// never issued, or when the enumeration's ordinals are not dense.
pub fn decompose<C: ColumnId>(item: ItemId) -> (RowId, C) {
    let n = C::count() as i64;
    assert!(n > 0, "cannot decompose {item} with an empty column enumeration");
    let row = item.0.div_euclid(n);
    let ordinal = item.0.rem_euclid(n) as usize;
    match C::from_ordinal(ordinal) {
        Some(column) => (RowId(row), column),
        None => panic!(
            "{item} decomposes to column ordinal {ordinal}, outside the {n}-member enumeration"
        ),
    }
}

/// Kind of the row rendered at `row_index` out of `total_rows`.
///
/// The header wins when a single row would qualify as both; with both pseudo
/// rows present there are always at least two rendered rows.
pub fn classify(
    row_index: usize,
    total_rows: usize,
    include_header: bool,
    include_footer: bool,
) -> CellKind {
    if include_header && row_index == 0 {
        CellKind::Header
    } else if include_footer && total_rows > 0 && row_index == total_rows - 1 {
        CellKind::Footer
    } else {
        CellKind::Data
    }
}
