//! Column sort state.
//!
//! At most one column carries a sort direction at a time. Requesting a sort
//! clears every column first, then advances the requested one:
//!
//! ```text
//! Unknown | Descending -> Ascending
//! Ascending            -> Descending
//! ```
//!
//! The machine only tracks state. Reordering rows is the sort delegate's job,
//! and it reports back through a [`SortCompletion`].

use std::collections::HashMap;

use crate::column::ColumnId;
use crate::scheduler::UiHandle;

/// Direction to sort in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort indicator state of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortState {
    Ascending,
    Descending,
    #[default]
    Unknown,
}

impl From<SortOrder> for SortState {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Ascending => Self::Ascending,
            SortOrder::Descending => Self::Descending,
        }
    }
}

/// Per-column sort state with cross-column exclusivity.
#[derive(Debug, Clone)]
pub struct SortStateMachine<C: ColumnId> {
    states: HashMap<C, SortState>,
}

impl<C: ColumnId> Default for SortStateMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ColumnId> SortStateMachine<C> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Current state of `column`.
    pub fn state(&self, column: C) -> SortState {
        self.states.get(&column).copied().unwrap_or_default()
    }

    /// The column currently sorted, with its order.
    pub fn sorted_column(&self) -> Option<(C, SortOrder)> {
        self.states.iter().find_map(|(column, state)| match state {
            SortState::Ascending => Some((*column, SortOrder::Ascending)),
            SortState::Descending => Some((*column, SortOrder::Descending)),
            SortState::Unknown => None,
        })
    }

    /// Advance `column` and reset every other column.
    ///
    /// Returns the order the caller should sort by.
    pub fn request(&mut self, column: C) -> SortOrder {
        let order = match self.state(column) {
            SortState::Unknown | SortState::Descending => SortOrder::Ascending,
            SortState::Ascending => SortOrder::Descending,
        };
        self.states.clear();
        self.states.insert(column, order.into());
        log::debug!("sort {column:?} {order:?}");
        order
    }

    /// Clear every column's indicator.
    pub fn reset(&mut self) {
        self.states.clear();
    }
}

/// One-shot signal a sort delegate fires once the reorder is applied.
///
/// Consuming the token queues a non-animated reload on the UI context. It is
/// `Send`, so the delegate may complete from a worker thread.
#[derive(Debug)]
#[must_use = "the grid only reloads once the completion fires"]
pub struct SortCompletion<C> {
    handle: UiHandle<C>,
}

impl<C: ColumnId> SortCompletion<C> {
    pub(crate) fn new(handle: UiHandle<C>) -> Self {
        Self { handle }
    }

    /// Signal that the rows have been reordered.
    pub fn complete(self) {
        self.handle.request_reload(false);
    }
}
