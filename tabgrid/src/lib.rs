//! Virtualized table grid core.
//!
//! Maps rows × typed columns onto a flat item identity space, synthesizes
//! header/footer pseudo-rows, diffs render snapshots, solves column widths
//! and coalesces reload/layout requests. Drawing is left to a
//! [`RenderingHost`].

pub mod column;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod identity;
pub mod memory_host;
pub mod scheduler;
pub mod snapshot;
pub mod sort;
pub mod width;

pub use column::ColumnId;
pub use config::GridConfig;
pub use controller::{GridController, ResolvedCell};
pub use error::{GridError, IdentityError, LayoutError};
pub use host::{GridDataSource, LayoutDelegate, RenderingHost, SortDelegate};
pub use identity::{CellKind, ItemId, RowId};
pub use memory_host::MemoryHost;
pub use scheduler::{UiHandle, UpdateScheduler};
pub use snapshot::{Section, Snapshot, SnapshotDiff};
pub use sort::{SortCompletion, SortOrder, SortState, SortStateMachine};
pub use width::{FractionBasis, LayoutDescription, SizingMode, WidthSolver, WidthSpec};

pub mod prelude {
    pub use crate::column::ColumnId;
    pub use crate::config::GridConfig;
    pub use crate::controller::GridController;
    pub use crate::host::{GridDataSource, LayoutDelegate, RenderingHost, SortDelegate};
    pub use crate::identity::{CellKind, ItemId, RowId};
    pub use crate::sort::{SortCompletion, SortOrder, SortState};
    pub use crate::width::{SizingMode, WidthSpec};
    pub use crate::grid_columns;
}
