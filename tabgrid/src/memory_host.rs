//! Headless rendering host.
//!
//! Keeps the applied snapshot, the diff of the last apply and the installed
//! layout in memory. Visibility and measurements are set by the embedder.
//! Useful for tests and for driving the grid without a UI surface.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use crate::column::ColumnId;
use crate::host::RenderingHost;
use crate::identity::ItemId;
use crate::snapshot::{Snapshot, SnapshotDiff};
use crate::width::LayoutDescription;

#[derive(Debug, Clone)]
pub struct MemoryHost<C: ColumnId> {
    available_width: f64,
    snapshot: Snapshot,
    last_diff: Option<SnapshotDiff>,
    last_animate: bool,
    applies: usize,
    layout: Option<LayoutDescription<C>>,
    layouts_installed: usize,
    visible: Option<HashSet<ItemId>>,
    measurements: HashMap<ItemId, f64>,
    measure_requests: Cell<usize>,
}

impl<C: ColumnId> MemoryHost<C> {
    pub fn new(available_width: f64) -> Self {
        Self {
            available_width,
            snapshot: Snapshot::default(),
            last_diff: None,
            last_animate: false,
            applies: 0,
            layout: None,
            layouts_installed: 0,
            visible: None,
            measurements: HashMap::new(),
            measure_requests: Cell::new(0),
        }
    }

    pub fn set_available_width(&mut self, width: f64) {
        self.available_width = width;
    }

    /// Restrict the visible set. Without a restriction every applied item
    /// counts as visible.
    pub fn set_visible(&mut self, items: impl IntoIterator<Item = ItemId>) {
        self.visible = Some(items.into_iter().collect());
    }

    pub fn set_measurement(&mut self, item: ItemId, width: f64) {
        self.measurements.insert(item, width);
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn last_diff(&self) -> Option<&SnapshotDiff> {
        self.last_diff.as_ref()
    }

    pub fn last_animate(&self) -> bool {
        self.last_animate
    }

    /// Number of snapshots applied so far.
    pub fn applies(&self) -> usize {
        self.applies
    }

    pub fn layout(&self) -> Option<&LayoutDescription<C>> {
        self.layout.as_ref()
    }

    pub fn layouts_installed(&self) -> usize {
        self.layouts_installed
    }

    /// Number of measurement lookups served so far.
    pub fn measure_requests(&self) -> usize {
        self.measure_requests.get()
    }
}

impl<C: ColumnId> RenderingHost<C> for MemoryHost<C> {
    fn apply_snapshot(&mut self, snapshot: Snapshot, animate: bool) {
        let diff = SnapshotDiff::between(&self.snapshot, &snapshot);
        log::trace!(
            "memory host: {} section changes, {} sections with item changes",
            diff.sections.len(),
            diff.items.len()
        );
        self.snapshot = snapshot;
        self.last_diff = Some(diff);
        self.last_animate = animate;
        self.applies += 1;
    }

    fn visible_items(&self) -> HashSet<ItemId> {
        match &self.visible {
            Some(visible) => visible.clone(),
            None => self.snapshot.items().collect(),
        }
    }

    fn measured_content_width(&self, item: ItemId) -> Option<f64> {
        self.measure_requests.set(self.measure_requests.get() + 1);
        self.measurements.get(&item).copied()
    }

    fn install_layout(&mut self, layout: LayoutDescription<C>) {
        self.layout = Some(layout);
        self.layouts_installed += 1;
    }

    fn available_width(&self) -> f64 {
        self.available_width
    }
}
