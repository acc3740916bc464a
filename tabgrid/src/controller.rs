//! Grid controller - owns configuration and derived state, and drives the
//! collaborators.
//!
//! All mutation happens on the UI context, one turn at a time:
//!
//! 1. messages submitted through [`UiHandle`]s are marshalled in,
//! 2. coalesced reload/layout resolutions due this turn run.
//!
//! Call [`GridController::run_turn`] from an existing UI loop, or hand the
//! controller to [`GridController::run`] on a tokio runtime.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::column::ColumnId;
use crate::config::GridConfig;
use crate::error::GridError;
use crate::host::{GridDataSource, LayoutDelegate, RenderingHost, SortDelegate};
use crate::identity::{CellKind, ExpandedRow, ItemId, RowId, classify, decompose, expand};
use crate::scheduler::{DueWork, UiHandle, UiMessage, UpdateScheduler};
use crate::snapshot::{Section, Snapshot};
use crate::sort::{SortCompletion, SortState, SortStateMachine};
use crate::width::{Measurement, SizingMode, WidthSolver, WidthSpec, measure_positions};

/// Error hook invoked when a scheduled pass fails.
pub type ErrorHook = Box<dyn Fn(&GridError)>;

/// Where an item sits in the current render generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCell<C> {
    pub item: ItemId,
    pub row: RowId,
    pub column: C,
    pub kind: CellKind,
    /// Position among all rendered rows, pseudo-rows included.
    pub rendered_index: usize,
    /// Position among data rows, as the data source sees it.
    pub row_index: usize,
}

/// Rendered rows of one generation and the visibility they were built with.
#[derive(Debug, Clone)]
struct Generation<C: ColumnId> {
    rows: Vec<ExpandedRow<C>>,
    positions: HashMap<RowId, usize>,
    headers: bool,
    footers: bool,
}

impl<C: ColumnId> Default for Generation<C> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            positions: HashMap::new(),
            headers: false,
            footers: false,
        }
    }
}

/// Orchestrates identity expansion, width solving, sorting and scheduling
/// for one table.
pub struct GridController<C, D, H>
where
    C: ColumnId,
    D: GridDataSource<C>,
    H: RenderingHost<C>,
{
    config: GridConfig,
    data: Option<D>,
    host: H,
    sorter: Option<Box<dyn SortDelegate<C>>>,
    layout_delegate: Option<Box<dyn LayoutDelegate<C>>>,
    sort: SortStateMachine<C>,
    scheduler: UpdateScheduler<C>,
    current: Generation<C>,
    generation: u64,
    on_error: Option<ErrorHook>,
}

impl<C, D, H> GridController<C, D, H>
where
    C: ColumnId,
    D: GridDataSource<C>,
    H: RenderingHost<C>,
{
    /// Create a controller with no data source attached.
    pub fn new(host: H, config: GridConfig) -> Self {
        Self {
            config,
            data: None,
            host,
            sorter: None,
            layout_delegate: None,
            sort: SortStateMachine::new(),
            scheduler: UpdateScheduler::new(),
            current: Generation::default(),
            generation: 0,
            on_error: None,
        }
    }

    pub fn with_data_source(mut self, data: D) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_sort_delegate(mut self, delegate: impl SortDelegate<C> + 'static) -> Self {
        self.sorter = Some(Box::new(delegate));
        self
    }

    pub fn with_layout_delegate(mut self, delegate: impl LayoutDelegate<C> + 'static) -> Self {
        self.layout_delegate = Some(Box::new(delegate));
        self
    }

    /// Set the hook called when a scheduled pass fails. Without one, failures
    /// are logged at error level.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&GridError) + 'static,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn data_source(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// Replace the data source and schedule a non-animated reload.
    pub fn set_data_source(&mut self, data: Option<D>) {
        self.data = data;
        self.scheduler.request_reload(false);
    }

    /// Render generation, bumped on every applied reload.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sort_state(&self, column: C) -> SortState {
        self.sort.state(column)
    }

    /// Capability for submitting requests from other threads.
    pub fn handle(&self) -> UiHandle<C> {
        self.scheduler.handle()
    }

    /// Rows of the current render generation, in display order.
    pub fn rendered_rows(&self) -> &[ExpandedRow<C>] {
        &self.current.rows
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    pub fn set_headers_enabled(&mut self, enabled: bool) {
        self.config.headers_enabled = enabled;
        self.scheduler.request_reload(true);
    }

    pub fn set_headers_hidden(&mut self, hidden: bool) {
        self.config.headers_hidden = hidden;
        self.scheduler.request_reload(true);
    }

    pub fn set_footers_enabled(&mut self, enabled: bool) {
        self.config.footers_enabled = enabled;
        self.scheduler.request_reload(true);
    }

    pub fn set_footers_hidden(&mut self, hidden: bool) {
        self.config.footers_hidden = hidden;
        self.scheduler.request_reload(true);
    }

    pub fn set_sizing_mode(&mut self, mode: SizingMode) {
        self.config.sizing_mode = mode;
        self.scheduler.request_layout();
    }

    pub fn set_gap(&mut self, gap: f64) {
        self.config.gap = gap;
        self.scheduler.request_layout();
    }

    // -------------------------------------------------------------------------
    // Requests (coalesced)
    // -------------------------------------------------------------------------

    pub fn request_reload(&mut self, animate: bool) {
        self.scheduler.request_reload(animate);
    }

    pub fn request_layout(&mut self) {
        self.scheduler.request_layout();
    }

    /// Notify the controller that the visible region changed (scrolling,
    /// resizing). Only fit-to-visible layouts depend on it.
    pub fn visible_content_changed(&mut self) {
        if self.config.sizing_mode == SizingMode::FitVisibleContent {
            self.scheduler.request_layout();
        }
    }

    /// Advance the sort state of `column` and ask the sort delegate to
    /// reorder. The reload follows once the delegate completes.
    pub fn request_sort(&mut self, column: C) {
        let order = self.sort.request(column);
        let completion = SortCompletion::new(self.scheduler.handle());
        match self.sorter.as_mut() {
            Some(sorter) => sorter.perform_sort(column, order, completion),
            None => {
                log::debug!("no sort delegate, refreshing indicators only");
                completion.complete();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Immediate passes
    // -------------------------------------------------------------------------

    /// Rebuild the snapshot from the data source and hand it to the host.
    ///
    /// On error the previous generation stays in place.
    pub fn reload_now(&mut self, animate: bool) -> Result<(), GridError> {
        let rows = self
            .data
            .as_ref()
            .map(|data| data.row_ids())
            .unwrap_or_default();
        let headers = self.config.headers_visible();
        let footers = self.config.footers_visible();
        let expanded = expand::<C>(&rows, headers, footers)?;

        let snapshot = Snapshot::new(
            expanded
                .iter()
                .map(|row| Section {
                    key: row.row,
                    items: row.items(),
                })
                .collect(),
        );
        let positions = expanded
            .iter()
            .enumerate()
            .map(|(i, row)| (row.row, i))
            .collect();

        self.current = Generation {
            rows: expanded,
            positions,
            headers,
            footers,
        };
        self.generation += 1;
        log::debug!(
            "reload generation {}: {} sections (animate={animate})",
            self.generation,
            snapshot.section_count()
        );
        self.host.apply_snapshot(snapshot, animate);

        if self.config.sizing_mode.measures_content() {
            self.scheduler.request_layout();
        }
        Ok(())
    }

    /// Solve column widths for the current mode and install them on the host.
    pub fn update_layout_now(&mut self) -> Result<(), GridError> {
        let mode = self.config.sizing_mode;
        let solver = WidthSolver::new(self.host.available_width(), self.config.gap);
        let measurements = self.measure(mode);

        let custom = self
            .layout_delegate
            .as_deref()
            .map(|delegate| move |column: C| delegate.width_spec(column));
        let layout = solver.solve(
            mode,
            custom.as_ref().map(|f| f as &dyn Fn(C) -> WidthSpec),
            &measurements,
        )?;

        log::debug!("layout {mode:?}: {} columns", layout.columns.len());
        self.host.install_layout(layout);
        Ok(())
    }

    fn measure(&self, mode: SizingMode) -> Vec<Measurement<C>> {
        let host = &self.host;
        match mode {
            SizingMode::FitVisibleContent => {
                let mut visible: Vec<ItemId> = host.visible_items().into_iter().collect();
                visible.sort();
                let positions = visible
                    .into_iter()
                    .map(decompose::<C>)
                    .filter(|(row, _)| self.current.positions.contains_key(row));
                measure_positions(positions, |item| host.measured_content_width(item))
            }
            SizingMode::FitAllContent => {
                let positions = self
                    .current
                    .rows
                    .iter()
                    .flat_map(|row| row.columns.iter().map(move |c| (row.row, *c)));
                measure_positions(positions, |item| host.measured_content_width(item))
            }
            SizingMode::EqualWidths | SizingMode::CustomWidths => Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Cell resolution
    // -------------------------------------------------------------------------

    /// Locate `item` in the current generation.
    ///
    /// Returns `None` for identities that are not part of the last applied
    /// snapshot.
    pub fn resolve_cell(&self, item: ItemId) -> Option<ResolvedCell<C>> {
        let (row, column) = decompose::<C>(item);
        let rendered_index = *self.current.positions.get(&row)?;
        let total = self.current.rows.len();
        let kind = classify(
            rendered_index,
            total,
            self.current.headers,
            self.current.footers,
        );
        let row_index = match kind {
            CellKind::Header => 0,
            CellKind::Data | CellKind::Footer => {
                rendered_index - usize::from(self.current.headers)
            }
        };
        Some(ResolvedCell {
            item,
            row,
            column,
            kind,
            rendered_index,
            row_index,
        })
    }

    /// Visual cell for `item`, built by the data source.
    pub fn cell(&self, item: ItemId) -> Option<D::Cell> {
        let resolved = self.resolve_cell(item)?;
        let data = self.data.as_ref()?;
        Some(data.make_cell(resolved.kind, resolved.row_index, resolved.column))
    }

    /// Content for `item`, as supplied by the data source.
    pub fn content(&self, item: ItemId) -> Option<D::Content> {
        let resolved = self.resolve_cell(item)?;
        self.data
            .as_ref()?
            .cell_content(resolved.kind, resolved.row_index, resolved.column)
    }

    // -------------------------------------------------------------------------
    // UI context
    // -------------------------------------------------------------------------

    fn handle_message(&mut self, message: UiMessage<C>) {
        match message {
            UiMessage::RequestReload { animate } => self.scheduler.request_reload(animate),
            UiMessage::RequestLayout => self.scheduler.request_layout(),
            UiMessage::RequestSort(column) => self.request_sort(column),
        }
    }

    fn report(&self, err: &GridError) {
        match &self.on_error {
            Some(hook) => hook(err),
            None => log::error!("grid update failed: {err}"),
        }
    }

    /// Run one turn of the UI context.
    ///
    /// Returns `false` when there was nothing to do.
    pub fn run_turn(&mut self) -> bool {
        let mut progressed = false;
        while let Some(message) = self.scheduler.try_recv() {
            self.handle_message(message);
            progressed = true;
        }

        if self.scheduler.has_resolutions() {
            progressed = true;
            for work in self.scheduler.take_due() {
                let result = match work {
                    DueWork::Reload { animate } => self.reload_now(animate),
                    DueWork::Layout => self.update_layout_now(),
                };
                if let Err(err) = result {
                    self.report(&err);
                }
            }
        }
        progressed
    }

    /// Run turns until no messages or resolutions remain.
    pub fn run_until_idle(&mut self) {
        while self.run_turn() {}
    }

    /// Drive the UI context until `shutdown` is cancelled.
    ///
    /// Messages already delivered when the token fires are still processed.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        loop {
            self.run_until_idle();
            let message = tokio::select! {
                biased;
                message = self.scheduler.recv() => message,
                _ = shutdown.cancelled() => None,
            };
            match message {
                Some(message) => self.handle_message(message),
                None => break,
            }
        }
        self.run_until_idle();
        log::debug!("grid controller stopped at generation {}", self.generation);
    }
}
