use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, RwLock};

use tabgrid::identity::item_id;
use tabgrid::prelude::*;
use tabgrid::{GridError, LayoutError, MemoryHost, ResolvedCell};
use tokio_util::sync::CancellationToken;

tabgrid::grid_columns! {
    enum Col {
        Name,
        Size,
        Kind,
    }
}

type SharedRows = Arc<RwLock<Vec<i64>>>;

#[derive(Clone)]
struct Rows {
    ids: SharedRows,
}

impl Rows {
    fn new(ids: &[i64]) -> Self {
        Self {
            ids: Arc::new(RwLock::new(ids.to_vec())),
        }
    }
}

impl GridDataSource<Col> for Rows {
    type Content = String;
    type Cell = (CellKind, usize, Col);

    fn row_ids(&self) -> Vec<RowId> {
        self.ids.read().unwrap().iter().copied().map(RowId).collect()
    }

    fn cell_content(&self, kind: CellKind, row_index: usize, column: Col) -> Option<String> {
        match kind {
            CellKind::Header => Some(format!("{column:?}")),
            CellKind::Footer => None,
            CellKind::Data => self
                .ids
                .read()
                .unwrap()
                .get(row_index)
                .map(|id| format!("{id}/{column:?}")),
        }
    }

    fn make_cell(&self, kind: CellKind, row_index: usize, column: Col) -> Self::Cell {
        (kind, row_index, column)
    }
}

/// Sorts the shared rows in place and completes immediately.
struct Sorter {
    rows: SharedRows,
    calls: Arc<Mutex<Vec<(Col, SortOrder)>>>,
}

impl SortDelegate<Col> for Sorter {
    fn perform_sort(&mut self, column: Col, order: SortOrder, completion: SortCompletion<Col>) {
        self.calls.lock().unwrap().push((column, order));
        {
            let mut rows = self.rows.write().unwrap();
            rows.sort();
            if order == SortOrder::Descending {
                rows.reverse();
            }
        }
        completion.complete();
    }
}

/// Sorts on a worker thread and completes from there.
struct ThreadedSorter {
    rows: SharedRows,
    workers: Arc<Mutex<Vec<std::thread::JoinHandle<()>>>>,
}

impl SortDelegate<Col> for ThreadedSorter {
    fn perform_sort(&mut self, _column: Col, order: SortOrder, completion: SortCompletion<Col>) {
        let rows = Arc::clone(&self.rows);
        let worker = std::thread::spawn(move || {
            let mut rows = rows.write().unwrap();
            rows.sort();
            if order == SortOrder::Descending {
                rows.reverse();
            }
            drop(rows);
            completion.complete();
        });
        self.workers.lock().unwrap().push(worker);
    }
}

struct FixedWidths;

impl LayoutDelegate<Col> for FixedWidths {
    fn width_spec(&self, column: Col) -> WidthSpec {
        match column {
            Col::Name => WidthSpec::FractionalWidth(1.0),
            _ => WidthSpec::Absolute(150.0),
        }
    }
}

fn grid(ids: &[i64], config: GridConfig) -> GridController<Col, Rows, MemoryHost<Col>> {
    GridController::new(MemoryHost::new(300.0), config).with_data_source(Rows::new(ids))
}

fn section_keys(controller: &GridController<Col, Rows, MemoryHost<Col>>) -> Vec<i64> {
    controller
        .host()
        .snapshot()
        .sections
        .iter()
        .map(|s| s.key.0)
        .collect()
}

// ============================================================================
// Reload
// ============================================================================

#[test]
fn test_reload_with_header_produces_header_plus_data_sections() {
    let mut controller = grid(&[10, 11, 12], GridConfig::new().headers());
    controller.reload_now(false).unwrap();

    let snapshot = controller.host().snapshot();
    assert_eq!(snapshot.section_count(), 4);
    assert_eq!(section_keys(&controller), vec![9, 10, 11, 12]);
    for section in &snapshot.sections {
        let expected: Vec<ItemId> = Col::ALL.iter().map(|c| item_id(section.key, *c)).collect();
        assert_eq!(section.items, expected);
    }
    assert_eq!(controller.generation(), 1);
}

#[test]
fn test_reload_without_data_source_is_empty() {
    let mut controller: GridController<Col, Rows, MemoryHost<Col>> =
        GridController::new(MemoryHost::new(300.0), GridConfig::new());
    controller.reload_now(true).unwrap();
    assert!(controller.host().snapshot().is_empty());
    assert_eq!(controller.host().applies(), 1);
}

#[test]
fn test_reload_without_data_source_keeps_pseudo_rows() {
    let mut controller: GridController<Col, Rows, MemoryHost<Col>> =
        GridController::new(MemoryHost::new(300.0), GridConfig::new().headers().footers());
    controller.reload_now(false).unwrap();
    assert_eq!(section_keys(&controller), vec![-1, 0]);
}

#[test]
fn test_duplicate_rows_are_reported_and_previous_generation_kept() {
    let rows = Rows::new(&[1, 2]);
    let shared = Arc::clone(&rows.ids);
    let mut controller = GridController::new(MemoryHost::new(300.0), GridConfig::new())
        .with_data_source(rows);
    controller.reload_now(false).unwrap();

    shared.write().unwrap().push(2);
    let err = controller.reload_now(false).unwrap_err();
    assert!(matches!(err, GridError::Identity(_)));
    assert_eq!(controller.generation(), 1);
    assert_eq!(section_keys(&controller), vec![1, 2]);
}

#[test]
fn test_toggling_header_inserts_one_section() {
    let mut controller = grid(&[1, 2], GridConfig::new());
    controller.reload_now(false).unwrap();

    controller.set_headers_enabled(true);
    controller.run_until_idle();

    let diff = controller.host().last_diff().unwrap();
    assert_eq!(diff.inserted_sections().collect::<Vec<_>>(), vec![RowId(0)]);
    assert_eq!(diff.deleted_sections().count(), 0);
    assert_eq!(diff.moved_sections().count(), 0);
    assert!(controller.host().last_animate());
}

#[test]
fn test_hidden_header_keeps_enabled_flag() {
    let mut controller = grid(&[1, 2], GridConfig::new().headers());
    controller.set_headers_hidden(true);
    controller.run_until_idle();
    assert_eq!(section_keys(&controller), vec![1, 2]);
    assert!(controller.config().headers_enabled);

    controller.set_headers_hidden(false);
    controller.run_until_idle();
    assert_eq!(section_keys(&controller), vec![0, 1, 2]);
}

#[test]
fn test_swapping_data_source_reloads_once_without_animation() {
    let mut controller = grid(&[1, 2], GridConfig::new().headers());
    controller.reload_now(true).unwrap();

    controller.set_data_source(Some(Rows::new(&[5, 6, 7])));
    controller.run_until_idle();

    assert_eq!(controller.host().applies(), 2);
    assert!(!controller.host().last_animate());
    assert_eq!(section_keys(&controller), vec![4, 5, 6, 7]);
    assert_eq!(controller.data_source().map(|d| d.row_ids().len()), Some(3));
    assert_eq!(
        controller.content(item_id(RowId(6), Col::Name)).as_deref(),
        Some("6/Name")
    );
}

#[test]
fn test_clearing_data_source_leaves_pseudo_rows() {
    let mut controller = grid(&[1, 2], GridConfig::new().headers().footers());
    controller.set_data_source(None);
    controller.run_until_idle();

    assert_eq!(controller.host().applies(), 1);
    assert_eq!(section_keys(&controller), vec![-1, 0]);
    assert!(controller.data_source().is_none());
}

// ============================================================================
// Coalescing
// ============================================================================

#[test]
fn test_five_reload_requests_apply_once() {
    let mut controller = grid(&[1, 2, 3], GridConfig::new());
    for _ in 0..5 {
        controller.request_reload(true);
    }
    controller.run_until_idle();
    assert_eq!(controller.host().applies(), 1);
}

#[test]
fn test_cross_thread_requests_coalesce() {
    let mut controller = grid(&[1, 2, 3], GridConfig::new());
    let handle = controller.handle();
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            std::thread::spawn(move || handle.request_reload(false))
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    controller.run_until_idle();
    assert_eq!(controller.host().applies(), 1);
}

#[test]
fn test_request_after_pass_starts_new_cycle() {
    let mut controller = grid(&[1], GridConfig::new());
    controller.request_reload(false);
    controller.run_until_idle();
    controller.request_reload(false);
    controller.run_until_idle();
    assert_eq!(controller.host().applies(), 2);
    assert_eq!(controller.generation(), 2);
}

#[test]
fn test_idle_turn_reports_no_progress() {
    let mut controller = grid(&[1], GridConfig::new());
    assert!(!controller.run_turn());
}

#[tokio::test]
async fn test_run_drives_requests_until_cancelled() {
    let mut controller = grid(&[1, 2, 3], GridConfig::new().headers());
    let handle = controller.handle();
    let token = CancellationToken::new();
    let stop = token.clone();

    let producer = async move {
        for _ in 0..3 {
            handle.request_reload(false);
        }
        handle.request_layout();
        tokio::task::yield_now().await;
        stop.cancel();
    };
    tokio::join!(controller.run(token), producer);

    assert_eq!(controller.host().applies(), 1);
    assert_eq!(controller.host().layouts_installed(), 1);
    assert_eq!(controller.host().snapshot().section_count(), 4);
}

// ============================================================================
// Sorting
// ============================================================================

fn sortable_grid(ids: &[i64]) -> (
    GridController<Col, Rows, MemoryHost<Col>>,
    Arc<Mutex<Vec<(Col, SortOrder)>>>,
) {
    let rows = Rows::new(ids);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sorter = Sorter {
        rows: Arc::clone(&rows.ids),
        calls: Arc::clone(&calls),
    };
    let controller = GridController::new(MemoryHost::new(300.0), GridConfig::new().headers())
        .with_data_source(rows)
        .with_sort_delegate(sorter);
    (controller, calls)
}

#[test]
fn test_sort_same_column_twice() {
    let (mut controller, calls) = sortable_grid(&[3, 1, 2]);
    controller.request_sort(Col::Size);
    assert_eq!(controller.sort_state(Col::Size), SortState::Ascending);
    controller.request_sort(Col::Size);
    assert_eq!(controller.sort_state(Col::Size), SortState::Descending);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![(Col::Size, SortOrder::Ascending), (Col::Size, SortOrder::Descending)]
    );
}

#[test]
fn test_sort_other_column_resets_previous() {
    let (mut controller, _) = sortable_grid(&[3, 1, 2]);
    let handle = controller.handle();
    handle.request_sort(Col::Name);
    handle.request_sort(Col::Kind);
    controller.run_until_idle();
    assert_eq!(controller.sort_state(Col::Name), SortState::Unknown);
    assert_eq!(controller.sort_state(Col::Kind), SortState::Ascending);
}

#[test]
fn test_sort_completion_reloads_without_animation() {
    let (mut controller, _) = sortable_grid(&[3, 1, 2]);
    controller.reload_now(true).unwrap();
    controller.request_sort(Col::Name);
    controller.run_until_idle();

    assert_eq!(controller.host().applies(), 2);
    assert!(!controller.host().last_animate());
    assert_eq!(section_keys(&controller), vec![0, 1, 2, 3]);
    let diff = controller.host().last_diff().unwrap();
    assert_eq!(diff.inserted_sections().count(), 0);
    assert!(diff.moved_sections().count() > 0);
}

#[test]
fn test_sort_completed_from_worker_thread() {
    let rows = Rows::new(&[2, 3, 1]);
    let workers = Arc::new(Mutex::new(Vec::new()));
    let sorter = ThreadedSorter {
        rows: Arc::clone(&rows.ids),
        workers: Arc::clone(&workers),
    };
    let mut controller = GridController::new(MemoryHost::new(300.0), GridConfig::new())
        .with_data_source(rows)
        .with_sort_delegate(sorter);

    controller.request_sort(Col::Name);
    controller.request_sort(Col::Name);
    for worker in workers.lock().unwrap().drain(..) {
        worker.join().unwrap();
    }
    controller.run_until_idle();

    assert_eq!(controller.host().applies(), 1);
    assert_eq!(controller.sort_state(Col::Name), SortState::Descending);
}

#[test]
fn test_sort_without_delegate_still_reloads() {
    let mut controller = grid(&[1, 2], GridConfig::new().headers());
    controller.request_sort(Col::Kind);
    controller.run_until_idle();
    assert_eq!(controller.sort_state(Col::Kind), SortState::Ascending);
    assert_eq!(controller.host().applies(), 1);
}

// ============================================================================
// Cell Resolution
// ============================================================================

#[test]
fn test_resolve_cell_translates_row_index_past_header() {
    let mut controller = grid(&[10, 11, 12], GridConfig::new().headers().footers());
    controller.reload_now(false).unwrap();

    let header = controller.resolve_cell(item_id(RowId(9), Col::Size)).unwrap();
    assert_eq!(header.kind, CellKind::Header);
    assert_eq!(header.row_index, 0);

    let data = controller.resolve_cell(item_id(RowId(11), Col::Kind)).unwrap();
    assert_eq!(
        data,
        ResolvedCell {
            item: item_id(RowId(11), Col::Kind),
            row: RowId(11),
            column: Col::Kind,
            kind: CellKind::Data,
            rendered_index: 2,
            row_index: 1,
        }
    );

    let footer = controller.resolve_cell(item_id(RowId(13), Col::Name)).unwrap();
    assert_eq!(footer.kind, CellKind::Footer);
    assert_eq!(footer.row_index, 3);
}

#[test]
fn test_resolve_cell_without_header() {
    let mut controller = grid(&[10, 11], GridConfig::new());
    controller.reload_now(false).unwrap();
    let cell = controller.resolve_cell(item_id(RowId(10), Col::Name)).unwrap();
    assert_eq!(cell.kind, CellKind::Data);
    assert_eq!(cell.row_index, 0);
}

#[test]
fn test_resolve_unknown_item() {
    let mut controller = grid(&[10], GridConfig::new());
    controller.reload_now(false).unwrap();
    assert_eq!(controller.resolve_cell(item_id(RowId(99), Col::Name)), None);
}

#[test]
fn test_content_and_cell_come_from_data_source() {
    let mut controller = grid(&[10, 11], GridConfig::new().headers());
    controller.reload_now(false).unwrap();

    assert_eq!(
        controller.content(item_id(RowId(9), Col::Size)).as_deref(),
        Some("Size")
    );
    assert_eq!(
        controller.content(item_id(RowId(11), Col::Name)).as_deref(),
        Some("11/Name")
    );
    assert_eq!(
        controller.cell(item_id(RowId(10), Col::Kind)),
        Some((CellKind::Data, 0, Col::Kind))
    );
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_equal_widths_layout() {
    let mut controller = grid(&[1], GridConfig::new().gap(4.0));
    controller.set_sizing_mode(SizingMode::EqualWidths);
    controller.run_until_idle();

    let layout = controller.host().layout().unwrap();
    assert_eq!(layout.spacing, 4.0);
    assert!((layout.fraction_total() - 1.0).abs() < 1e-9);
}

#[test]
fn test_custom_layout_infeasible_is_reported() {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);
    let mut controller = grid(&[1], GridConfig::new().sizing_mode(SizingMode::CustomWidths))
        .with_layout_delegate(FixedWidths)
        .on_error(move |err| sink.borrow_mut().push(err.clone()));

    controller.request_layout();
    controller.run_until_idle();

    assert!(controller.host().layout().is_none());
    assert_eq!(
        *errors.borrow(),
        vec![GridError::Layout(LayoutError::Infeasible {
            fixed: 300.0,
            available: 300.0
        })]
    );
}

#[test]
fn test_custom_layout_with_room() {
    let mut controller = grid(&[1], GridConfig::new().sizing_mode(SizingMode::CustomWidths))
        .with_layout_delegate(FixedWidths);
    controller.host_mut().set_available_width(600.0);
    controller.update_layout_now().unwrap();

    let layout = controller.host().layout().unwrap();
    let name = layout.width(Col::Name).and_then(|w| w.fraction()).unwrap();
    assert!((name - 0.5).abs() < 1e-9);
}

#[test]
fn test_fit_visible_content_uses_fallback() {
    let mut controller = grid(&[1, 2, 3], GridConfig::new());
    controller.reload_now(false).unwrap();

    let host = controller.host_mut();
    host.set_visible([item_id(RowId(1), Col::Name), item_id(RowId(1), Col::Size)]);
    host.set_measurement(item_id(RowId(1), Col::Name), 40.0);
    host.set_measurement(item_id(RowId(1), Col::Size), 100.0);

    controller.set_sizing_mode(SizingMode::FitVisibleContent);
    controller.run_until_idle();

    let layout = controller.host().layout().unwrap();
    // Kind has no visible cell: 300 / 3 = 100
    let kind = layout.width(Col::Kind).and_then(|w| w.fraction()).unwrap();
    assert!((kind - 100.0 / 240.0).abs() < 1e-9);
    assert!((layout.fraction_total() - 1.0).abs() < 1e-9);
}

#[test]
fn test_fit_all_content_measures_every_cell() {
    let mut controller = grid(&[1, 2, 3, 4], GridConfig::new().headers());
    controller.set_sizing_mode(SizingMode::FitAllContent);
    controller.reload_now(false).unwrap();
    controller.run_until_idle();

    // 5 rendered rows (header + 4) x 3 columns
    assert_eq!(controller.host().measure_requests(), 15);
    assert_eq!(controller.host().layouts_installed(), 1);
}

#[test]
fn test_visible_content_change_only_matters_for_fit_visible() {
    let mut controller = grid(&[1], GridConfig::new());
    controller.visible_content_changed();
    assert!(!controller.run_turn());

    controller.set_sizing_mode(SizingMode::FitVisibleContent);
    controller.run_until_idle();
    controller.visible_content_changed();
    controller.run_until_idle();
    assert_eq!(controller.host().layouts_installed(), 2);
}
