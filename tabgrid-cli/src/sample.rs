//! Sample file listing used by the demo.

use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

use tabgrid::prelude::*;

tabgrid::grid_columns! {
    /// Columns of the sample listing.
    pub enum FileColumn {
        Name,
        Size,
        Owner,
        Kind,
    }
}

impl FileColumn {
    pub fn title(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Size => "Size",
            Self::Owner => "Owner",
            Self::Kind => "Kind",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub id: i64,
    pub name: String,
    pub size: u64,
    pub owner: String,
    pub kind: &'static str,
}

impl FileRow {
    fn field(&self, column: FileColumn) -> String {
        match column {
            FileColumn::Name => self.name.clone(),
            FileColumn::Size => format_size(self.size),
            FileColumn::Owner => self.owner.clone(),
            FileColumn::Kind => self.kind.to_string(),
        }
    }

    fn compare(&self, other: &Self, column: FileColumn) -> Ordering {
        match column {
            FileColumn::Name => self.name.cmp(&other.name),
            FileColumn::Size => self.size.cmp(&other.size),
            FileColumn::Owner => self.owner.cmp(&other.owner),
            FileColumn::Kind => self.kind.cmp(other.kind),
        }
        .then(self.id.cmp(&other.id))
    }
}

const STEMS: &[&str] = &[
    "notes",
    "résumé",
    "報告書",
    "build",
    "photo",
    "archive",
    "README",
    "données",
];
const OWNERS: &[&str] = &["alice", "bob", "chloé", "dmitri", "eun-ji"];
const KINDS: &[(&str, &str)] = &[
    ("txt", "Text"),
    ("pdf", "Document"),
    ("png", "Image"),
    ("tar.gz", "Archive"),
    ("rs", "Source"),
];

/// Deterministic listing of `count` files. Row ids are spread out and not
/// in display order.
pub fn generate(count: usize) -> Vec<FileRow> {
    (0..count)
        .map(|i| {
            let (ext, kind) = KINDS[i % KINDS.len()];
            FileRow {
                id: ((i as i64) * 7919) % 10_007 + 100,
                name: format!("{}-{i}.{ext}", STEMS[(i * 3) % STEMS.len()]),
                size: ((i as u64 + 1) * 48_271) % 9_000_000,
                owner: OWNERS[(i * 7) % OWNERS.len()].to_string(),
                kind,
            }
        })
        .collect()
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

pub type SharedRows = Arc<RwLock<Vec<FileRow>>>;

/// Data source over a shared row list.
#[derive(Debug, Clone)]
pub struct SampleData {
    rows: SharedRows,
}

impl SampleData {
    pub fn new(rows: Vec<FileRow>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    pub fn rows(&self) -> SharedRows {
        Arc::clone(&self.rows)
    }

    fn footer(&self, column: FileColumn) -> Option<String> {
        let rows = self.rows.read().ok()?;
        match column {
            FileColumn::Name => Some(format!("{} files", rows.len())),
            FileColumn::Size => Some(format_size(rows.iter().map(|r| r.size).sum())),
            FileColumn::Owner | FileColumn::Kind => None,
        }
    }
}

impl GridDataSource<FileColumn> for SampleData {
    type Content = String;
    type Cell = String;

    fn row_ids(&self) -> Vec<RowId> {
        self.rows
            .read()
            .map(|rows| rows.iter().map(|r| RowId(r.id)).collect())
            .unwrap_or_default()
    }

    fn cell_content(&self, kind: CellKind, row_index: usize, column: FileColumn) -> Option<String> {
        match kind {
            CellKind::Header => Some(column.title().to_string()),
            CellKind::Footer => self.footer(column),
            CellKind::Data => self
                .rows
                .read()
                .ok()?
                .get(row_index)
                .map(|row| row.field(column)),
        }
    }

    fn make_cell(&self, kind: CellKind, row_index: usize, column: FileColumn) -> String {
        self.cell_content(kind, row_index, column).unwrap_or_default()
    }
}

/// Sorts the shared rows in place, then completes.
#[derive(Debug)]
pub struct SampleSorter {
    rows: SharedRows,
}

impl SampleSorter {
    pub fn new(rows: SharedRows) -> Self {
        Self { rows }
    }
}

impl SortDelegate<FileColumn> for SampleSorter {
    fn perform_sort(
        &mut self,
        column: FileColumn,
        order: SortOrder,
        completion: SortCompletion<FileColumn>,
    ) {
        if let Ok(mut rows) = self.rows.write() {
            rows.sort_by(|a, b| match order {
                SortOrder::Ascending => a.compare(b, column),
                SortOrder::Descending => b.compare(a, column),
            });
            log::debug!("sorted {} rows by {column:?} {order:?}", rows.len());
        }
        completion.complete();
    }
}

/// Fixed widths for the numeric columns, the rest share what is left.
#[derive(Debug, Clone, Copy)]
pub struct SampleLayout;

impl LayoutDelegate<FileColumn> for SampleLayout {
    fn width_spec(&self, column: FileColumn) -> WidthSpec {
        match column {
            FileColumn::Name => WidthSpec::FractionalWidth(0.6),
            FileColumn::Size => WidthSpec::Absolute(10.0),
            FileColumn::Owner => WidthSpec::Estimated(8.0),
            FileColumn::Kind => WidthSpec::FractionalWidth(0.4),
        }
    }
}
