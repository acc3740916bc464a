//! Plain-text rendering host.
//!
//! Cells are measured in terminal columns with `unicode-width`, so wide
//! glyphs take two cells and combining marks take none.

use std::collections::{HashMap, HashSet};

use tabgrid::snapshot::{Section, Snapshot, SnapshotDiff};
use tabgrid::{ColumnId, ItemId, LayoutDescription, RenderingHost};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

pub struct TextHost<C: ColumnId> {
    width: usize,
    viewport: Option<usize>,
    snapshot: Snapshot,
    layout: Option<LayoutDescription<C>>,
    text: HashMap<ItemId, String>,
}

impl<C: ColumnId> TextHost<C> {
    /// Host `width` terminal columns wide showing the first `viewport` rows,
    /// or every row when `None`.
    pub fn new(width: usize, viewport: Option<usize>) -> Self {
        Self {
            width,
            viewport,
            snapshot: Snapshot::default(),
            layout: None,
            text: HashMap::new(),
        }
    }

    /// Replace the known text of every item.
    pub fn set_text(&mut self, text: HashMap<ItemId, String>) {
        self.text = text;
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn visible_sections(&self) -> &[Section] {
        let sections = &self.snapshot.sections;
        match self.viewport {
            Some(rows) => &sections[..rows.min(sections.len())],
            None => sections,
        }
    }

    /// Concrete column widths for the installed layout, equal split before
    /// the first layout arrives.
    pub fn column_widths(&self) -> Vec<usize> {
        match &self.layout {
            Some(layout) => layout
                .resolve(self.width as f64)
                .into_iter()
                .map(|w| w.floor().max(0.0) as usize)
                .collect(),
            None => {
                let n = C::count().max(1);
                vec![self.width / n; C::count()]
            }
        }
    }

    fn spacing(&self) -> usize {
        self.layout
            .as_ref()
            .map(|l| l.spacing as usize)
            .unwrap_or(0)
    }

    /// One line of output for a section's items.
    pub fn render_row(&self, items: &[ItemId], label: impl Fn(ItemId) -> String) -> String {
        let widths = self.column_widths();
        let gap = " ".repeat(self.spacing());
        items
            .iter()
            .zip(widths)
            .map(|(item, width)| fit(&label(*item), width))
            .collect::<Vec<_>>()
            .join(gap.as_str())
            .trim_end()
            .to_string()
    }

    /// Horizontal rule spanning the rendered columns.
    pub fn rule(&self) -> String {
        let widths = self.column_widths();
        let total = widths.iter().sum::<usize>() + self.spacing() * widths.len().saturating_sub(1);
        "─".repeat(total)
    }
}

impl<C: ColumnId> RenderingHost<C> for TextHost<C> {
    fn apply_snapshot(&mut self, snapshot: Snapshot, animate: bool) {
        let diff = SnapshotDiff::between(&self.snapshot, &snapshot);
        log::debug!(
            "text host: +{} -{} ~{} rows (animate={animate})",
            diff.inserted_sections().count(),
            diff.deleted_sections().count(),
            diff.moved_sections().count()
        );
        self.snapshot = snapshot;
    }

    fn visible_items(&self) -> HashSet<ItemId> {
        self.visible_sections()
            .iter()
            .flat_map(|s| s.items.iter().copied())
            .collect()
    }

    fn measured_content_width(&self, item: ItemId) -> Option<f64> {
        self.text.get(&item).map(|t| t.width() as f64)
    }

    fn install_layout(&mut self, mut layout: LayoutDescription<C>) {
        // terminal cells are whole; resolve and render must use the same gap
        layout.spacing = layout.spacing.max(0.0).round();
        self.layout = Some(layout);
    }

    fn available_width(&self) -> f64 {
        self.width as f64
    }
}

/// Pad or truncate `text` to exactly `width` terminal columns.
pub fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let mut out = text.to_string();
        out.push_str(&" ".repeat(width - text.width()));
        return out;
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push(ELLIPSIS);
    used += 1;
    out.push_str(&" ".repeat(width - used));
    out
}
