//! Render snapshots and the minimal diff between two of them.
//!
//! A snapshot is an ordered list of sections (one per rendered row) each
//! holding its item identities in column order. Diffing two snapshots yields
//! the deletes, inserts and moves a host needs to go from one to the other.
//! Moves are minimal: elements that survive on the longest run already in
//! relative order stay where they are, everything else surviving is moved.

use std::collections::{HashMap, HashSet};

use crate::identity::{ItemId, RowId};

/// One rendered row and its item identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub key: RowId,
    pub items: Vec<ItemId>,
}

/// Ordered set of sections handed to the rendering host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub sections: Vec<Section>,
}

impl Snapshot {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// All item identities in render order.
    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.sections.iter().flat_map(|s| s.items.iter().copied())
    }
}

/// A single change between two ordered sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<K> {
    /// Present before, absent after. `from` is the old position.
    Delete { key: K, from: usize },
    /// Absent before, present after. `to` is the new position.
    Insert { key: K, to: usize },
    /// Present in both, repositioned.
    Move { key: K, from: usize, to: usize },
}

/// Changes to the items of one section that exists in both snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionItemChanges {
    pub section: RowId,
    pub changes: Vec<Change<ItemId>>,
}

/// Minimal patch turning one snapshot into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub sections: Vec<Change<RowId>>,
    pub items: Vec<SectionItemChanges>,
}

impl SnapshotDiff {
    /// Compute the patch from `old` to `new`.
    pub fn between(old: &Snapshot, new: &Snapshot) -> Self {
        let old_keys: Vec<RowId> = old.sections.iter().map(|s| s.key).collect();
        let new_keys: Vec<RowId> = new.sections.iter().map(|s| s.key).collect();
        let sections = diff_sequence(&old_keys, &new_keys);

        let old_by_key: HashMap<RowId, &Section> =
            old.sections.iter().map(|s| (s.key, s)).collect();

        let mut items = Vec::new();
        for section in &new.sections {
            let Some(previous) = old_by_key.get(&section.key) else {
                continue;
            };
            let changes = diff_sequence(&previous.items, &section.items);
            if !changes.is_empty() {
                items.push(SectionItemChanges {
                    section: section.key,
                    changes,
                });
            }
        }

        Self { sections, items }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.items.is_empty()
    }

    pub fn deleted_sections(&self) -> impl Iterator<Item = RowId> + '_ {
        self.sections.iter().filter_map(|c| match c {
            Change::Delete { key, .. } => Some(*key),
            _ => None,
        })
    }

    pub fn inserted_sections(&self) -> impl Iterator<Item = RowId> + '_ {
        self.sections.iter().filter_map(|c| match c {
            Change::Insert { key, .. } => Some(*key),
            _ => None,
        })
    }

    pub fn moved_sections(&self) -> impl Iterator<Item = RowId> + '_ {
        self.sections.iter().filter_map(|c| match c {
            Change::Move { key, .. } => Some(*key),
            _ => None,
        })
    }
}

/// Diff two sequences of unique keys.
///
/// Deletes are reported first (old positions), then inserts and moves in
/// new-position order.
pub fn diff_sequence<K>(old: &[K], new: &[K]) -> Vec<Change<K>>
where
    K: Copy + Eq + std::hash::Hash,
{
    let new_set: HashSet<K> = new.iter().copied().collect();
    let old_index: HashMap<K, usize> = old.iter().enumerate().map(|(i, k)| (*k, i)).collect();

    let mut changes: Vec<Change<K>> = old
        .iter()
        .enumerate()
        .filter(|(_, k)| !new_set.contains(*k))
        .map(|(from, key)| Change::Delete { key: *key, from })
        .collect();

    // Old positions of surviving keys, in new order.
    let survivors: Vec<(usize, usize)> = new
        .iter()
        .enumerate()
        .filter_map(|(to, k)| old_index.get(k).map(|from| (to, *from)))
        .collect();
    let old_positions: Vec<usize> = survivors.iter().map(|(_, from)| *from).collect();
    let stable: HashSet<usize> = longest_increasing_subsequence(&old_positions)
        .into_iter()
        .map(|i| survivors[i].0)
        .collect();

    for (to, key) in new.iter().enumerate() {
        match old_index.get(key) {
            None => changes.push(Change::Insert { key: *key, to }),
            Some(from) if !stable.contains(&to) => changes.push(Change::Move {
                key: *key,
                from: *from,
                to,
            }),
            Some(_) => {}
        }
    }

    changes
}

/// Indices (into `values`) of one longest strictly increasing subsequence.
///
/// Patience sorting with predecessor links, O(n log n).
fn longest_increasing_subsequence(values: &[usize]) -> Vec<usize> {
    // tails[k] = index of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessor: Vec<Option<usize>> = vec![None; values.len()];

    for (i, value) in values.iter().enumerate() {
        let slot = tails.partition_point(|&t| values[t] < *value);
        if slot > 0 {
            predecessor[i] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(i);
        } else {
            tails[slot] = i;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        result.push(i);
        cursor = predecessor[i];
    }
    result.reverse();
    result
}
