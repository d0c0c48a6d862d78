//! Working arrangement of original page indices for organize and split
//!
//! The list holds 0-based indices into the source document. It starts as the
//! identity permutation and can only shrink (delete) or be permuted (swap),
//! so it always stays a duplicate-free subset of `0..page_count`. Selection
//! is keyed by original index, not by position, so it survives reordering.

use crate::reorder::{remove_at, swap_adjacent};
use crate::types::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrder {
    page_count: usize,
    order: Vec<usize>,
    selection: BTreeSet<usize>,
}

impl PageOrder {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            order: (0..page_count).collect(),
            selection: BTreeSet::new(),
        }
    }

    /// Number of pages in the source document
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Current arrangement of original indices
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Original index displayed at `position`
    pub fn original_index(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    pub fn move_page(&mut self, position: usize, direction: Direction) -> Outcome {
        let outcome = swap_adjacent(&mut self.order, position, direction);
        log::debug!("Move page at {position} {direction:?}: {outcome:?}");
        outcome
    }

    /// Remove the page at `position`; `Exhausted` means nothing is left to export
    pub fn delete_at(&mut self, position: usize) -> Outcome {
        let (outcome, removed) = remove_at(&mut self.order, position);
        if let Some(index) = removed {
            self.selection.remove(&index);
            log::debug!("Deleted original page {index} at position {position}");
        }
        outcome
    }

    /// Flip selection of the page at `position`; returns whether it is now selected
    pub fn toggle_select(&mut self, position: usize) -> Option<bool> {
        let index = self.original_index(position)?;
        let selected = if self.selection.remove(&index) {
            false
        } else {
            self.selection.insert(index);
            true
        };
        Some(selected)
    }

    pub fn is_selected(&self, position: usize) -> bool {
        self.original_index(position)
            .is_some_and(|index| self.selection.contains(&index))
    }

    /// Select every displayed page; returns whether all are now selected
    pub fn select_all(&mut self) -> bool {
        self.selection.extend(self.order.iter().copied());
        self.all_selected()
    }

    /// Clear the selection; returns whether all are now selected
    pub fn deselect_all(&mut self) -> bool {
        self.selection.clear();
        self.all_selected()
    }

    /// Select all unless everything already is, in which case deselect all
    pub fn toggle_all(&mut self) -> bool {
        if self.all_selected() {
            self.deselect_all()
        } else {
            self.select_all()
        }
    }

    pub fn all_selected(&self) -> bool {
        !self.order.is_empty() && self.order.iter().all(|i| self.selection.contains(i))
    }

    /// Selected original indices, ascending regardless of click order
    pub fn selected(&self) -> Vec<usize> {
        self.selection.iter().copied().collect()
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }
}
