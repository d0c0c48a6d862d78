use crate::snapshot::Snapshot;
use std::collections::HashMap;

/// Latest committed overlay per page number (1-based).
///
/// Entries appear the first time a page is left and are overwritten on every
/// later departure. Pages never visited have no entry and render without an
/// overlay.
#[derive(Debug, Clone, Default)]
pub struct PageStateMap {
    states: HashMap<u32, Snapshot>,
}

impl PageStateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_current(&mut self, page_number: u32, snapshot: Snapshot) {
        log::debug!(
            "Committing overlay for page {} ({} bytes)",
            page_number,
            snapshot.len()
        );
        self.states.insert(page_number, snapshot);
    }

    pub fn load_for(&self, page_number: u32) -> Option<&Snapshot> {
        self.states.get(&page_number)
    }

    pub fn contains(&self, page_number: u32) -> bool {
        self.states.contains_key(&page_number)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Page numbers with a stored overlay, ascending
    pub fn pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.states.keys().copied().collect();
        pages.sort_unstable();
        pages
    }
}
