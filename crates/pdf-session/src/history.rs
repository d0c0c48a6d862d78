//! Undo/redo for the page currently on the canvas
//!
//! History holds whole-scene snapshots. Each entry on the undo stack is the
//! scene as it was *before* one committed mutation, so undoing pops it and
//! restores it while the scene it replaces moves to the redo stack.

use crate::scene::CanvasSurface;
use crate::snapshot::{Snapshot, capture, restore};
use crate::types::*;
use std::collections::VecDeque;

/// Two bounded snapshot stacks
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a new state; any redo branch is discarded
    pub fn push(&mut self, snapshot: Snapshot) {
        self.push_bounded(snapshot);
        self.redo.clear();
    }

    fn push_bounded(&mut self, snapshot: Snapshot) {
        while self.undo.len() >= self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
    }

    /// Pop the most recent undo entry, parking `current` on the redo stack.
    ///
    /// Returns `None` (and leaves both stacks untouched) when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Mirror of [`History::undo`]
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.push_bounded(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

/// Drives a [`History`] against a canvas surface
#[derive(Debug, Clone)]
pub struct UndoController {
    history: History,
    /// Scene after the last committed change, navigation or load
    committed: Option<Snapshot>,
}

impl UndoController {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: History::new(capacity),
            committed: None,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Forget all history and take the canvas as the new baseline.
    ///
    /// Called whenever a page is (re)displayed; history never crosses pages.
    pub fn reset<C: CanvasSurface + ?Sized>(&mut self, canvas: &C) -> Result<()> {
        self.history.clear();
        self.committed = Some(capture(canvas)?);
        Ok(())
    }

    /// Call after every committed add/modify/remove on the canvas
    pub fn record_mutation<C: CanvasSurface + ?Sized>(&mut self, canvas: &C) -> Result<()> {
        let after = capture(canvas)?;
        if let Some(before) = self.committed.replace(after) {
            self.history.push(before);
        }
        Ok(())
    }

    pub fn undo<C: CanvasSurface + ?Sized>(&mut self, canvas: &mut C) -> Result<Outcome> {
        if !self.history.can_undo() {
            log::debug!("Nothing to undo");
            return Ok(Outcome::Boundary);
        }
        let current = capture(canvas)?;
        let Some(previous) = self.history.undo(current) else {
            return Ok(Outcome::Boundary);
        };
        restore(canvas, &previous)?;
        self.committed = Some(previous);
        Ok(Outcome::Applied)
    }

    pub fn redo<C: CanvasSurface + ?Sized>(&mut self, canvas: &mut C) -> Result<Outcome> {
        if !self.history.can_redo() {
            log::debug!("Nothing to redo");
            return Ok(Outcome::Boundary);
        }
        let current = capture(canvas)?;
        let Some(next) = self.history.redo(current) else {
            return Ok(Outcome::Boundary);
        };
        restore(canvas, &next)?;
        self.committed = Some(next);
        Ok(Outcome::Applied)
    }
}
