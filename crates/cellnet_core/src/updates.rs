//! Queue of node changes waiting to be drained by an observer.
//!
//! The worker appends; the observer drains. When nobody drains for a while
//! the queue would grow by up to one entry per node per step, so once it
//! passes `compaction_factor × node_count` entries it is replaced by a
//! single entry per node (a full resync) instead of the accumulated history.

use std::collections::VecDeque;

use cellnet_data::Position;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Snapshot of one node's externally visible state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub index: usize,
    pub position: Position,
    pub active: bool,
}

#[derive(Debug)]
pub struct UpdateQueue {
    entries: VecDeque<NodeUpdate>,
    compaction_factor: usize,
}

impl Default for UpdateQueue {
    fn default() -> Self {
        Self::new(2)
    }
}

impl UpdateQueue {
    #[must_use]
    pub fn new(compaction_factor: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            compaction_factor: compaction_factor.max(1),
        }
    }

    pub fn push(&mut self, update: NodeUpdate) {
        self.entries.push_back(update);
    }

    /// Records the current state of the node at `index`.
    pub fn record(&mut self, grid: &Grid, index: usize) {
        if let Some(node) = grid.node(index) {
            self.push(NodeUpdate {
                index,
                position: node.position,
                active: node.active,
            });
        }
    }

    pub fn record_all<I>(&mut self, grid: &Grid, indices: I)
    where
        I: IntoIterator<Item = usize>,
    {
        for index in indices {
            self.record(grid, index);
        }
    }

    /// Replaces the contents with one entry per node of `grid`.
    pub fn resync(&mut self, grid: &Grid) {
        self.entries.clear();
        self.record_all(grid, 0..grid.len());
    }

    /// True once the queue holds more than `compaction_factor × node_count` entries.
    #[must_use]
    pub fn over_limit(&self, node_count: usize) -> bool {
        self.entries.len() > self.compaction_factor.saturating_mul(node_count)
    }

    /// Removes and returns every queued entry, oldest first.
    pub fn drain(&mut self) -> Vec<NodeUpdate> {
        self.entries.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
