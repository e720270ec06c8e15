use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

use super::position::Position;

/// Directed weighted edge held by its source node.
///
/// `target` is the index of the destination node inside the owning grid.
/// A link whose target is the source itself is a self-loop.
#[derive(
    Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Link {
    /// Index of the destination node in the grid.
    pub target: usize,
    /// Contribution added to the destination's input sum while the source is active.
    pub weight: f64,
}

impl Link {
    #[must_use]
    pub const fn new(target: usize, weight: f64) -> Self {
        Self { target, weight }
    }
}

/// One cell of the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct Node {
    pub position: Position,
    /// Firing or not firing.
    pub active: bool,
    /// Accumulator for the weighted-sum phase (not serialized).
    #[serde(skip)]
    #[with(rkyv::with::Skip)]
    pub input_sum: f64,
    /// Outgoing links, in insertion order.
    pub links: Vec<Link>,
}

impl Node {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            position,
            active: false,
            input_sum: 0.0,
            links: Vec::new(),
        }
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }
}
