use serde::{Deserialize, Serialize};

use super::position::Position;

/// Absolute tolerance used when comparing an input sum with an activation value.
pub const ACTIVATION_TOLERANCE: f64 = 1e-4;

/// Default weight of a link to a Moore neighbour.
pub const LIFE_NEIGHBOR_WEIGHT: f64 = 0.12;
/// Default weight of a node's self-loop.
pub const LIFE_CENTER_WEIGHT: f64 = 0.04;
/// Activation values equivalent to Conway's Life (B3/S23) under the default weights.
pub const LIFE_ACTIVATION_VALUES: [f64; 3] = [0.28, 0.36, 0.40];

/// Automaton definition: what a node links to and which input sums fire it.
///
/// Links are rebuilt from `neighborhood`, `neighbor_weight` and
/// `center_weight`; `activation_values` drive the activation phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub activation_values: Vec<f64>,
    /// Offsets relative to a node, excluding the node itself.
    pub neighborhood: Vec<Position>,
    pub neighbor_weight: f64,
    /// Self-loop weight; `0.0` means no self-loop.
    pub center_weight: f64,
}

impl RuleSet {
    /// The eight offsets surrounding a cell, row by row.
    #[must_use]
    pub fn moore_neighborhood() -> Vec<Position> {
        let mut offsets = Vec::with_capacity(8);
        for i in -1..=1 {
            for j in -1..=1 {
                if i != 0 || j != 0 {
                    offsets.push(Position::new(i, j));
                }
            }
        }
        offsets
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            activation_values: LIFE_ACTIVATION_VALUES.to_vec(),
            neighborhood: Self::moore_neighborhood(),
            neighbor_weight: LIFE_NEIGHBOR_WEIGHT,
            center_weight: LIFE_CENTER_WEIGHT,
        }
    }
}
