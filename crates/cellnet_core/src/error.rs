//! Error types for grid construction, relinking and rule parsing.

use cellnet_data::Position;
use thiserror::Error;

/// Failures while building, relinking or adopting a grid.
///
/// `MissingNeighbor` means the sorted, duplicate-free layout of the grid
/// was broken. It is reported as an error so the triggering operation can
/// be aborted, and is always logged at `error` level where it is raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid grid bounds: origin {origin}, exclusive limits {width}x{height}")]
    InvalidDimensions {
        origin: Position,
        width: i32,
        height: i32,
    },

    #[error("node at {node} has no neighbour at {expected}")]
    MissingNeighbor { node: Position, expected: Position },

    #[error("nodes are not strictly ascending at index {index} ({position})")]
    UnsortedGrid { index: usize, position: Position },

    #[error("link from node {node_index} targets missing node {target}")]
    DanglingLink { node_index: usize, target: usize },
}

/// Failures while parsing or validating automaton rules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("malformed rule notation '{0}', expected something like B3/S23")]
    Notation(String),

    #[error("neighbour count {count} exceeds neighbourhood size {max}")]
    CountOutOfRange { count: usize, max: usize },

    #[error("{0} must be finite")]
    NonFinite(&'static str),
}
