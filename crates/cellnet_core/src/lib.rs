//! # Cellnet Core
//!
//! Deterministic simulation logic for the weighted-neighbourhood cellular
//! automaton:
//! - Grid construction with toroidal Moore linking and arbitrary relinking
//! - The two-phase time step (weighted sum, then activation)
//! - Totalistic rule notation and rule reconstruction from links
//! - The compacting update queue published to observers
//! - Configuration, metrics, structured logging and lock diagnostics
//!
//! ## Example
//!
//! ```
//! use cellnet_core::grid::Grid;
//! use cellnet_data::{Position, RuleSet};
//!
//! let mut grid = Grid::build(Position::new(0, 0), 5, 5, false).unwrap();
//! for p in [(1, 2), (2, 2), (3, 2)] {
//!     let idx = grid.index_of(Position::from(p)).unwrap();
//!     grid.set_active(idx, true);
//! }
//!
//! // A horizontal blinker turns vertical after one step.
//! grid.time_step(&RuleSet::default());
//! let centre = grid.index_of(Position::new(2, 1)).unwrap();
//! assert!(grid.nodes()[centre].active);
//! ```

/// Configuration management for engine parameters
pub mod config;
/// Grid and rule error types
pub mod error;
/// Node arena, construction, lookup and relinking
pub mod grid;
/// Metrics collection and structured logging
pub mod metrics;
/// Rule evaluation and totalistic rule notation
pub mod rules;
/// The two-phase time step
pub mod step;
/// Lock helpers with debug-build wait diagnostics
pub mod sync;
/// Change queue drained by observers
pub mod updates;

pub use error::{GridError, RuleError};
pub use grid::Grid;
pub use metrics::{init_logging, Metrics};
pub use rules::{LifeRule, RuleLogic};
pub use updates::{NodeUpdate, UpdateQueue};
