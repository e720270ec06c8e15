//! Weighted-neighbourhood cellular automaton with a threaded engine.
//!
//! ```no_run
//! use cellnet_lib::{Engine, EngineState};
//! use std::time::Duration;
//!
//! let engine = Engine::new(40, 40).unwrap();
//! engine.wait_for_state(EngineState::Paused, Duration::from_secs(1));
//! engine.run_steps(10).unwrap();
//! for update in engine.drain_updates() {
//!     println!("{} -> {}", update.position, update.active);
//! }
//! ```

pub mod engine;

pub use cellnet_core::config::EngineConfig;
pub use cellnet_core::{Grid, LifeRule, NodeUpdate};
pub use cellnet_data::{Link, Node, Position, RuleSet};
pub use engine::{Command, Engine, EngineError, EngineState, EngineStatus, Notification};
