//! # Cellnet Data
//!
//! Plain data shared by every cellnet crate: cell coordinates, weighted
//! links, nodes, automaton rule sets and the on-disk capsules.
//!
//! Everything here is inert. Construction, linking and stepping live in
//! `cellnet_core`, which implements its behaviour on these types.

pub mod data;

pub use data::capsule::{GridCapsule, SaveFile};
pub use data::node::{Link, Node};
pub use data::position::Position;
pub use data::rules::{RuleSet, ACTIVATION_TOLERANCE};
