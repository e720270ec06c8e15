//! Core data structures for the cellnet simulation.

pub mod capsule;
pub mod node;
pub mod position;
pub mod rules;
