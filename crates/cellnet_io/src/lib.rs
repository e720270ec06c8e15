//! # Cellnet IO
//!
//! Persistence layer for the cellnet engine.
//!
//! This crate provides:
//! - Structured error handling with a custom error type
//! - The versioned binary save format (grid, optionally with activation values)

/// Error types and result aliases for I/O operations
pub mod error;
/// Save file encoding, decoding and legacy format handling
pub mod persistence;

pub use error::{IoError, Result};
pub use persistence::{load_state, save_state, LoadedState};
