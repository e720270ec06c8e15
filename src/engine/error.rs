//! Errors surfaced by the engine's caller-facing API.

use cellnet_core::{GridError, RuleError};
use cellnet_io::IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The worker thread has exited; commands can no longer be delivered.
    #[error("engine worker is no longer running")]
    Disconnected,

    #[error("persistence failed: {0}")]
    Io(#[from] IoError),

    #[error("grid invariant violated: {0}")]
    Grid(#[from] GridError),

    #[error("invalid rule: {0}")]
    Rule(#[from] RuleError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
