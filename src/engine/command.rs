//! Commands accepted by the worker, one variant per request kind.
//!
//! Requests that produce an answer carry a reply sender; the caller blocks
//! on the matching receiver.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Duration;

use cellnet_data::{Node, Position, RuleSet};

use super::error::Result;

#[derive(Debug)]
pub enum Command {
    /// Stop stepping; block once no further commands are queued.
    Pause,
    /// Resume stepping every loop iteration.
    Run,
    /// Terminal; remaining queued commands are discarded.
    Exit,
    /// Set one cell's state.
    UpdateCell { position: Position, active: bool },
    /// Replace the rule set and rebuild every node's links.
    InstallAutomaton(RuleSet),
    /// Activate every node that links to the node at this position.
    ActivateLinkedNeighbors(Position),
    /// Minimum duration of one worker loop iteration.
    SetLoopInterval(Duration),
    Save {
        path: PathBuf,
        reply: Sender<Result<()>>,
    },
    Load {
        path: PathBuf,
        reply: Sender<Result<()>>,
    },
    /// Pause, then execute exactly `steps` time steps back to back.
    RunSteps {
        steps: usize,
        reply: Sender<u64>,
    },
    InspectNode {
        index: usize,
        reply: Sender<Option<Node>>,
    },
    InspectRules {
        reply: Sender<RuleSet>,
    },
}
