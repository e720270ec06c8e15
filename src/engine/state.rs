//! Operational state shared between the worker and callers.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use cellnet_core::sync::lock_watched;

/// Base operating state of the worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineState {
    /// Constructed, worker not yet through its first command batch.
    Starting,
    /// Not stepping; the worker sleeps until a command arrives.
    Paused,
    /// One time step per loop iteration.
    TimeStepping,
    /// Terminal.
    Exiting,
}

/// Base state plus whether a cell update is being applied on top of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub state: EngineState,
    pub updating: bool,
}

/// Status guarded by a mutex, with a condition variable signalled on change.
pub(crate) struct StateCell {
    status: Mutex<EngineStatus>,
    changed: Condvar,
}

impl StateCell {
    pub(crate) fn new(state: EngineState) -> Self {
        Self {
            status: Mutex::new(EngineStatus {
                state,
                updating: false,
            }),
            changed: Condvar::new(),
        }
    }

    pub(crate) fn get(&self) -> EngineStatus {
        *lock_watched(&self.status, "engine state")
    }

    pub(crate) fn state(&self) -> EngineState {
        self.get().state
    }

    pub(crate) fn set_state(&self, state: EngineState) {
        let mut status = lock_watched(&self.status, "engine state");
        if status.state != state {
            tracing::debug!(from = ?status.state, to = ?state, "Engine state change");
        }
        status.state = state;
        self.changed.notify_all();
    }

    pub(crate) fn set_updating(&self, updating: bool) {
        let mut status = lock_watched(&self.status, "engine state");
        status.updating = updating;
        self.changed.notify_all();
    }

    /// Blocks until the base state equals `target` or `timeout` passes.
    pub(crate) fn wait_for(&self, target: EngineState, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut status = lock_watched(&self.status, "engine state");
        while status.state != target {
            if self.changed.wait_until(&mut status, deadline).timed_out() {
                return status.state == target;
            }
        }
        true
    }
}
