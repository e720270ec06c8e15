//! The simulation engine.
//!
//! An [`Engine`] owns a background worker thread that holds the grid and
//! rule set. Callers talk to it only through [`Command`]s sent over a
//! channel and observe it through notifications and the update queue.

pub mod command;
pub mod error;
pub mod notify;
pub mod state;
mod worker;

use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cellnet_core::config::EngineConfig;
use cellnet_core::grid::{BUILD_CENTER_WEIGHT, BUILD_NEIGHBOR_WEIGHT};
use cellnet_core::sync::lock_watched;
use cellnet_core::{Grid, LifeRule, Metrics, NodeUpdate, RuleLogic, UpdateQueue};
use cellnet_data::{Node, Position, RuleSet};

pub use command::Command;
pub use error::{EngineError, Result};
pub use notify::{Notification, UpdateCallback};
pub use state::{EngineState, EngineStatus};

use worker::{Shared, Worker};

/// Handle to a running simulation.
///
/// Dropping the handle sends `Exit` and joins the worker.
pub struct Engine {
    commands: Sender<Command>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Engine {
    /// A randomly populated toroidal grid running Conway's Life, paused.
    pub fn new(height: i32, width: i32) -> Result<Self> {
        Self::with_config(EngineConfig::with_size(width, height))
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        let mut grid = Grid::build(
            Position::new(0, 0),
            config.grid.width,
            config.grid.height,
            false,
        )?;
        let mut rng = match config.grid.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        grid.randomize(&mut rng, config.grid.initial_density);

        let rules = config.rule_set();
        rules.validate()?;
        if rules.neighbor_weight != BUILD_NEIGHBOR_WEIGHT
            || rules.center_weight != BUILD_CENTER_WEIGHT
        {
            grid.relink(&rules)?;
        }

        let mut updates = UpdateQueue::new(config.updates.compaction_factor);
        updates.resync(&grid);
        let shared = Arc::new(Shared::new(updates));

        let (commands, receiver) = mpsc::channel();
        // Leaves Starting on the worker's first batch.
        commands
            .send(Command::Pause)
            .map_err(|_| EngineError::Disconnected)?;

        let worker = Worker::new(
            grid,
            rules,
            config.loop_interval(),
            receiver,
            Arc::clone(&shared),
        );
        let handle = thread::Builder::new()
            .name("cellnet-worker".into())
            .spawn(move || worker.run())
            .map_err(EngineError::Spawn)?;

        tracing::info!(
            width = config.grid.width,
            height = config.grid.height,
            seed = ?config.grid.seed,
            "Engine started"
        );

        Ok(Self {
            commands,
            shared,
            worker: Some(handle),
        })
    }

    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| EngineError::Disconnected)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn run(&self) -> Result<()> {
        self.send(Command::Run)
    }

    pub fn exit(&self) -> Result<()> {
        self.send(Command::Exit)
    }

    pub fn update_cell(&self, position: Position, active: bool) -> Result<()> {
        self.send(Command::UpdateCell { position, active })
    }

    /// Replaces the automaton and rebuilds every node's links.
    ///
    /// Non-finite weights or values are rejected here rather than in the worker.
    pub fn install_automaton(
        &self,
        neighborhood: Vec<Position>,
        activation_values: Vec<f64>,
        neighbor_weight: f64,
        center_weight: f64,
    ) -> Result<()> {
        let rules = RuleSet {
            activation_values,
            neighborhood,
            neighbor_weight,
            center_weight,
        };
        rules.validate()?;
        self.send(Command::InstallAutomaton(rules))
    }

    /// Installs a birth/survival rule over `neighborhood`.
    pub fn install_rule(
        &self,
        rule: &LifeRule,
        neighborhood: Vec<Position>,
        neighbor_weight: f64,
        center_weight: f64,
    ) -> Result<()> {
        let rules = rule.to_rule_set(neighborhood, neighbor_weight, center_weight)?;
        self.send(Command::InstallAutomaton(rules))
    }

    pub fn activate_linked_neighbors(&self, position: Position) -> Result<()> {
        self.send(Command::ActivateLinkedNeighbors(position))
    }

    pub fn set_loop_interval(&self, millis: u64) -> Result<()> {
        self.send(Command::SetLoopInterval(Duration::from_millis(millis)))
    }

    /// Writes the grid and activation values to `path`.
    ///
    /// Blocks until the worker reaches the command.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Save {
            path: path.as_ref().to_path_buf(),
            reply,
        })?;
        rx.recv().map_err(|_| EngineError::Disconnected)?
    }

    /// Replaces grid and rule set from `path`. On failure nothing changes.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Load {
            path: path.as_ref().to_path_buf(),
            reply,
        })?;
        rx.recv().map_err(|_| EngineError::Disconnected)?
    }

    /// Pauses and runs exactly `steps` time steps. Returns the total step count.
    pub fn run_steps(&self, steps: usize) -> Result<u64> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::RunSteps { steps, reply })?;
        rx.recv().map_err(|_| EngineError::Disconnected)
    }

    /// Registers a callback invoked on the worker thread after every publish.
    pub fn on_update<F>(&self, callback: F)
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.shared.notifier.add_callback(Box::new(callback));
    }

    /// Channel receiving every notification; dropped receivers are pruned.
    pub fn subscribe(&self) -> Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        self.shared.notifier.add_channel(tx);
        rx
    }

    /// Returns and clears everything queued since the last drain.
    pub fn drain_updates(&self) -> Vec<NodeUpdate> {
        lock_watched(&self.shared.updates, "updates").drain()
    }

    pub fn pending_updates(&self) -> usize {
        lock_watched(&self.shared.updates, "updates").len()
    }

    pub fn current_state(&self) -> EngineState {
        self.shared.state.state()
    }

    pub fn status(&self) -> EngineStatus {
        self.shared.state.get()
    }

    /// Blocks until the engine reaches `state`; false on timeout.
    pub fn wait_for_state(&self, state: EngineState, timeout: Duration) -> bool {
        self.shared.state.wait_for(state, timeout)
    }

    /// Snapshot of the node at `index`, as of the worker's next command batch.
    pub fn node(&self, index: usize) -> Result<Option<Node>> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::InspectNode { index, reply })?;
        rx.recv().map_err(|_| EngineError::Disconnected)
    }

    /// The rule set currently installed in the worker.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::InspectRules { reply })?;
        rx.recv().map_err(|_| EngineError::Disconnected)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.shared.metrics
    }

    /// Sends `Exit` and waits for the worker to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.commands.send(Command::Exit);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::error!("Engine worker panicked");
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}
