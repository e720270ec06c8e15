//! The background worker: sole owner of the grid and rule set.
//!
//! Each loop iteration drains the command queue, executes one time step
//! when the state is `TimeStepping`, notifies observers and sleeps out the
//! rest of the loop interval. While paused with nothing queued, the worker
//! blocks on the command channel instead of looping.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use cellnet_core::sync::lock_watched;
use cellnet_core::{Grid, Metrics, RuleLogic, UpdateQueue};
use cellnet_data::{Position, RuleSet};

use super::command::Command;
use super::error::Result;
use super::notify::{Notification, Notifier};
use super::state::{EngineState, StateCell};

/// Structures touched by both the worker and callers.
pub(crate) struct Shared {
    pub(crate) state: StateCell,
    pub(crate) updates: Mutex<UpdateQueue>,
    pub(crate) notifier: Notifier,
    pub(crate) metrics: Metrics,
}

impl Shared {
    pub(crate) fn new(updates: UpdateQueue) -> Self {
        Self {
            state: StateCell::new(EngineState::Starting),
            updates: Mutex::new(updates),
            notifier: Notifier::default(),
            metrics: Metrics::new(),
        }
    }
}

pub(crate) struct Worker {
    grid: Grid,
    rules: RuleSet,
    loop_interval: Duration,
    commands: Receiver<Command>,
    pending: VecDeque<Command>,
    shared: Arc<Shared>,
}

impl Worker {
    pub(crate) fn new(
        grid: Grid,
        rules: RuleSet,
        loop_interval: Duration,
        commands: Receiver<Command>,
        shared: Arc<Shared>,
    ) -> Self {
        Self {
            grid,
            rules,
            loop_interval,
            commands,
            pending: VecDeque::new(),
            shared,
        }
    }

    pub(crate) fn run(mut self) {
        tracing::info!(nodes = self.grid.len(), "Worker started");
        self.publish();

        while self.shared.state.state() != EngineState::Exiting {
            let started = Instant::now();

            self.process_commands();
            match self.shared.state.state() {
                EngineState::Exiting => break,
                EngineState::TimeStepping => self.step_once(),
                _ => {}
            }
            self.publish();

            if let Some(rest) = self.loop_interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }

        tracing::info!(
            steps = self.shared.metrics.step_count(),
            "Worker exiting"
        );
    }

    /// Applies every queued command in order.
    ///
    /// A `Pause` only blocks the worker when nothing else is queued behind
    /// it; commands that arrive while blocked are applied in the same call.
    fn process_commands(&mut self) {
        self.collect_pending();
        loop {
            while let Some(command) = self.pending.pop_front() {
                self.apply(command);
                if self.shared.state.state() == EngineState::Exiting {
                    self.discard_pending();
                    return;
                }
                self.collect_pending();
            }

            if self.shared.state.state() != EngineState::Paused {
                return;
            }
            match self.commands.recv() {
                Ok(command) => {
                    self.pending.push_back(command);
                    self.collect_pending();
                }
                Err(_) => {
                    tracing::info!("Command channel closed, exiting");
                    self.shared.state.set_state(EngineState::Exiting);
                    return;
                }
            }
        }
    }

    fn collect_pending(&mut self) {
        loop {
            match self.commands.try_recv() {
                Ok(command) => self.pending.push_back(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.pending.is_empty() {
                        self.pending.push_back(Command::Exit);
                    }
                    break;
                }
            }
        }
    }

    fn discard_pending(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(dropped = self.pending.len(), "Discarding commands after exit");
        }
        // Reply senders are dropped with their commands; waiting callers see a disconnect.
        self.pending.clear();
        while self.commands.try_recv().is_ok() {}
    }

    fn apply(&mut self, command: Command) {
        tracing::debug!(?command, "Applying command");
        match command {
            Command::Pause => self.shared.state.set_state(EngineState::Paused),
            Command::Run => self.shared.state.set_state(EngineState::TimeStepping),
            Command::Exit => self.shared.state.set_state(EngineState::Exiting),
            Command::UpdateCell { position, active } => {
                self.shared.state.set_updating(true);
                self.update_cell(position, active);
                self.shared.state.set_updating(false);
            }
            Command::InstallAutomaton(rules) => self.install_automaton(rules),
            Command::ActivateLinkedNeighbors(position) => self.activate_linked_neighbors(position),
            Command::SetLoopInterval(interval) => self.loop_interval = interval,
            Command::Save { path, reply } => {
                let _ = reply.send(self.save(&path));
            }
            Command::Load { path, reply } => {
                let _ = reply.send(self.load(&path));
            }
            Command::RunSteps { steps, reply } => {
                self.run_steps(steps);
                let _ = reply.send(self.shared.metrics.step_count());
            }
            Command::InspectNode { index, reply } => {
                let _ = reply.send(self.grid.node(index).cloned());
            }
            Command::InspectRules { reply } => {
                let _ = reply.send(self.rules.clone());
            }
        }
    }

    fn update_cell(&mut self, position: Position, active: bool) {
        let Some(index) = self.grid.index_of(position) else {
            tracing::warn!(%position, "Node not found for cell update, dropping command");
            self.shared.metrics.record_dropped_command();
            return;
        };
        self.grid.set_active(index, active);
        lock_watched(&self.shared.updates, "updates").record(&self.grid, index);
        self.publish();
    }

    fn activate_linked_neighbors(&mut self, position: Position) {
        let Some(target) = self.grid.index_of(position) else {
            tracing::warn!(%position, "Node not found for neighbour activation, dropping command");
            self.shared.metrics.record_dropped_command();
            return;
        };
        let sources = self.grid.inbound_sources(target);
        for &index in &sources {
            self.grid.set_active(index, true);
        }
        lock_watched(&self.shared.updates, "updates").record_all(&self.grid, sources);
        self.publish();
    }

    fn install_automaton(&mut self, rules: RuleSet) {
        if let Err(e) = rules.validate() {
            tracing::warn!(error = %e, "Rejected automaton");
            self.shared.metrics.record_dropped_command();
            return;
        }
        match self.grid.relink(&rules) {
            Ok(()) => {
                tracing::info!(
                    neighbors = rules.neighborhood.len(),
                    values = rules.activation_values.len(),
                    "Installed automaton"
                );
                self.rules = rules;
            }
            Err(e) => {
                tracing::error!(error = %e, "Relinking aborted, previous automaton kept");
            }
        }
    }

    fn step_once(&mut self) {
        let started = Instant::now();
        let changed = self.grid.time_step(&self.rules);
        self.shared
            .metrics
            .record_step(started.elapsed(), self.grid.active_count());

        let mut updates = lock_watched(&self.shared.updates, "updates");
        updates.record_all(&self.grid, changed);
        if updates.over_limit(self.grid.len()) {
            updates.resync(&self.grid);
            self.shared.metrics.record_compaction();
        }
    }

    /// Executes `steps` time steps with no command processing in between.
    ///
    /// If the update queue overflows along the way it is cleared, and once
    /// the run ends it holds exactly one entry per node.
    fn run_steps(&mut self, steps: usize) {
        self.shared.state.set_state(EngineState::Paused);

        let mut cleared = false;
        for _ in 0..steps {
            let started = Instant::now();
            let changed = self.grid.time_step(&self.rules);
            self.shared
                .metrics
                .record_step(started.elapsed(), self.grid.active_count());

            let mut updates = lock_watched(&self.shared.updates, "updates");
            updates.record_all(&self.grid, changed);
            if updates.over_limit(self.grid.len()) {
                updates.clear();
                cleared = true;
                self.shared.metrics.record_compaction();
            }
        }

        if cleared {
            lock_watched(&self.shared.updates, "updates").resync(&self.grid);
        }
        tracing::debug!(steps, cleared, "Completed step run");
        self.publish();
    }

    fn save(&self, path: &Path) -> Result<()> {
        cellnet_io::save_state(path, &self.grid, &self.rules.activation_values).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Save failed");
            e.into()
        })
    }

    /// Replaces grid and rules only after the whole file decoded.
    fn load(&mut self, path: &Path) -> Result<()> {
        let loaded = cellnet_io::load_state(path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Load failed, state unchanged");
            e
        })?;

        let activation_values = loaded
            .activation_values
            .unwrap_or_else(|| self.rules.activation_values.clone());
        self.grid = loaded.grid;
        self.rules = self
            .grid
            .infer_rule(0, activation_values.clone())
            .unwrap_or(RuleSet {
                activation_values,
                ..self.rules.clone()
            });

        lock_watched(&self.shared.updates, "updates").resync(&self.grid);
        tracing::info!(path = %path.display(), nodes = self.grid.len(), "Loaded grid");
        self.publish();
        Ok(())
    }

    fn publish(&self) {
        let pending = lock_watched(&self.shared.updates, "updates").len();
        self.shared.notifier.notify(&Notification {
            status: self.shared.state.get(),
            pending,
            steps: self.shared.metrics.step_count(),
        });
    }
}
