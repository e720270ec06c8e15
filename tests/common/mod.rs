pub mod macros;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cellnet_lib::{Engine, EngineConfig, EngineState, Grid, Position, RuleSet};

#[allow(dead_code)]
pub struct GridBuilder {
    width: i32,
    height: i32,
    active: Vec<Position>,
    rules: Option<RuleSet>,
}

#[allow(dead_code)]
impl GridBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            active: Vec::new(),
            rules: None,
        }
    }

    pub fn with_active(mut self, cells: &[(i32, i32)]) -> Self {
        self.active.extend(cells.iter().copied().map(Position::from));
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn build(self) -> Grid {
        let mut grid = Grid::build(Position::new(0, 0), self.width, self.height, false)
            .expect("Failed to build grid");
        if let Some(rules) = &self.rules {
            grid.relink(rules).expect("Failed to relink grid");
        }
        for p in self.active {
            let idx = grid.index_of(p).expect("Active cell outside grid");
            grid.set_active(idx, true);
        }
        grid
    }
}

/// Positions of every active node, in grid order.
#[allow(dead_code)]
pub fn active_positions(grid: &Grid) -> Vec<Position> {
    grid.nodes()
        .iter()
        .filter(|n| n.active)
        .map(|n| n.position)
        .collect()
}

/// Engine with an empty, seeded grid and a 1 ms loop, already paused.
#[allow(dead_code)]
pub fn quiet_engine(width: i32, height: i32) -> Engine {
    let mut config = EngineConfig::with_size(width, height);
    config.grid.seed = Some(7);
    config.grid.initial_density = 0.0;
    config.timing.loop_interval_ms = 1;
    let engine = Engine::with_config(config).expect("Failed to start engine");
    assert!(engine.wait_for_state(EngineState::Paused, Duration::from_secs(5)));
    engine
}

/// Unique path in the temp directory; the file is removed on drop.
#[allow(dead_code)]
pub struct TempSave(pub PathBuf);

#[allow(dead_code)]
impl TempSave {
    pub fn new(tag: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(std::env::temp_dir().join(format!(
            "cellnet_{}_{}_{}.cnet",
            tag,
            std::process::id(),
            n
        )))
    }
}

impl Drop for TempSave {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}
