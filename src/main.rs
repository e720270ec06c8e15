use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use cellnet_core::init_logging;
use cellnet_lib::{Engine, EngineConfig, EngineState, LifeRule, RuleSet};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "cellnet.toml")]
    config: PathBuf,

    /// Grid width (overrides the config file)
    #[arg(long)]
    width: Option<i32>,

    /// Grid height (overrides the config file)
    #[arg(long)]
    height: Option<i32>,

    /// Seed for the initial population
    #[arg(long)]
    seed: Option<u64>,

    /// Birth/survival rule such as B3/S23
    #[arg(short, long)]
    rule: Option<String>,

    /// Number of time steps to run
    #[arg(short, long, default_value_t = 100)]
    steps: usize,

    /// Load the grid from a save file before running
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save the grid after running
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    width: i32,
    height: i32,
    steps: u64,
    active_cells: u64,
    compactions: u64,
    elapsed_ms: u128,
    activation_values: Vec<f64>,
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = if args.config.exists() {
        let content = std::fs::read_to_string(&args.config)
            .with_context(|| format!("reading {}", args.config.display()))?;
        EngineConfig::from_toml(&content)?
    } else {
        EngineConfig::default()
    };
    if let Some(width) = args.width {
        config.grid.width = width;
    }
    if let Some(height) = args.height {
        config.grid.height = height;
    }
    if args.seed.is_some() {
        config.grid.seed = args.seed;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let config = load_config(&args)?;

    let engine = Engine::with_config(config.clone())?;
    engine.wait_for_state(EngineState::Paused, Duration::from_secs(5));

    if let Some(path) = &args.load {
        engine
            .load(path)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    if let Some(notation) = &args.rule {
        let rule: LifeRule = notation.parse()?;
        engine.install_rule(
            &rule,
            RuleSet::moore_neighborhood(),
            config.rules.neighbor_weight,
            config.rules.center_weight,
        )?;
    }

    let steps = engine.run_steps(args.steps)?;
    let rules = engine.rule_set()?;

    if let Some(path) = &args.save {
        engine
            .save(path)
            .with_context(|| format!("saving {}", path.display()))?;
    }

    let metrics = engine.metrics();
    let summary = Summary {
        width: config.grid.width,
        height: config.grid.height,
        steps,
        active_cells: metrics.active_cells(),
        compactions: metrics.compactions(),
        elapsed_ms: metrics.elapsed().as_millis(),
        activation_values: rules.activation_values,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}x{} grid: {} steps, {} active cells, {} compactions, {} ms",
            summary.width,
            summary.height,
            summary.steps,
            summary.active_cells,
            summary.compactions,
            summary.elapsed_ms
        );
    }

    engine.shutdown();
    Ok(())
}
