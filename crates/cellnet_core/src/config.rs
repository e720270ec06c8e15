//! Configuration management for engine parameters.
//!
//! Strongly-typed structures mapping to a `cellnet.toml` file. Every field
//! has a default, so a file only needs the values it overrides.
//!
//! ## Example `cellnet.toml`
//!
//! ```toml
//! [grid]
//! width = 64
//! height = 48
//! seed = 42
//! initial_density = 0.3
//!
//! [rules]
//! activation_values = [0.28, 0.36, 0.40]
//! neighbor_weight = 0.12
//! center_weight = 0.04
//!
//! [timing]
//! loop_interval_ms = 50
//! ```

use std::time::Duration;

use cellnet_data::RuleSet;
use serde::{Deserialize, Serialize};

/// Grid dimensions and initial population.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    /// Seed for the initial random activation; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Probability that a cell starts active.
    pub initial_density: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 40,
            seed: None,
            initial_density: 0.5,
        }
    }
}

/// Automaton weights and activation values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub activation_values: Vec<f64>,
    pub neighbor_weight: f64,
    pub center_weight: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let rules = RuleSet::default();
        Self {
            activation_values: rules.activation_values,
            neighbor_weight: rules.neighbor_weight,
            center_weight: rules.center_weight,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Minimum wall-clock duration of one worker loop iteration.
    pub loop_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loop_interval_ms: 100,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UpdatesConfig {
    /// The update queue is compacted once it exceeds this many entries per node.
    pub compaction_factor: usize,
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            compaction_factor: 2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub grid: GridConfig,
    pub rules: RulesConfig,
    pub timing: TimingConfig,
    pub updates: UpdatesConfig,
}

impl EngineConfig {
    /// Default configuration with the given grid size.
    #[must_use]
    pub fn with_size(width: i32, height: i32) -> Self {
        let mut config = Self::default();
        config.grid.width = width;
        config.grid.height = height;
        config
    }

    /// Validates all configuration parameters.
    ///
    /// # Validation Rules
    /// - Grid dimensions must be positive and at most 4096 per side
    /// - Initial density must lie in [0.0, 1.0]
    /// - Weights and activation values must be finite
    /// - The compaction factor must be at least 1
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.grid.width > 0, "Grid width must be positive");
        anyhow::ensure!(self.grid.width <= 4096, "Grid width too large (max 4096)");
        anyhow::ensure!(self.grid.height > 0, "Grid height must be positive");
        anyhow::ensure!(
            self.grid.height <= 4096,
            "Grid height too large (max 4096)"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.grid.initial_density),
            "Initial density must be within [0, 1]"
        );
        anyhow::ensure!(
            self.rules.neighbor_weight.is_finite(),
            "Neighbor weight must be finite"
        );
        anyhow::ensure!(
            self.rules.center_weight.is_finite(),
            "Center weight must be finite"
        );
        anyhow::ensure!(
            self.rules.activation_values.iter().all(|v| v.is_finite()),
            "Activation values must be finite"
        );
        anyhow::ensure!(
            self.updates.compaction_factor >= 1,
            "Compaction factor must be at least 1"
        );
        Ok(())
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rule set over the Moore neighbourhood using the configured weights.
    #[must_use]
    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            activation_values: self.rules.activation_values.clone(),
            neighborhood: RuleSet::moore_neighborhood(),
            neighbor_weight: self.rules.neighbor_weight,
            center_weight: self.rules.center_weight,
        }
    }

    #[must_use]
    pub fn loop_interval(&self) -> Duration {
        Duration::from_millis(self.timing.loop_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml("[grid]\nwidth = 12\nseed = 7\n").unwrap();
        assert_eq!(config.grid.width, 12);
        assert_eq!(config.grid.height, 40);
        assert_eq!(config.grid.seed, Some(7));
        assert_eq!(config.timing.loop_interval_ms, 100);
        assert_eq!(config.rules, RulesConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EngineConfig::from_toml("[grid]\nwidth = 0\n").is_err());
        assert!(EngineConfig::from_toml("[grid]\ninitial_density = 1.5\n").is_err());
        assert!(EngineConfig::from_toml("[updates]\ncompaction_factor = 0\n").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = EngineConfig::with_size(8, 9);
        config.grid.seed = Some(3);
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_rule_set_uses_moore_neighborhood() {
        let rules = EngineConfig::default().rule_set();
        assert_eq!(rules, RuleSet::default());
    }
}
