//! Rule evaluation and totalistic rule notation.
//!
//! A [`LifeRule`] lists the live-neighbour counts that give birth to a dead
//! cell and the counts that keep a live cell alive. Under a weighting where
//! every neighbour contributes `neighbor_weight` and the cell itself
//! contributes `center_weight`, each count maps to exactly one input sum,
//! which becomes an activation value.

use std::fmt;
use std::str::FromStr;

use cellnet_data::{Position, RuleSet, ACTIVATION_TOLERANCE};

use crate::error::RuleError;

pub trait RuleLogic {
    /// True when `input_sum` is within tolerance of any activation value.
    fn fires(&self, input_sum: f64) -> bool;
    fn validate(&self) -> Result<(), RuleError>;
}

impl RuleLogic for RuleSet {
    fn fires(&self, input_sum: f64) -> bool {
        self.activation_values
            .iter()
            .any(|v| (v - input_sum).abs() <= ACTIVATION_TOLERANCE)
    }

    fn validate(&self) -> Result<(), RuleError> {
        if !self.neighbor_weight.is_finite() {
            return Err(RuleError::NonFinite("neighbor weight"));
        }
        if !self.center_weight.is_finite() {
            return Err(RuleError::NonFinite("center weight"));
        }
        if self.activation_values.iter().any(|v| !v.is_finite()) {
            return Err(RuleError::NonFinite("activation value"));
        }
        Ok(())
    }
}

/// Birth/survival counts in `B3/S23` notation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifeRule {
    pub birth: Vec<usize>,
    pub survive: Vec<usize>,
}

impl LifeRule {
    /// Conway's Life, B3/S23.
    #[must_use]
    pub fn life() -> Self {
        Self {
            birth: vec![3],
            survive: vec![2, 3],
        }
    }

    /// Input sums that should fire a node.
    ///
    /// A birth count `i` yields `i × neighbor_weight`. A survival count
    /// yields `i × neighbor_weight + center_weight`, which only differs from
    /// a birth sum when the rule is outer totalistic (non-zero center
    /// weight). Values closer than the activation tolerance are merged.
    #[must_use]
    pub fn activation_values(&self, neighbor_weight: f64, center_weight: f64) -> Vec<f64> {
        let mut values: Vec<f64> = Vec::new();
        let births = self.birth.iter().map(|&i| i as f64 * neighbor_weight);
        let survivals = self
            .survive
            .iter()
            .map(|&i| i as f64 * neighbor_weight + center_weight);
        for value in births.chain(survivals) {
            if !values
                .iter()
                .any(|v| (v - value).abs() <= ACTIVATION_TOLERANCE)
            {
                values.push(value);
            }
        }
        values
    }

    /// Builds a full rule set over `neighborhood`.
    pub fn to_rule_set(
        &self,
        neighborhood: Vec<Position>,
        neighbor_weight: f64,
        center_weight: f64,
    ) -> Result<RuleSet, RuleError> {
        let max = neighborhood.len();
        if let Some(&count) = self.birth.iter().chain(&self.survive).find(|&&c| c > max) {
            return Err(RuleError::CountOutOfRange { count, max });
        }
        let rules = RuleSet {
            activation_values: self.activation_values(neighbor_weight, center_weight),
            neighborhood,
            neighbor_weight,
            center_weight,
        };
        rules.validate()?;
        Ok(rules)
    }
}

impl FromStr for LifeRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let notation = || RuleError::Notation(s.to_string());
        let mut birth = None;
        let mut survive = None;

        for part in s.trim().split('/') {
            let mut chars = part.trim().chars();
            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => &mut birth,
                Some('S') => &mut survive,
                _ => return Err(notation()),
            };
            if slot.is_some() {
                return Err(notation());
            }
            let counts = chars
                .map(|c| c.to_digit(10).map(|d| d as usize).ok_or_else(notation))
                .collect::<Result<Vec<_>, _>>()?;
            *slot = Some(counts);
        }

        match (birth, survive) {
            (Some(birth), Some(survive)) => Ok(Self { birth, survive }),
            _ => Err(notation()),
        }
    }
}

impl fmt::Display for LifeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B")?;
        for c in &self.birth {
            write!(f, "{c}")?;
        }
        write!(f, "/S")?;
        for c in &self.survive {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
