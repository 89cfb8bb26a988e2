// Rarity weight configuration and the cumulative table sampled per draw.

use crate::domain::catalog::Rarity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Tolerance when checking that configured probabilities sum to one.
const SUM_TOLERANCE: f64 = 1e-6;

/// Per-tier draw probabilities as they appear in configuration.
///
/// A tier missing from a config file weighs zero and is never drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityWeights {
    #[serde(default)]
    pub common: f64,
    #[serde(default)]
    pub rare: f64,
    #[serde(default)]
    pub epic: f64,
    #[serde(default)]
    pub legendary: f64,
    #[serde(default)]
    pub mythical: f64,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            common: 0.50,
            rare: 0.30,
            epic: 0.15,
            legendary: 0.04,
            mythical: 0.01,
        }
    }
}

impl RarityWeights {
    pub fn get(&self, rarity: Rarity) -> f64 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
            Rarity::Mythical => self.mythical,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight for {tier} must be finite and non-negative, got {value}")]
    Invalid { tier: Rarity, value: f64 },
    #[error("weights must sum to 1.0, got {0}")]
    BadSum(f64),
}

/// Cumulative distribution over tiers, built once and binary-searched per draw.
#[derive(Debug, Clone)]
pub struct WeightTable {
    tiers: Vec<Rarity>,
    cumulative: Vec<f64>,
}

impl WeightTable {
    pub fn new(weights: &RarityWeights) -> Result<Self, WeightError> {
        let mut tiers = Vec::with_capacity(Rarity::ALL.len());
        let mut cumulative = Vec::with_capacity(Rarity::ALL.len());
        let mut total = 0.0;

        for tier in Rarity::ALL {
            let value = weights.get(tier);
            if !value.is_finite() || value < 0.0 {
                return Err(WeightError::Invalid { tier, value });
            }
            if value == 0.0 {
                continue;
            }
            total += value;
            tiers.push(tier);
            cumulative.push(total);
        }

        if tiers.is_empty() || (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(WeightError::BadSum(total));
        }

        // Pin the last bound so rounding never leaves a gap below 1.0.
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }

        Ok(Self { tiers, cumulative })
    }

    /// Maps a uniform `unit` in [0, 1) to a tier.
    pub fn sample(&self, unit: f64) -> Rarity {
        let slot = self.cumulative.partition_point(|&bound| bound <= unit);
        self.tiers[slot.min(self.tiers.len() - 1)]
    }

    /// Tiers that can be drawn, in table order.
    pub fn tiers(&self) -> &[Rarity] {
        &self.tiers
    }

    pub fn probability(&self, rarity: Rarity) -> f64 {
        let Some(slot) = self.tiers.iter().position(|&tier| tier == rarity) else {
            return 0.0;
        };
        let lower = if slot == 0 { 0.0 } else { self.cumulative[slot - 1] };
        self.cumulative[slot] - lower
    }
}
