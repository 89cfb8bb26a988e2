// Weighted draw rules: tier roll, species pick, duplicate check, points, quota.

use crate::domain::catalog::{SpeciesCatalog, SpeciesDefinition};
use crate::domain::errors::DrawError;
use crate::domain::ledger::PlayerRecord;
use crate::domain::ports::RandomSource;
use crate::domain::weights::{RarityWeights, WeightTable};
use std::sync::Arc;

/// Outcome of applying one draw to a player record.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOutcome {
    pub species: SpeciesDefinition,
    pub is_new: bool,
    pub total_points: u64,
    pub remaining: u32,
}

/// Catalog plus the cumulative weight table built from configuration.
#[derive(Debug)]
pub struct RewardEngine {
    catalog: Arc<SpeciesCatalog>,
    table: WeightTable,
}

impl RewardEngine {
    /// Validates the weights and checks every drawable tier has species.
    pub fn new(catalog: Arc<SpeciesCatalog>, weights: &RarityWeights) -> Result<Self, DrawError> {
        let table =
            WeightTable::new(weights).map_err(|e| DrawError::CatalogMisconfigured(e.to_string()))?;

        if let Some(&tier) = table.tiers().iter().find(|&&tier| catalog.tier_len(tier) == 0) {
            return Err(DrawError::EmptyTier { tier });
        }

        Ok(Self { catalog, table })
    }

    pub fn catalog(&self) -> &Arc<SpeciesCatalog> {
        &self.catalog
    }

    pub fn table(&self) -> &WeightTable {
        &self.table
    }

    /// Rolls a species: one uniform value picks the tier, a second the member.
    pub fn roll<R: RandomSource + ?Sized>(&self, random: &R) -> Result<&SpeciesDefinition, DrawError> {
        let tier = self.table.sample(random.next_unit());
        self.catalog
            .pick_in_tier(tier, random.next_unit())
            .ok_or(DrawError::EmptyTier { tier })
    }

    /// Applies one draw to `record`, which must already have its quota refreshed.
    ///
    /// On error the record is left exactly as it was.
    pub fn apply<R: RandomSource + ?Sized>(
        &self,
        record: &mut PlayerRecord,
        random: &R,
        now: u64,
    ) -> Result<DrawOutcome, DrawError> {
        if record.quota.is_exhausted() {
            return Err(DrawError::QuotaExhausted {
                next_reset_at: record.quota.next_reset_at,
            });
        }

        let species = self.roll(random)?.clone();

        let is_new = record.acquire(&species.id, now);
        // Duplicates award points too.
        let total_points = record.award(species.points);
        record.total_draws += 1;
        record.quota.consume();

        Ok(DrawOutcome {
            is_new,
            total_points,
            remaining: record.quota.remaining,
            species,
        })
    }
}
