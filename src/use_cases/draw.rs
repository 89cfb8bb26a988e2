use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::catalog::SpeciesDefinition;
use crate::domain::errors::DrawError;
use crate::domain::ledger::PlayerRecord;
use crate::domain::ports::{Clock, CommitOutcome, PlayerStore, RandomSource};
use crate::domain::quota::QuotaManager;
use crate::domain::reward::RewardEngine;

// Result returned by the draw use case.
#[derive(Debug, Clone)]
pub struct DrawResult {
    pub draw_id: String,
    pub species: SpeciesDefinition,
    pub is_new: bool,
    pub total_points: u64,
    pub remaining: u32,
}

// Draw use case with injected dependencies.
pub struct DrawUseCase<C, S, R> {
    pub clock: C,
    pub store: S,
    pub random: R,
    pub engine: Arc<RewardEngine>,
    pub quota: QuotaManager,
}

impl<C, S, R> DrawUseCase<C, S, R>
where
    C: Clock,
    S: PlayerStore,
    R: RandomSource,
{
    pub async fn execute(&self, user_id: &str) -> Result<DrawResult, DrawError> {
        let now = self.clock.now_epoch_seconds();

        let stored = self
            .store
            .load(user_id)
            .await
            .map_err(DrawError::StorageFailure)?;

        // Work on a private copy; nothing is visible until the versioned commit lands.
        let (expected_version, mut record) = match stored {
            Some(stored) => (stored.version, stored.record),
            None => (0, PlayerRecord::new(self.quota.initial(now))),
        };
        self.quota.refresh(&mut record.quota, now);

        let outcome = self.engine.apply(&mut record, &self.random, now)?;

        match self
            .store
            .commit(user_id, expected_version, record)
            .await
            .map_err(DrawError::StorageFailure)?
        {
            CommitOutcome::Committed { version } => {
                let draw_id = Uuid::new_v4().to_string();
                info!(
                    user_id,
                    draw_id = %draw_id,
                    species_id = %outcome.species.id,
                    tier = %outcome.species.rarity,
                    is_new = outcome.is_new,
                    version,
                    "draw committed"
                );
                Ok(DrawResult {
                    draw_id,
                    species: outcome.species,
                    is_new: outcome.is_new,
                    total_points: outcome.total_points,
                    remaining: outcome.remaining,
                })
            }
            CommitOutcome::Conflict => {
                warn!(user_id, expected_version, "draw lost version race");
                Err(DrawError::DrawInProgress)
            }
        }
    }
}
