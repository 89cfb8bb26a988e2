use crate::domain::errors::DrawError;
use crate::domain::ledger::CollectionEntry;
use crate::domain::ports::PlayerStore;

// Owned species and score for one user; empty for users who never drew.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionView {
    pub user_id: String,
    pub entries: Vec<CollectionEntry>,
    pub total_points: u64,
    pub total_draws: u64,
}

impl CollectionView {
    pub fn species_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.species_id.clone()).collect()
    }

    pub fn total_species(&self) -> usize {
        self.entries.len()
    }
}

pub struct CollectionUseCase<S> {
    pub store: S,
}

impl<S> CollectionUseCase<S>
where
    S: PlayerStore,
{
    pub async fn execute(&self, user_id: &str) -> Result<CollectionView, DrawError> {
        let stored = self
            .store
            .load(user_id)
            .await
            .map_err(DrawError::StorageFailure)?;

        Ok(match stored {
            Some(stored) => CollectionView {
                user_id: user_id.to_string(),
                entries: stored.record.entries(),
                total_points: stored.record.total_points,
                total_draws: stored.record.total_draws,
            },
            None => CollectionView {
                user_id: user_id.to_string(),
                entries: Vec::new(),
                total_points: 0,
                total_draws: 0,
            },
        })
    }
}
