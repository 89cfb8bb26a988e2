use crate::domain::catalog::Rarity;
use thiserror::Error;

// Domain-level errors for the draw workflow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawError {
    #[error("no draws remaining until {next_reset_at}")]
    QuotaExhausted { next_reset_at: u64 },
    #[error("another draw for this user committed first")]
    DrawInProgress,
    #[error("no species configured for tier {tier}")]
    EmptyTier { tier: Rarity },
    #[error("reward catalog misconfigured: {0}")]
    CatalogMisconfigured(String),
    #[error("storage failure: {0}")]
    StorageFailure(String),
}
