use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::ledger::{PlayerRecord, VersionedRecord};

// Result of a versioned commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { version: u64 },
    // Stored version moved on since the record was loaded.
    Conflict,
}

// Port for per-user record storage used by reward use cases.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<VersionedRecord>, String>;
    // Writes the whole record only if the stored version equals `expected_version`.
    async fn commit(
        &self,
        user_id: &str,
        expected_version: u64,
        record: PlayerRecord,
    ) -> Result<CommitOutcome, String>;
}

#[async_trait]
impl<T: PlayerStore + ?Sized> PlayerStore for Arc<T> {
    async fn load(&self, user_id: &str) -> Result<Option<VersionedRecord>, String> {
        (**self).load(user_id).await
    }

    async fn commit(
        &self,
        user_id: &str,
        expected_version: u64,
        record: PlayerRecord,
    ) -> Result<CommitOutcome, String> {
        (**self).commit(user_id, expected_version, record).await
    }
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}

// Port for uniform random values in [0, 1) used by reward rolls.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}
