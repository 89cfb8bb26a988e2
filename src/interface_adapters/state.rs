use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::domain::ledger::{PlayerRecord, VersionedRecord};
use crate::domain::ports::{Clock, CommitOutcome, PlayerStore};
use crate::domain::quota::QuotaManager;
use crate::domain::reward::RewardEngine;
use crate::interface_adapters::utils::rng::SeededRandom;
use crate::use_cases::TankHandle;

// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    // Per-user records; in-memory or Postgres depending on configuration.
    pub store: Arc<dyn PlayerStore>,
    // Catalog plus weight table, validated at startup.
    pub engine: Arc<RewardEngine>,
    pub quota: QuotaManager,
    // Process-wide draw randomness.
    pub random: SeededRandom,
    // Channels into the shared tank task.
    pub tank: TankHandle,
}

// In-memory player store adapter.
#[derive(Clone, Default)]
pub struct InMemoryPlayerStore {
    pub records: Arc<Mutex<HashMap<String, VersionedRecord>>>,
}

#[async_trait]
impl PlayerStore for InMemoryPlayerStore {
    async fn load(&self, user_id: &str) -> Result<Option<VersionedRecord>, String> {
        let records = self.records.lock().await;
        Ok(records.get(user_id).cloned())
    }

    async fn commit(
        &self,
        user_id: &str,
        expected_version: u64,
        record: PlayerRecord,
    ) -> Result<CommitOutcome, String> {
        let mut records = self.records.lock().await;
        let current = records.get(user_id).map(|r| r.version).unwrap_or(0);
        if current != expected_version {
            return Ok(CommitOutcome::Conflict);
        }

        let version = current + 1;
        records.insert(user_id.to_string(), VersionedRecord { version, record });
        Ok(CommitOutcome::Committed { version })
    }
}

// System clock adapter used by reward use cases.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
