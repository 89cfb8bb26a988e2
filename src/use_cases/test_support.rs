use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::ledger::{PlayerRecord, VersionedRecord};
use crate::domain::ports::{Clock, CommitOutcome, PlayerStore, RandomSource};

pub(crate) type RecordTable = Arc<Mutex<HashMap<String, VersionedRecord>>>;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

// Replays a fixed list of unit values, wrapping around at the end.
pub(crate) struct SequenceRandom {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.values[i % self.values.len()]
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub load: bool,
    pub commit: bool,
    // Every commit loses the version race.
    pub conflict: bool,
}

#[derive(Clone)]
pub(crate) struct RecordingStore {
    records: RecordTable,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn insert_test_record(&self, user_id: impl Into<String>, record: PlayerRecord) {
        let mut guard = self.records.lock().expect("records mutex poisoned");
        guard.insert(user_id.into(), VersionedRecord { version: 1, record });
    }

    pub(crate) fn get_test_record(&self, user_id: &str) -> Option<VersionedRecord> {
        let guard = self.records.lock().expect("records mutex poisoned");
        guard.get(user_id).cloned()
    }
}

#[async_trait]
impl PlayerStore for RecordingStore {
    async fn load(&self, user_id: &str) -> Result<Option<VersionedRecord>, String> {
        if self.failures.load {
            return Err("load failed".to_string());
        }

        let guard = self.records.lock().expect("records mutex poisoned");
        Ok(guard.get(user_id).cloned())
    }

    async fn commit(
        &self,
        user_id: &str,
        expected_version: u64,
        record: PlayerRecord,
    ) -> Result<CommitOutcome, String> {
        if self.failures.commit {
            return Err("commit failed".to_string());
        }
        if self.failures.conflict {
            return Ok(CommitOutcome::Conflict);
        }

        let mut guard = self.records.lock().expect("records mutex poisoned");
        let current = guard.get(user_id).map(|r| r.version).unwrap_or(0);
        if current != expected_version {
            return Ok(CommitOutcome::Conflict);
        }
        let version = current + 1;
        guard.insert(user_id.to_string(), VersionedRecord { version, record });
        Ok(CommitOutcome::Committed { version })
    }
}
