use crate::domain::errors::DrawError;
use crate::domain::ports::{Clock, PlayerStore};
use crate::domain::quota::{QuotaManager, QuotaState};

// Read-only quota lookup; the lazy reset is applied to a copy and never stored.
pub struct QuotaStatusUseCase<C, S> {
    pub clock: C,
    pub store: S,
    pub quota: QuotaManager,
}

impl<C, S> QuotaStatusUseCase<C, S>
where
    C: Clock,
    S: PlayerStore,
{
    pub async fn execute(&self, user_id: &str) -> Result<QuotaState, DrawError> {
        let now = self.clock.now_epoch_seconds();
        let stored = self
            .store
            .load(user_id)
            .await
            .map_err(DrawError::StorageFailure)?;

        Ok(self.quota.status(stored.map(|s| s.record.quota), now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::PlayerRecord;
    use crate::use_cases::test_support::{FailureFlags, FixedClock, RecordingStore};

    #[tokio::test]
    async fn when_user_is_unknown_then_full_quota_is_reported_without_writing() {
        let store = RecordingStore::new();
        let use_case = QuotaStatusUseCase {
            clock: FixedClock(90_000),
            store: store.clone(),
            quota: QuotaManager::new(3, 24),
        };

        let state = use_case.execute("ivy").await.expect("expected status");

        assert_eq!(
            state,
            QuotaState {
                remaining: 3,
                next_reset_at: 172_800
            }
        );
        assert!(store.get_test_record("ivy").is_none());
    }

    #[tokio::test]
    async fn when_boundary_passed_then_reset_is_shown_but_not_persisted() {
        let store = RecordingStore::new();
        store.insert_test_record(
            "jo",
            PlayerRecord::new(QuotaState {
                remaining: 0,
                next_reset_at: 86_400,
            }),
        );
        let use_case = QuotaStatusUseCase {
            clock: FixedClock(90_000),
            store: store.clone(),
            quota: QuotaManager::new(1, 24),
        };

        let state = use_case.execute("jo").await.expect("expected status");

        assert_eq!(state.remaining, 1);
        assert_eq!(state.next_reset_at, 172_800);
        let saved = store.get_test_record("jo").expect("record stays");
        assert_eq!(saved.record.quota.remaining, 0);
    }

    #[tokio::test]
    async fn when_store_load_fails_then_returns_storage_failure() {
        let use_case = QuotaStatusUseCase {
            clock: FixedClock(0),
            store: RecordingStore::new().with_failures(FailureFlags {
                load: true,
                ..FailureFlags::default()
            }),
            quota: QuotaManager::new(1, 24),
        };

        let result = use_case.execute("kim").await;

        assert!(matches!(result, Err(DrawError::StorageFailure(_))));
    }
}
