use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;

use crate::domain::ledger::{PlayerRecord, VersionedRecord};
use crate::domain::ports::{CommitOutcome, PlayerStore};
use crate::domain::quota::QuotaState;

// PostgreSQL-backed player store.
//
// One row per user in `players` carries the version, quota and totals; owned
// species live in `collection_entries` and are only ever inserted.
#[derive(Clone)]
pub struct PostgresPlayerStore {
    pub db: PgPool,
}

fn to_u64(value: i64, column: &str) -> Result<u64, String> {
    u64::try_from(value).map_err(|_| format!("negative value in {column}"))
}

fn to_i64(value: u64, column: &str) -> Result<i64, String> {
    i64::try_from(value).map_err(|_| format!("{column} out of range"))
}

#[async_trait]
impl PlayerStore for PostgresPlayerStore {
    async fn load(&self, user_id: &str) -> Result<Option<VersionedRecord>, String> {
        // Both reads see one snapshot, so totals and entries come from the same version.
        let mut tx = self.db.begin().await.map_err(|e| e.to_string())?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| e.to_string())?;

        let row = sqlx::query_as::<_, (i64, i32, i64, i64, i64)>(
            r#"
            SELECT version, remaining, next_reset_at, total_points, total_draws
            FROM players
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| e.to_string())?;

        let Some((version, remaining, next_reset_at, total_points, total_draws)) = row else {
            tx.commit().await.map_err(|e| e.to_string())?;
            return Ok(None);
        };

        let entries = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT species_id, unlocked_at
            FROM collection_entries
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| e.to_string())?;
        tx.commit().await.map_err(|e| e.to_string())?;

        let mut collection = BTreeMap::new();
        for (species_id, unlocked_at) in entries {
            collection.insert(species_id, to_u64(unlocked_at, "unlocked_at")?);
        }

        Ok(Some(VersionedRecord {
            version: to_u64(version, "version")?,
            record: PlayerRecord {
                quota: QuotaState {
                    remaining: u32::try_from(remaining)
                        .map_err(|_| "negative value in remaining".to_string())?,
                    next_reset_at: to_u64(next_reset_at, "next_reset_at")?,
                },
                collection,
                total_points: to_u64(total_points, "total_points")?,
                total_draws: to_u64(total_draws, "total_draws")?,
            },
        }))
    }

    async fn commit(
        &self,
        user_id: &str,
        expected_version: u64,
        record: PlayerRecord,
    ) -> Result<CommitOutcome, String> {
        let version = expected_version + 1;
        let remaining =
            i32::try_from(record.quota.remaining).map_err(|_| "remaining out of range".to_string())?;

        let mut tx = self.db.begin().await.map_err(|e| e.to_string())?;

        // Version 0 means the caller saw no row; insert only if nobody beat us to it.
        let result = if expected_version == 0 {
            sqlx::query(
                r#"
                INSERT INTO players (user_id, version, remaining, next_reset_at, total_points, total_draws)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (user_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(to_i64(version, "version")?)
            .bind(remaining)
            .bind(to_i64(record.quota.next_reset_at, "next_reset_at")?)
            .bind(to_i64(record.total_points, "total_points")?)
            .bind(to_i64(record.total_draws, "total_draws")?)
            .execute(&mut *tx)
            .await
        } else {
            sqlx::query(
                r#"
                UPDATE players
                SET version = $2, remaining = $3, next_reset_at = $4, total_points = $5, total_draws = $6
                WHERE user_id = $1 AND version = $7
                "#,
            )
            .bind(user_id)
            .bind(to_i64(version, "version")?)
            .bind(remaining)
            .bind(to_i64(record.quota.next_reset_at, "next_reset_at")?)
            .bind(to_i64(record.total_points, "total_points")?)
            .bind(to_i64(record.total_draws, "total_draws")?)
            .bind(to_i64(expected_version, "version")?)
            .execute(&mut *tx)
            .await
        }
        .map_err(|e| e.to_string())?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| e.to_string())?;
            return Ok(CommitOutcome::Conflict);
        }

        for (species_id, unlocked_at) in &record.collection {
            sqlx::query(
                r#"
                INSERT INTO collection_entries (user_id, species_id, unlocked_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, species_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(species_id)
            .bind(to_i64(*unlocked_at, "unlocked_at")?)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.to_string())?;
        }

        tx.commit().await.map_err(|e| e.to_string())?;
        Ok(CommitOutcome::Committed { version })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_stored_value_is_negative_then_conversion_fails() {
        assert!(to_u64(-1, "total_points").is_err());
        assert_eq!(to_u64(7, "total_points"), Ok(7));
    }

    #[test]
    fn when_value_exceeds_bigint_then_conversion_fails() {
        assert!(to_i64(u64::MAX, "total_points").is_err());
    }
}
