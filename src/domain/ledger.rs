// Per-user collection, point ledger and quota, committed as one record.

use crate::domain::quota::QuotaState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ownership of one species by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub species_id: String,
    pub unlocked_at: u64,
}

/// Everything a draw reads and writes for a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub quota: QuotaState,
    // species id -> unlock time (epoch seconds); entries are never removed.
    pub collection: BTreeMap<String, u64>,
    pub total_points: u64,
    pub total_draws: u64,
}

impl PlayerRecord {
    pub fn new(quota: QuotaState) -> Self {
        Self {
            quota,
            collection: BTreeMap::new(),
            total_points: 0,
            total_draws: 0,
        }
    }

    pub fn owns(&self, species_id: &str) -> bool {
        self.collection.contains_key(species_id)
    }

    /// Records ownership. Returns true when the species was not owned before.
    pub fn acquire(&mut self, species_id: &str, now: u64) -> bool {
        if self.owns(species_id) {
            return false;
        }
        self.collection.insert(species_id.to_string(), now);
        true
    }

    /// Adds points and returns the new total.
    pub fn award(&mut self, points: u32) -> u64 {
        self.total_points = self.total_points.saturating_add(u64::from(points));
        self.total_points
    }

    pub fn species_ids(&self) -> Vec<String> {
        self.collection.keys().cloned().collect()
    }

    pub fn entries(&self) -> Vec<CollectionEntry> {
        self.collection
            .iter()
            .map(|(species_id, &unlocked_at)| CollectionEntry {
                species_id: species_id.clone(),
                unlocked_at,
            })
            .collect()
    }
}

/// Stored record plus the version used for optimistic commits.
///
/// Version 0 is reserved for "not stored yet".
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedRecord {
    pub version: u64,
    pub record: PlayerRecord,
}
