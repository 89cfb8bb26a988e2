use crate::domain::catalog::{CatalogError, SpeciesCatalog};
use crate::domain::quota::QuotaManager;
use crate::domain::weights::RarityWeights;
use glam::Vec3;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs, time::Duration};
use thiserror::Error;

// Runtime/server constants (not steering tuning).

pub fn http_port() -> u16 {
    env::var("AQUARIUM_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3004)
}

// Postgres is used when set; otherwise records live in memory.
pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty())
}

pub fn reward_config_path() -> Option<PathBuf> {
    env::var("REWARD_CONFIG_PATH").ok().map(PathBuf::from)
}

pub fn catalog_path() -> Option<PathBuf> {
    env::var("CATALOG_PATH").ok().map(PathBuf::from)
}

// Fixed seed for both the tank and draw generators.
pub fn rng_seed() -> Option<u64> {
    env::var("TANK_SEED").ok().and_then(|v| v.parse().ok())
}

pub const TANK_EVENT_CHANNEL_CAPACITY: usize = 64;
pub const TANK_BROADCAST_CAPACITY: usize = 128;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);
pub const TANK_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_TANK_POPULATION: usize = 8;
// Half extents of the default deep tank.
pub const DEFAULT_TANK_HALF_EXTENTS: Vec3 = Vec3::new(8.0, 4.0, 3.0);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid reward config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("daily_quota must be at least 1")]
    ZeroQuota,
    #[error("reset_interval_hours must be at least 1")]
    ZeroInterval,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Process-wide reward settings, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub weights: RarityWeights,
    pub daily_quota: u32,
    pub reset_interval_hours: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            weights: RarityWeights::default(),
            daily_quota: 1,
            reset_interval_hours: 24,
        }
    }
}

impl RewardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RewardConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Quota bounds only; weights are checked against the catalog when the engine is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daily_quota == 0 {
            return Err(ConfigError::ZeroQuota);
        }
        if self.reset_interval_hours == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    pub fn quota_manager(&self) -> QuotaManager {
        QuotaManager::new(self.daily_quota, self.reset_interval_hours)
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_reward_config() -> Result<RewardConfig, ConfigError> {
    match reward_config_path() {
        Some(path) => RewardConfig::from_toml_str(&read_file(&path)?),
        None => Ok(RewardConfig::default()),
    }
}

pub fn load_catalog() -> Result<SpeciesCatalog, ConfigError> {
    match catalog_path() {
        Some(path) => Ok(SpeciesCatalog::from_json(&read_file(&path)?)?),
        None => Ok(SpeciesCatalog::builtin()?),
    }
}
