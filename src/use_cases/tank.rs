// Shared tank orchestration: the steering loop task and the handle used to reach it.

use crate::domain::catalog::SpeciesCatalog;
use crate::domain::tank::{EntitySnapshot, Tank, TankBounds, TankSeed, default_seeds, seeds_for_collection};
use crate::domain::tuning::SteeringTuning;
use axum::extract::ws::Utf8Bytes;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Commands applied by the tank task between ticks.
#[derive(Debug, Clone)]
pub enum TankEvent {
    Resize { bounds: TankBounds },
    /// Replace every entity. An empty list means a fresh default sample.
    Populate { species_ids: Vec<String> },
}

/// Snapshot of the tank for one tick.
#[derive(Debug, Clone)]
pub struct TankUpdate {
    pub tick: u64,
    pub bounds: TankBounds,
    pub entities: Vec<EntitySnapshot>,
}

/// Runtime settings for the tank loop.
#[derive(Debug, Clone)]
pub struct TankSettings {
    /// Capacity for queued resize/populate commands.
    pub event_channel_capacity: usize,
    /// Capacity for broadcast tank updates.
    pub broadcast_capacity: usize,
    /// Fixed steering step.
    pub tick_interval: Duration,
    /// How often the tank restocks from a random sample.
    pub refresh_interval: Duration,
    /// Entities in the default sample.
    pub default_population: usize,
    pub initial_bounds: TankBounds,
    /// Fixed RNG seed for reproducible runs; fresh entropy when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TankCommandError {
    #[error("tank command queue is full")]
    Busy,
    #[error("tank task has stopped")]
    Stopped,
}

/// Channels into and out of the running tank task.
#[derive(Clone)]
pub struct TankHandle {
    /// Sender for commands into the tank task.
    pub events_tx: mpsc::Sender<TankEvent>,
    /// Broadcast sender for raw tank updates.
    pub updates_tx: broadcast::Sender<TankUpdate>,
    /// Latest raw update for snapshot reads; None before the first tick.
    pub latest_tx: watch::Sender<Option<TankUpdate>>,
    /// Broadcast sender for serialized tank updates.
    pub bytes_tx: broadcast::Sender<Utf8Bytes>,
    /// Latest serialized update for lag recovery.
    pub latest_bytes_tx: watch::Sender<Utf8Bytes>,
    shutdown: Arc<Notify>,
}

impl TankHandle {
    pub fn resize(&self, bounds: TankBounds) -> Result<(), TankCommandError> {
        self.send(TankEvent::Resize { bounds })
    }

    pub fn populate(&self, species_ids: Vec<String>) -> Result<(), TankCommandError> {
        self.send(TankEvent::Populate { species_ids })
    }

    pub fn latest(&self) -> Option<TankUpdate> {
        self.latest_tx.borrow().clone()
    }

    /// Stops the tank task after its current tick.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    fn send(&self, event: TankEvent) -> Result<(), TankCommandError> {
        self.events_tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TankCommandError::Busy,
            mpsc::error::TrySendError::Closed(_) => TankCommandError::Stopped,
        })
    }
}

/// Creates the tank channels and spawns the steering loop. Must run inside a tokio runtime.
pub fn spawn_tank(catalog: Arc<SpeciesCatalog>, settings: TankSettings) -> TankHandle {
    let (events_tx, events_rx) = mpsc::channel::<TankEvent>(settings.event_channel_capacity);
    let (updates_tx, _updates_rx) = broadcast::channel::<TankUpdate>(settings.broadcast_capacity);
    let (latest_tx, _latest_rx) = watch::channel::<Option<TankUpdate>>(None);
    let (bytes_tx, _bytes_rx) = broadcast::channel::<Utf8Bytes>(settings.broadcast_capacity);
    let (latest_bytes_tx, _latest_bytes_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let shutdown = Arc::new(Notify::new());

    tokio::spawn(tank_task(
        catalog,
        settings,
        events_rx,
        updates_tx.clone(),
        latest_tx.clone(),
        shutdown.clone(),
    ));

    TankHandle {
        events_tx,
        updates_tx,
        latest_tx,
        bytes_tx,
        latest_bytes_tx,
        shutdown,
    }
}

pub async fn tank_task(
    catalog: Arc<SpeciesCatalog>,
    settings: TankSettings,
    mut events_rx: mpsc::Receiver<TankEvent>,
    updates_tx: broadcast::Sender<TankUpdate>,
    latest_tx: watch::Sender<Option<TankUpdate>>,
    shutdown: Arc<Notify>,
) {
    let mut rng = match settings.seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let tuning = SteeringTuning::default();

    let mut tank = Tank::new(settings.initial_bounds);
    let seeds = default_seeds(&catalog, settings.default_population, &mut rng);
    tank.populate(&catalog, &seeds, &tuning, &mut rng);
    info!(entities = tank.len(), "tank stocked");

    let mut interval = tokio::time::interval(settings.tick_interval);
    // A slow tick is dropped rather than replayed in a burst.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut refresh = tokio::time::interval_at(
        Instant::now() + settings.refresh_interval,
        settings.refresh_interval,
    );

    let dt = settings.tick_interval.as_secs_f32();
    let mut tick: u64 = 0;

    loop {
        let restock = tokio::select! {
            _ = shutdown.notified() => {
                info!(tick, "tank task stopping");
                break;
            }
            _ = refresh.tick() => true,
            _ = interval.tick() => false,
        };

        if restock {
            let seeds = default_seeds(&catalog, settings.default_population, &mut rng);
            tank.populate(&catalog, &seeds, &tuning, &mut rng);
            info!(entities = tank.len(), "tank restocked");
            continue;
        }

        // Commands only land between ticks.
        while let Ok(event) = events_rx.try_recv() {
            match event {
                TankEvent::Resize { bounds } => {
                    debug!(?bounds, "tank resized");
                    tank.resize(bounds);
                }
                TankEvent::Populate { species_ids } => {
                    // Nothing owned that still exists falls back to the default sample.
                    let mut seeds: Vec<TankSeed> = seeds_for_collection(&catalog, &species_ids);
                    if seeds.is_empty() {
                        seeds = default_seeds(&catalog, settings.default_population, &mut rng);
                    }
                    tank.populate(&catalog, &seeds, &tuning, &mut rng);
                    info!(entities = tank.len(), "tank repopulated");
                }
            }
        }

        tank.step(dt, &tuning, &mut rng);
        tick += 1;

        let update = TankUpdate {
            tick,
            bounds: tank.bounds(),
            entities: tank.snapshot(),
        };
        latest_tx.send_replace(Some(update.clone()));
        let _ = updates_tx.send(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn settings() -> TankSettings {
        TankSettings {
            event_channel_capacity: 8,
            broadcast_capacity: 64,
            tick_interval: Duration::from_millis(16),
            refresh_interval: Duration::from_secs(1800),
            default_population: 8,
            initial_bounds: TankBounds::centered(Vec3::new(8.0, 4.0, 3.0)),
            seed: Some(42),
        }
    }

    fn catalog() -> Arc<SpeciesCatalog> {
        Arc::new(SpeciesCatalog::builtin().expect("builtin catalog is valid"))
    }

    async fn next_update_matching(
        rx: &mut broadcast::Receiver<TankUpdate>,
        pred: impl Fn(&TankUpdate) -> bool,
    ) -> TankUpdate {
        for _ in 0..100 {
            let update = rx.recv().await.expect("tank should keep publishing");
            if pred(&update) {
                return update;
            }
        }
        panic!("no matching tank update within 100 ticks");
    }

    #[tokio::test(start_paused = true)]
    async fn when_tank_starts_then_it_publishes_the_default_sample() {
        let handle = spawn_tank(catalog(), settings());
        let mut rx = handle.updates_tx.subscribe();

        let update = next_update_matching(&mut rx, |_| true).await;

        assert_eq!(update.entities.len(), 8);
        assert!(handle.latest().is_some());
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn when_resize_is_sent_then_later_updates_use_the_new_bounds() {
        let handle = spawn_tank(catalog(), settings());
        let mut rx = handle.updates_tx.subscribe();
        let bounds = TankBounds::canvas(40.0, 20.0);

        handle.resize(bounds).expect("resize should queue");
        let update = next_update_matching(&mut rx, |u| u.bounds == bounds).await;

        assert!(update.entities.iter().all(|e| bounds.contains(e.position)));
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn when_populated_from_collection_then_only_owned_species_swim() {
        let handle = spawn_tank(catalog(), settings());
        let mut rx = handle.updates_tx.subscribe();

        handle
            .populate(vec!["3".to_string(), "17".to_string()])
            .expect("populate should queue");
        let update = next_update_matching(&mut rx, |u| u.entities.len() == 2).await;

        let mut ids: Vec<_> = update.entities.iter().map(|e| e.species_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["17", "3"]);
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn when_every_owned_species_is_retired_then_default_sample_is_used() {
        let handle = spawn_tank(catalog(), settings());
        let mut rx = handle.updates_tx.subscribe();

        handle
            .populate(vec!["retired-eel".to_string()])
            .expect("populate should queue");
        // The first stocking used ids 1..=8; a repopulated tank starts after them.
        let update = next_update_matching(&mut rx, |u| u.entities.iter().all(|e| e.id > 8)).await;

        assert_eq!(update.entities.len(), 8);
        handle.shutdown();
    }
}
