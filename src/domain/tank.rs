// Tank state: bounds, live entities and the snapshots handed to renderers.

use crate::domain::catalog::SpeciesCatalog;
use crate::domain::steering;
use crate::domain::tuning::{REFERENCE_EXTENT, SteeringTuning};
use glam::Vec3;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::warn;

/// Axis-aligned box that entity centers must stay inside.
///
/// A box with zero depth is a flat (2D) tank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl TankBounds {
    /// Box centered on the origin.
    pub fn centered(half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: -half,
            max: half,
        }
    }

    /// Canvas-style rectangle with the origin in the top-left corner.
    pub fn canvas(width: f32, height: f32) -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::new(width.max(0.0), height.max(0.0), 0.0),
        }
    }

    /// Centered box from full width/height/depth; no depth means a flat tank.
    pub fn from_extent(width: f32, height: f32, depth: Option<f32>) -> Self {
        Self::centered(Vec3::new(width, height, depth.unwrap_or(0.0)) * 0.5)
    }

    pub fn is_flat(&self) -> bool {
        self.max.z - self.min.z <= f32::EPSILON
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Factor applied to the steering tuning so motion reads the same at any size.
    pub fn tuning_scale(&self) -> f32 {
        let longest = self.size().max_element();
        if longest.is_finite() && longest > 0.0 {
            longest / REFERENCE_EXTENT
        } else {
            1.0
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn clamp(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Uniform point inside the box, kept `inset` away from the walls where room allows.
    pub fn random_point<R: Rng + ?Sized>(&self, inset: f32, rng: &mut R) -> Vec3 {
        let mut point = Vec3::ZERO;
        for axis in 0..3 {
            let lo = self.min[axis] + inset;
            let hi = self.max[axis] - inset;
            point[axis] = if lo < hi {
                rng.random_range(lo..hi)
            } else {
                (self.min[axis] + self.max[axis]) * 0.5
            };
        }
        point
    }
}

/// One creature swimming in the tank.
#[derive(Debug, Clone, PartialEq)]
pub struct TankEntity {
    pub id: u64,
    pub species_id: String,
    pub position: Vec3,
    pub velocity: Vec3,
    pub heading: f32,
    // Tail animation phase in [0, TAU).
    pub tail_phase: f32,
    // Per-entity offset so bobbing is not in lockstep.
    pub bob_offset: f32,
    pub target: Option<Vec3>,
    pub size: f32,
}

/// Request to place one species in the tank.
#[derive(Debug, Clone, PartialEq)]
pub struct TankSeed {
    pub species_id: String,
    pub position: Option<Vec3>,
}

impl TankSeed {
    pub fn new(species_id: impl Into<String>) -> Self {
        Self {
            species_id: species_id.into(),
            position: None,
        }
    }
}

/// Per-tick transform handed to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: u64,
    pub species_id: String,
    pub position: Vec3,
    pub velocity: Vec3,
    pub heading: f32,
    pub animation_phase: f32,
    pub size: f32,
}

impl From<&TankEntity> for EntitySnapshot {
    fn from(e: &TankEntity) -> Self {
        Self {
            id: e.id,
            species_id: e.species_id.clone(),
            position: e.position,
            velocity: e.velocity,
            heading: e.heading,
            animation_phase: e.tail_phase,
            size: e.size,
        }
    }
}

pub struct Tank {
    bounds: TankBounds,
    entities: Vec<TankEntity>,
    // Seconds simulated so far; drives the cosmetic bob.
    time: f32,
    next_entity_id: u64,
}

impl Tank {
    pub fn new(bounds: TankBounds) -> Self {
        Self {
            bounds,
            entities: Vec::new(),
            time: 0.0,
            next_entity_id: 1,
        }
    }

    pub fn bounds(&self) -> TankBounds {
        self.bounds
    }

    pub fn entities(&self) -> &[TankEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Tuning scaled to the current bounds.
    pub fn effective_tuning(&self, tuning: &SteeringTuning) -> SteeringTuning {
        tuning.scaled(self.bounds.tuning_scale())
    }

    /// Replaces every entity with one per seed. Unknown species are dropped.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        catalog: &SpeciesCatalog,
        seeds: &[TankSeed],
        tuning: &SteeringTuning,
        rng: &mut R,
    ) {
        self.entities.clear();
        let tuning = self.effective_tuning(tuning);
        let flat = self.bounds.is_flat();

        for seed in seeds {
            if !catalog.contains(&seed.species_id) {
                warn!(species_id = %seed.species_id, "unknown species in tank seed; dropping");
                continue;
            }

            let position = match seed.position {
                Some(p) if p.is_finite() => self.bounds.clamp(p),
                _ => self.bounds.random_point(tuning.margin, rng),
            };
            let velocity = steering::random_unit(rng, flat) * tuning.cruise_speed * 0.5;
            let heading = steering::heading_of(velocity, flat);

            self.entities.push(TankEntity {
                id: self.next_entity_id,
                species_id: seed.species_id.clone(),
                position,
                velocity,
                heading,
                tail_phase: rng.random_range(0.0..std::f32::consts::TAU),
                bob_offset: rng.random_range(0.0..std::f32::consts::TAU),
                target: None,
                size: tuning.entity_size,
            });
            self.next_entity_id += 1;
        }
    }

    /// Swaps the bounds, pulls every entity (and its target) back inside and rescales bodies.
    pub fn resize(&mut self, bounds: TankBounds) {
        let ratio = bounds.tuning_scale() / self.bounds.tuning_scale();
        self.bounds = bounds;
        let flat = bounds.is_flat();
        for e in &mut self.entities {
            e.size *= ratio;
            e.position = bounds.clamp(e.position);
            e.target = e.target.map(|t| bounds.clamp(t));
            if flat {
                e.velocity.z = 0.0;
            }
        }
    }

    /// Advances the simulation by one tick of `dt` seconds.
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f32, tuning: &SteeringTuning, rng: &mut R) {
        self.time += dt;
        let tuning = self.effective_tuning(tuning);
        steering::tick(&mut self.entities, &self.bounds, &tuning, self.time, dt, rng);
    }

    /// Entity transforms ordered by id.
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        // Entities are created with increasing ids and only ever removed.
        self.entities.iter().map(EntitySnapshot::from).collect()
    }
}

/// Random sample, without replacement, of up to `count` catalog species.
pub fn default_seeds<R: Rng + ?Sized>(
    catalog: &SpeciesCatalog,
    count: usize,
    rng: &mut R,
) -> Vec<TankSeed> {
    catalog
        .all()
        .choose_multiple(rng, count.min(catalog.len()))
        .map(|s| TankSeed::new(s.id.clone()))
        .collect()
}

/// One seed per owned species that still exists in the catalog.
pub fn seeds_for_collection(catalog: &SpeciesCatalog, species_ids: &[String]) -> Vec<TankSeed> {
    species_ids
        .iter()
        .filter(|id| catalog.contains(id))
        .map(|id| TankSeed::new(id.clone()))
        .collect()
}
