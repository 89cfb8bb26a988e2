//! Motion tuning for tank creatures.
//!
//! Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).
//! Distances are tank units, speeds are units per second. The defaults are
//! sized for a tank `REFERENCE_EXTENT` units across on its longest axis; other
//! tanks (pixel canvases included) use `scaled`.

/// Longest axis of the tank the default tuning was sized for.
pub const REFERENCE_EXTENT: f32 = 16.0;

#[derive(Debug, Clone, Copy)]
pub struct SteeringTuning {
    /// Speed an entity settles at while heading for its wander target.
    pub cruise_speed: f32,

    /// Hard cap applied after separation forces.
    pub max_speed: f32,

    /// Fraction of the gap to the desired velocity closed each tick (0..=1).
    pub smoothing: f32,

    /// Chance per tick of picking a fresh wander target.
    pub wander_chance: f32,

    /// Distance at which a target counts as reached and is replaced.
    pub arrival_radius: f32,

    /// Neighbours closer than this push each other apart.
    pub separation_distance: f32,

    /// Repulsion scale; the push is `strength / distance`.
    pub separation_strength: f32,

    /// Band inside each wall where outward velocity is reflected.
    pub margin: f32,

    /// Cosmetic vertical bob, units per second at the crest.
    pub bob_amplitude: f32,

    /// Bob frequency in radians per second.
    pub bob_frequency: f32,

    /// Fraction of the heading error closed each tick (0..=1).
    pub heading_smoothing: f32,

    /// Tail beat rate at rest, radians per second.
    pub tail_rate: f32,

    /// Extra tail beat per unit of speed.
    pub tail_speed_gain: f32,

    /// Body size reported to the renderer.
    pub entity_size: f32,
}

impl Default for SteeringTuning {
    fn default() -> Self {
        Self {
            cruise_speed: 0.9,
            max_speed: 1.5,
            smoothing: 0.1,
            wander_chance: 0.01,
            arrival_radius: 0.2,
            separation_distance: 1.0,
            separation_strength: 0.05,
            margin: 0.5,
            bob_amplitude: 0.12,
            bob_frequency: 2.0,
            heading_smoothing: 0.1,
            tail_rate: 6.0,
            tail_speed_gain: 4.0,
            entity_size: 0.3,
        }
    }
}

impl SteeringTuning {
    /// Tuning for a tank `factor` times the reference size.
    ///
    /// Lengths and speeds grow linearly. Separation strength grows with the
    /// square so that `strength / distance` stays a speed, and the tail gain
    /// shrinks so the beat rate at cruise is unchanged. Rates, chances and
    /// smoothing factors are dimensionless and kept.
    pub fn scaled(&self, factor: f32) -> Self {
        if !(factor.is_finite() && factor > 0.0) {
            return *self;
        }
        Self {
            cruise_speed: self.cruise_speed * factor,
            max_speed: self.max_speed * factor,
            arrival_radius: self.arrival_radius * factor,
            separation_distance: self.separation_distance * factor,
            separation_strength: self.separation_strength * factor * factor,
            margin: self.margin * factor,
            bob_amplitude: self.bob_amplitude * factor,
            tail_speed_gain: self.tail_speed_gain / factor,
            entity_size: self.entity_size * factor,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_factor_is_one_then_tuning_is_unchanged() {
        let tuning = SteeringTuning::default();

        let same = tuning.scaled(1.0);

        assert_eq!(same.cruise_speed, tuning.cruise_speed);
        assert_eq!(same.separation_strength, tuning.separation_strength);
        assert_eq!(same.tail_speed_gain, tuning.tail_speed_gain);
    }

    #[test]
    fn when_tank_is_fifty_times_larger_then_lengths_and_speeds_follow() {
        let tuning = SteeringTuning::default().scaled(50.0);

        assert!((tuning.cruise_speed - 45.0).abs() < 1e-3);
        assert!((tuning.separation_distance - 50.0).abs() < 1e-3);
        assert!((tuning.margin - 25.0).abs() < 1e-3);
        assert!((tuning.separation_strength - 125.0).abs() < 1e-3);
        assert_eq!(tuning.wander_chance, 0.01);
    }

    #[test]
    fn when_factor_is_degenerate_then_tuning_is_kept() {
        let tuning = SteeringTuning::default();

        assert_eq!(tuning.scaled(0.0).max_speed, tuning.max_speed);
        assert_eq!(tuning.scaled(f32::NAN).margin, tuning.margin);
    }
}
