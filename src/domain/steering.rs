use crate::domain::tank::{TankBounds, TankEntity};
use crate::domain::tuning::SteeringTuning;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};
use tracing::warn;

// Closest distance used when scaling separation, as a fraction of the separation distance.
const MIN_SEPARATION_FRACTION: f32 = 0.05;

/// Runs one steering pass over every entity.
///
/// Order per entity: wander, separation, integrate, containment, orientation.
/// Entities whose state became non-finite are dropped.
pub fn tick<R: Rng + ?Sized>(
    entities: &mut Vec<TankEntity>,
    bounds: &TankBounds,
    tuning: &SteeringTuning,
    time: f32,
    dt: f32,
    rng: &mut R,
) {
    entities.retain(|e| {
        let finite = e.position.is_finite() && e.velocity.is_finite() && e.heading.is_finite();
        if !finite {
            warn!(entity_id = e.id, species_id = %e.species_id, "non-finite entity state; removing");
        }
        finite
    });

    if !(dt > 0.0 && dt.is_finite()) {
        return;
    }

    let flat = bounds.is_flat();
    let min_separation = tuning.separation_distance * MIN_SEPARATION_FRACTION;
    let cruise = tuning.cruise_speed.min(tuning.max_speed);

    // Separation reads positions from the start of the pass.
    let positions: Vec<Vec3> = entities.iter().map(|e| e.position).collect();

    for (i, e) in entities.iter_mut().enumerate() {
        // Wander toward a target, picking a new one on arrival or at random.
        let arrived = e
            .target
            .is_some_and(|t| t.distance(e.position) <= tuning.arrival_radius);
        if e.target.is_none() || arrived || rng.random::<f32>() < tuning.wander_chance {
            e.target = Some(bounds.random_point(tuning.margin, rng));
        }
        let target = e.target.unwrap_or(e.position);
        let dir = (target - e.position)
            .try_normalize()
            .unwrap_or_else(|| random_unit(rng, flat));
        e.velocity = e.velocity.lerp(dir * cruise, tuning.smoothing.clamp(0.0, 1.0));

        let mut push = Vec3::ZERO;
        for (j, other) in positions.iter().enumerate() {
            if i == j {
                continue;
            }
            let away = e.position - *other;
            let distance = away.length();
            if distance >= tuning.separation_distance {
                continue;
            }
            let dir = away.try_normalize().unwrap_or_else(|| random_unit(rng, flat));
            push += dir * (tuning.separation_strength / distance.max(min_separation));
        }
        e.velocity = (e.velocity + push).clamp_length_max(tuning.max_speed);
        if flat {
            e.velocity.z = 0.0;
        }

        e.position += e.velocity * dt;
        // Cosmetic bob; not part of the velocity.
        e.position.y += (time * tuning.bob_frequency + e.bob_offset).sin() * tuning.bob_amplitude * dt;

        contain(e, bounds, tuning.margin);

        let speed = e.velocity.length();
        if speed > f32::EPSILON {
            let desired = heading_of(e.velocity, flat);
            let delta = wrap_angle(desired - e.heading);
            e.heading = wrap_angle(e.heading + delta * tuning.heading_smoothing.clamp(0.0, 1.0));
        }
        e.tail_phase =
            (e.tail_phase + (tuning.tail_rate + speed * tuning.tail_speed_gain) * dt).rem_euclid(TAU);
    }
}

/// Reflects velocity pointing out of a wall inside the margin, then clamps the position.
fn contain(e: &mut TankEntity, bounds: &TankBounds, margin: f32) {
    for axis in 0..3 {
        let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
        let band = margin.min((hi - lo) * 0.5).max(0.0);
        let p = e.position[axis];
        let v = e.velocity[axis];
        if (p <= lo + band && v < 0.0) || (p >= hi - band && v > 0.0) {
            e.velocity[axis] = -v;
        }
    }
    e.position = bounds.clamp(e.position);
}

/// Facing angle for a velocity: XY plane for flat tanks, yaw around Y otherwise.
pub fn heading_of(velocity: Vec3, flat: bool) -> f32 {
    if flat {
        velocity.y.atan2(velocity.x)
    } else {
        velocity.x.atan2(velocity.z)
    }
}

/// Maps an angle into [-PI, PI).
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Uniform random direction; planar when `flat`.
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R, flat: bool) -> Vec3 {
    let theta = rng.random_range(0.0..TAU);
    if flat {
        return Vec3::new(theta.cos(), theta.sin(), 0.0);
    }
    let z: f32 = rng.random_range(-1.0..=1.0);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn entity(id: u64, position: Vec3, velocity: Vec3) -> TankEntity {
        TankEntity {
            id,
            species_id: "1".to_string(),
            position,
            velocity,
            heading: 0.0,
            tail_phase: 0.0,
            bob_offset: 0.0,
            target: None,
            size: 0.3,
        }
    }

    fn deep_bounds() -> TankBounds {
        TankBounds::centered(Vec3::new(8.0, 4.0, 3.0))
    }

    #[test]
    fn when_entity_is_pushed_past_wall_then_position_stays_inside() {
        let mut rng = Pcg32::seed_from_u64(7);
        let bounds = deep_bounds();
        let mut entities = vec![entity(1, Vec3::new(7.99, 0.0, 0.0), Vec3::new(1.5, 0.0, 0.0))];

        for _ in 0..120 {
            tick(&mut entities, &bounds, &SteeringTuning::default(), 0.0, 1.0 / 60.0, &mut rng);
        }

        assert!(bounds.contains(entities[0].position));
    }

    #[test]
    fn when_entity_heads_out_inside_margin_then_velocity_is_reflected() {
        let bounds = deep_bounds();
        let mut e = entity(1, Vec3::new(7.8, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));

        contain(&mut e, &bounds, 0.5);

        assert_eq!(e.velocity.x, -1.0);
    }

    #[test]
    fn when_entity_moves_inward_inside_margin_then_velocity_is_kept() {
        let bounds = deep_bounds();
        let mut e = entity(1, Vec3::new(7.8, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));

        contain(&mut e, &bounds, 0.5);

        assert_eq!(e.velocity.x, -1.0);
    }

    #[test]
    fn when_entities_overlap_then_separation_pushes_them_apart() {
        let mut rng = Pcg32::seed_from_u64(11);
        let bounds = deep_bounds();
        let mut entities = vec![
            entity(1, Vec3::new(-0.1, 0.0, 0.0), Vec3::ZERO),
            entity(2, Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO),
        ];
        // Targets far away on the same side so wander alone would not separate them.
        for e in &mut entities {
            e.target = Some(Vec3::new(0.0, 3.0, 0.0));
        }
        let tuning = SteeringTuning {
            wander_chance: 0.0,
            ..SteeringTuning::default()
        };

        tick(&mut entities, &bounds, &tuning, 0.0, 1.0 / 60.0, &mut rng);

        assert!(entities[0].velocity.x < 0.0);
        assert!(entities[1].velocity.x > 0.0);
    }

    #[test]
    fn when_canvas_neighbours_are_close_then_scaled_separation_pushes_them_apart() {
        let mut rng = Pcg32::seed_from_u64(12);
        let bounds = TankBounds::canvas(800.0, 600.0);
        let mut entities = vec![
            entity(1, Vec3::new(400.0, 300.0, 0.0), Vec3::ZERO),
            entity(2, Vec3::new(410.0, 300.0, 0.0), Vec3::ZERO),
        ];
        entities[0].target = Some(Vec3::new(400.0, 40.0, 0.0));
        entities[1].target = Some(Vec3::new(410.0, 40.0, 0.0));
        let tuning = SteeringTuning {
            wander_chance: 0.0,
            ..SteeringTuning::default()
        }
        .scaled(bounds.tuning_scale());

        tick(&mut entities, &bounds, &tuning, 0.0, 1.0 / 60.0, &mut rng);

        assert!(entities[0].velocity.x < 0.0);
        assert!(entities[1].velocity.x > 0.0);
        assert!(entities[0].position.distance(entities[1].position) > 10.0);
    }

    #[test]
    fn when_separation_is_strong_then_speed_is_capped() {
        let mut rng = Pcg32::seed_from_u64(3);
        let bounds = deep_bounds();
        let mut entities = vec![
            entity(1, Vec3::ZERO, Vec3::ZERO),
            entity(2, Vec3::new(0.01, 0.0, 0.0), Vec3::ZERO),
        ];
        let tuning = SteeringTuning {
            separation_strength: 50.0,
            ..SteeringTuning::default()
        };

        tick(&mut entities, &bounds, &tuning, 0.0, 1.0 / 60.0, &mut rng);

        for e in &entities {
            assert!(e.velocity.length() <= tuning.max_speed + 1e-4);
        }
    }

    #[test]
    fn when_state_is_not_finite_then_entity_is_removed() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut entities = vec![
            entity(1, Vec3::ZERO, Vec3::ZERO),
            entity(2, Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO),
        ];

        tick(&mut entities, &deep_bounds(), &SteeringTuning::default(), 0.0, 1.0 / 60.0, &mut rng);

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, 1);
    }

    #[test]
    fn when_tank_is_flat_then_entities_stay_on_the_plane() {
        let mut rng = Pcg32::seed_from_u64(9);
        let bounds = TankBounds::canvas(800.0, 600.0);
        let mut entities = vec![entity(1, Vec3::new(400.0, 300.0, 0.0), Vec3::new(0.5, 0.5, 0.0))];

        for step in 0..300 {
            tick(
                &mut entities,
                &bounds,
                &SteeringTuning::default(),
                step as f32 / 60.0,
                1.0 / 60.0,
                &mut rng,
            );
        }

        assert_eq!(entities[0].position.z, 0.0);
        assert_eq!(entities[0].velocity.z, 0.0);
    }

    #[test]
    fn when_heading_crosses_pi_then_it_turns_the_short_way() {
        let mut rng = Pcg32::seed_from_u64(1);
        let bounds = TankBounds::canvas(800.0, 600.0);
        // Facing just below +PI, moving toward just above -PI.
        let mut e = entity(1, Vec3::new(400.0, 300.0, 0.0), Vec3::new(-1.0, -0.05, 0.0));
        e.heading = PI - 0.05;
        e.target = Some(Vec3::new(0.0, 280.0, 0.0));
        let mut entities = vec![e];
        let tuning = SteeringTuning {
            wander_chance: 0.0,
            bob_amplitude: 0.0,
            ..SteeringTuning::default()
        };

        tick(&mut entities, &bounds, &tuning, 0.0, 1.0 / 60.0, &mut rng);

        let heading = entities[0].heading;
        assert!(heading.abs() > PI - 0.1, "heading {heading} took the long way");
    }

    #[test]
    fn when_angle_is_wrapped_then_it_lands_in_half_open_range() {
        assert!((wrap_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((wrap_angle(-0.5) - (-0.5)).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
    }
}
