use aquarium_server::domain::catalog::{Rarity, SpeciesCatalog};
use aquarium_server::domain::reward::RewardEngine;
use aquarium_server::domain::weights::RarityWeights;
use aquarium_server::interface_adapters::utils::rng::SeededRandom;
use std::collections::HashMap;
use std::sync::Arc;

const DRAWS: usize = 20_000;

fn tally(engine: &RewardEngine, seed: u64) -> HashMap<Rarity, usize> {
    let random = SeededRandom::new(Some(seed));
    let mut counts = HashMap::new();
    for _ in 0..DRAWS {
        let species = engine.roll(&random).expect("every weighted tier has species");
        *counts.entry(species.rarity).or_insert(0) += 1;
    }
    counts
}

#[test]
fn tier_frequencies_converge_to_configured_weights() {
    let catalog = Arc::new(SpeciesCatalog::builtin().expect("builtin catalog is valid"));
    let weights = RarityWeights::default();
    let engine = RewardEngine::new(catalog, &weights).expect("engine is valid");

    let counts = tally(&engine, 2024);

    let n = DRAWS as f64;
    for tier in Rarity::ALL {
        let p = weights.get(tier);
        let expected = n * p;
        let sigma = (n * p * (1.0 - p)).sqrt();
        let observed = counts.get(&tier).copied().unwrap_or(0) as f64;
        assert!(
            (observed - expected).abs() <= 5.0 * sigma,
            "{tier}: observed {observed}, expected {expected} +/- {}",
            5.0 * sigma
        );
    }
}

#[test]
fn zero_weight_tiers_are_never_drawn() {
    let catalog = Arc::new(SpeciesCatalog::builtin().expect("builtin catalog is valid"));
    let weights = RarityWeights {
        common: 0.7,
        rare: 0.3,
        epic: 0.0,
        legendary: 0.0,
        mythical: 0.0,
    };
    let engine = RewardEngine::new(catalog, &weights).expect("engine is valid");

    let counts = tally(&engine, 99);

    assert_eq!(counts.keys().filter(|t| **t > Rarity::Rare).count(), 0);
    assert_eq!(counts.values().sum::<usize>(), DRAWS);
}
