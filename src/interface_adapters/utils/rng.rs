use crate::domain::ports::RandomSource;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Process-unique, increasing identifier for correlating connection logs.
pub fn rand_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        AtomicU64::new(nanos)
    });
    counter.fetch_add(1, Ordering::Relaxed)
}

/// Shared PCG generator behind the `RandomSource` port.
///
/// A fixed seed makes a whole run's draws reproducible; otherwise the generator is
/// seeded from the thread RNG. Not suitable where draws must be unpredictable to
/// an attacker.
#[derive(Clone)]
pub struct SeededRandom {
    inner: Arc<Mutex<Pcg32>>,
}

impl SeededRandom {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        };
        Self {
            inner: Arc::new(Mutex::new(rng)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        // The generator state stays valid even if a holder panicked.
        let mut rng = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random::<f64>()
    }
}
