use rand::Rng;
use serde::{Deserialize, Serialize};

/// A closed millisecond range `[min_ms, max_ms]` sampled once per pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayPolicy {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayPolicy {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        debug_assert!(min_ms <= max_ms, "delay range is inverted");
        Self { min_ms, max_ms }
    }

    /// A degenerate range that always yields `ms`.
    pub fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    /// Draws a uniform sample from the range using the thread-local RNG.
    pub fn sample(&self) -> u64 {
        self.sample_with(&mut rand::rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.min_ms >= self.max_ms {
            self.min_ms
        } else {
            rng.random_range(self.min_ms..=self.max_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn samples_stay_inside_closed_range() {
        let ranges = [(0, 0), (0, 1), (2000, 20000), (5, 6), (999, 1000)];
        for (min, max) in ranges {
            let policy = DelayPolicy::new(min, max);
            for _ in 0..500 {
                let ms = policy.sample();
                assert!(ms >= min && ms <= max, "{ms} outside [{min}, {max}]");
            }
        }
    }

    #[test]
    fn fixed_policy_is_constant() {
        let cooldown = DelayPolicy::fixed(5000);
        for _ in 0..100 {
            assert_eq!(cooldown.sample(), 5000);
        }
    }

    #[test]
    fn both_endpoints_are_reachable() {
        let policy = DelayPolicy::new(1, 2);
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<u64> = (0..200).map(|_| policy.sample_with(&mut rng)).collect();
        assert!(samples.contains(&1));
        assert!(samples.contains(&2));
    }
}
