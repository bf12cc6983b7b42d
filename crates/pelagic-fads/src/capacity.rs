//! Per-device carrying-capacity side table.
//!
//! Each device gets one capacity draw per species, taken lazily on first
//! access and memoized for the device's lifetime -- re-rolling a Weibull
//! capacity mid-life would silently change the attraction dynamics. The
//! cache is keyed by [`FadId`] (a stable arena index, never reused within
//! a run) and must be evicted when the device is removed so the slot
//! cannot leak stale draws.

use std::collections::BTreeMap;

use pelagic_biology::GlobalBiology;
use pelagic_types::{CapacityDistribution, FadId, SpeciesId};
use rand::Rng;

use crate::error::{FadError, check_species_table};

/// Sample one capacity in kilograms from a distribution.
///
/// Weibull sampling uses the inverse CDF, `scale * (-ln(1 - u))^(1/shape)`
/// with `u` uniform in `[0, 1)`; the pack has no separate distributions
/// crate, and two lines do not justify one.
pub fn sample_capacity<R: Rng + ?Sized>(distribution: CapacityDistribution, rng: &mut R) -> f64 {
    match distribution {
        CapacityDistribution::Fixed { kilograms } => kilograms,
        CapacityDistribution::Weibull { shape, scale } => {
            let u: f64 = rng.random();
            scale * (-(1.0 - u).ln()).powf(1.0 / shape)
        }
    }
}

/// Lazily memoized per-device, per-species carrying capacities.
#[derive(Debug, Clone)]
pub struct CapacityCache {
    distributions: Vec<CapacityDistribution>,
    memo: BTreeMap<FadId, Vec<f64>>,
}

impl CapacityCache {
    /// Build the cache from per-species distributions.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for an invalid distribution, or a species
    /// count mismatch against the registry.
    pub fn new(
        global: &GlobalBiology,
        distributions: Vec<CapacityDistribution>,
    ) -> Result<Self, FadError> {
        check_species_table(global, distributions.len())?;
        for distribution in &distributions {
            distribution.validate()?;
        }
        Ok(Self {
            distributions,
            memo: BTreeMap::new(),
        })
    }

    /// The per-species capacities for a device, drawing and memoizing them
    /// on first access. The first access fixes the capacities for the
    /// device's lifetime.
    pub fn capacities<R: Rng + ?Sized>(&mut self, fad: FadId, rng: &mut R) -> &[f64] {
        if !self.memo.contains_key(&fad) {
            let draws: Vec<f64> = self
                .distributions
                .iter()
                .map(|distribution| sample_capacity(*distribution, rng))
                .collect();
            self.memo.insert(fad, draws);
        }
        self.memo.get(&fad).map_or(&[], Vec::as_slice)
    }

    /// Capacity for one species of one device (draws lazily like
    /// [`Self::capacities`]).
    pub fn capacity_of<R: Rng + ?Sized>(
        &mut self,
        fad: FadId,
        species: SpeciesId,
        rng: &mut R,
    ) -> f64 {
        self.capacities(fad, rng)
            .get(species.index())
            .copied()
            .unwrap_or(0.0)
    }

    /// Whether a device's capacities have already been drawn.
    pub fn is_cached(&self, fad: FadId) -> bool {
        self.memo.contains_key(&fad)
    }

    /// Evict a removed device's entry. Must run before the device id could
    /// ever be observed again.
    pub fn evict(&mut self, fad: FadId) {
        self.memo.remove(&fad);
    }

    /// Number of devices currently memoized.
    pub fn cached_devices(&self) -> usize {
        self.memo.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use pelagic_biology::SpeciesDefinition;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn global() -> GlobalBiology {
        GlobalBiology::new(vec![
            SpeciesDefinition {
                name: "Skipjack".to_owned(),
                weight_per_bin: vec![vec![1.0]],
            },
            SpeciesDefinition {
                name: "Bigeye".to_owned(),
                weight_per_bin: vec![vec![2.0]],
            },
        ])
        .unwrap()
    }

    #[test]
    fn fixed_distribution_is_deterministic() {
        let mut rng = SmallRng::seed_from_u64(1);
        let dist = CapacityDistribution::Fixed { kilograms: 75.0 };
        assert_eq!(sample_capacity(dist, &mut rng), 75.0);
    }

    #[test]
    fn weibull_samples_are_positive_and_reproducible() {
        let dist = CapacityDistribution::Weibull {
            shape: 1.5,
            scale: 1000.0,
        };
        let mut a = SmallRng::seed_from_u64(42);
        let mut b = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let sample_a = sample_capacity(dist, &mut a);
            let sample_b = sample_capacity(dist, &mut b);
            assert_eq!(sample_a, sample_b);
            assert!(sample_a >= 0.0);
            assert!(sample_a.is_finite());
        }
    }

    #[test]
    fn weibull_scale_shifts_the_mass() {
        // With shape 1 the Weibull is exponential with mean = scale.
        let dist = CapacityDistribution::Weibull {
            shape: 1.0,
            scale: 500.0,
        };
        let mut rng = SmallRng::seed_from_u64(7);
        let total: f64 = (0..10_000)
            .map(|_| sample_capacity(dist, &mut rng))
            .sum();
        let mean = total / 10_000.0;
        assert!((mean - 500.0).abs() < 25.0, "mean was {mean}");
    }

    #[test]
    fn first_access_fixes_capacity_for_lifetime() {
        let global = global();
        let mut cache = CapacityCache::new(
            &global,
            vec![
                CapacityDistribution::Weibull {
                    shape: 2.0,
                    scale: 100.0,
                },
                CapacityDistribution::Fixed { kilograms: 50.0 },
            ],
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let fad = FadId::new(9);

        let first = cache.capacities(fad, &mut rng).to_vec();
        // Later accesses must not consume randomness or change the draw.
        let second = cache.capacities(fad, &mut rng).to_vec();
        assert_eq!(first, second);
        assert_eq!(cache.capacity_of(fad, SpeciesId::new(1), &mut rng), 50.0);
    }

    #[test]
    fn eviction_clears_the_slot() {
        let global = global();
        let mut cache = CapacityCache::new(
            &global,
            vec![
                CapacityDistribution::Fixed { kilograms: 10.0 },
                CapacityDistribution::Fixed { kilograms: 20.0 },
            ],
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let fad = FadId::new(4);
        let _ = cache.capacities(fad, &mut rng);
        assert!(cache.is_cached(fad));

        cache.evict(fad);
        assert!(!cache.is_cached(fad));
        assert_eq!(cache.cached_devices(), 0);
    }

    #[test]
    fn wrong_table_length_is_fatal() {
        let global = global();
        let result = CapacityCache::new(
            &global,
            vec![CapacityDistribution::Fixed { kilograms: 10.0 }],
        );
        assert!(result.is_err());
    }
}
