//! Compressed-exponential attraction: a stochastic gate per species.
//!
//! Aggregation around a drifting object is not a smooth trickle; some
//! days a school joins, most days nothing happens. This model draws one
//! Bernoulli trial per species per day, with a success probability that
//! grows with both the standing stock and the fish already holding to
//! the device.

use pelagic_biology::{BiomassBiology, GlobalBiology, LocalBiology};
use pelagic_types::{CompressedExponentialCoefficients, CompressedExponentialParams};
use rand::{Rng, RngCore};

use crate::attractors::{AttractedBiology, AttractionContext, FishAttractor};
use crate::capacity::CapacityCache;
use crate::error::{FadError, check_species_table};
use crate::fad::Fad;

/// Bernoulli-gated biomass attraction.
///
/// For each species with standing stock `B` and current device holdings
/// `F` (total across species), the daily success probability is
/// `1 - exp(-(b0*B + b1*B*F)^power)` with per-species coefficients. A
/// winning draw transfers `rate[s] * B` kilograms, clamped to that
/// species' remaining capacity; a losing draw transfers nothing for
/// that species that day.
#[derive(Debug, Clone)]
pub struct CompressedExponentialAttractor {
    coefficients: Vec<CompressedExponentialCoefficients>,
    rates: Vec<f64>,
}

impl CompressedExponentialAttractor {
    /// Build the attractor, validating coefficients and rates.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for invalid values or a species count
    /// mismatch against the registry.
    pub fn new(
        global: &GlobalBiology,
        params: &CompressedExponentialParams,
    ) -> Result<Self, FadError> {
        params.validate()?;
        check_species_table(global, params.coefficients.len())?;
        check_species_table(global, params.attraction_rates.len())?;
        Ok(Self {
            coefficients: params.coefficients.clone(),
            rates: params.attraction_rates.clone(),
        })
    }

    /// Today's success probability for one species, from standing stock
    /// `standing` and device holdings `held`.
    fn probability(&self, species_index: usize, standing: f64, held: f64) -> f64 {
        let Some(c) = self.coefficients.get(species_index) else {
            return 0.0;
        };
        let pressure = c.b0 * standing + c.b1 * standing * held;
        if pressure <= 0.0 {
            return 0.0;
        }
        (1.0 - (-pressure.powf(c.power)).exp()).clamp(0.0, 1.0)
    }
}

impl FishAttractor for CompressedExponentialAttractor {
    fn attract_impl(
        &mut self,
        fad: &Fad,
        cell: &LocalBiology,
        ctx: &AttractionContext<'_>,
        capacity: &mut CapacityCache,
        rng: &mut dyn RngCore,
    ) -> Result<Option<AttractedBiology>, FadError> {
        let Some(cell_biomass) = cell.as_biomass() else {
            return Err(FadError::from(
                pelagic_biology::BiologyError::IncompatibleBiology {
                    context: "compressed exponential attractor over an abundance cell",
                },
            ));
        };

        // Holdings are sampled once, before today's transfers, so the
        // species draw order cannot change each other's probabilities.
        let held_total = fad.total_held_kilograms(ctx.global);
        let capacities = capacity.capacities(fad.id(), rng).to_vec();

        let mut out = BiomassBiology::empty(ctx.global);
        let mut total = 0.0;
        for (index, id) in ctx.global.ids().enumerate() {
            let standing = cell_biomass.kilograms_of(id);
            if standing <= 0.0 {
                continue;
            }
            let probability = self.probability(index, standing, held_total);
            if rng.random::<f64>() >= probability {
                continue;
            }
            let rate = self.rates.get(index).copied().unwrap_or(0.0);
            let headroom = (capacities.get(index).copied().unwrap_or(0.0)
                - fad.held_kilograms(id, ctx.global))
            .max(0.0);
            let kilograms = (rate * standing).min(headroom);
            if kilograms > 0.0 {
                out.add(id, kilograms);
                total += kilograms;
            }
        }
        if total <= 0.0 {
            return Ok(None);
        }
        Ok(Some(AttractedBiology {
            biology: LocalBiology::Biomass(out),
            total_kilograms: total,
        }))
    }
}
