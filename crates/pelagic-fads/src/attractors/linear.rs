//! Linear attraction: a fixed daily fraction of the cell's standing stock.

use pelagic_biology::{
    AbundanceBiology, BiomassBiology, GlobalBiology, LocalBiology, SelectivityCurve,
};
use pelagic_types::LinearAttractorParams;
use rand::RngCore;

use crate::attractors::{
    AttractedBiology, AttractionContext, FishAttractor, per_species_kilograms,
    uniform_capacity_scale,
};
use crate::capacity::CapacityCache;
use crate::error::{FadError, check_species_table};
use crate::fad::Fad;

/// Daily transfer of `rate[s] * cell_biomass[s]` kilograms per species.
///
/// When the day's attraction would overflow the device's remaining
/// capacity, everything is scaled down by one uniform factor so the
/// species mix of the cell is preserved, then clamped per species so no
/// single capacity is exceeded.
#[derive(Debug, Clone)]
pub struct LinearBiomassAttractor {
    rates: Vec<f64>,
}

impl LinearBiomassAttractor {
    /// Build the attractor, validating the per-species rate table.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for invalid rates or a species count
    /// mismatch against the registry.
    pub fn new(global: &GlobalBiology, params: &LinearAttractorParams) -> Result<Self, FadError> {
        params.validate()?;
        check_species_table(global, params.attraction_rates.len())?;
        Ok(Self {
            rates: params.attraction_rates.clone(),
        })
    }
}

impl FishAttractor for LinearBiomassAttractor {
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
                    context: "linear biomass attractor over an abundance cell",
                },
            ));
        };

        let capacities = capacity.capacities(fad.id(), rng).to_vec();
        let held = per_species_kilograms(fad.biology(), ctx.global);
        let held_total: f64 = held.iter().sum();
        let capacity_total: f64 = capacities.iter().sum();

        let mut wanted = Vec::with_capacity(self.rates.len());
        for (index, id) in ctx.global.ids().enumerate() {
            let rate = self.rates.get(index).copied().unwrap_or(0.0);
            wanted.push(rate * cell_biomass.kilograms_of(id));
        }
        let wanted_total: f64 = wanted.iter().sum();
        if wanted_total <= 0.0 {
            return Ok(None);
        }

        let scale = uniform_capacity_scale(wanted_total, held_total, capacity_total);
        let mut out = BiomassBiology::empty(ctx.global);
        let mut total = 0.0;
        for (index, id) in ctx.global.ids().enumerate() {
            let headroom = (capacities.get(index).copied().unwrap_or(0.0)
                - held.get(index).copied().unwrap_or(0.0))
            .max(0.0);
            let kilograms = (wanted.get(index).copied().unwrap_or(0.0) * scale).min(headroom);
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

/// Linear attraction over structured abundance, filtered per bin.
///
/// Each species' cell matrix is scaled by its daily rate and filtered
/// through its selectivity curve, so the attracted fish carry the size
/// structure the gear would see. Capacity is enforced in kilograms with
/// the same uniform-then-per-species clamping as the biomass model.
#[derive(Debug, Clone)]
pub struct LinearAbundanceAttractor {
    rates: Vec<f64>,
    selectivity: Vec<SelectivityCurve>,
}

impl LinearAbundanceAttractor {
    /// Build the attractor from rates and one curve per species.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for invalid rates, a species count
    /// mismatch, or a curve whose shape does not match its species.
    pub fn new(
        global: &GlobalBiology,
        params: &LinearAttractorParams,
        selectivity: Vec<SelectivityCurve>,
    ) -> Result<Self, FadError> {
        params.validate()?;
        check_species_table(global, params.attraction_rates.len())?;
        check_species_table(global, selectivity.len())?;
        for (species, curve) in global.iter().zip(&selectivity) {
            if !curve.matches_shape(species) {
                return Err(FadError::SelectivityShapeMismatch {
                    species: species.id(),
                });
            }
        }
        Ok(Self {
            rates: params.attraction_rates.clone(),
            selectivity,
        })
    }
}

impl FishAttractor for LinearAbundanceAttractor {
    fn attract_impl(
        &mut self,
        fad: &Fad,
        cell: &LocalBiology,
        ctx: &AttractionContext<'_>,
        capacity: &mut CapacityCache,
        rng: &mut dyn RngCore,
    ) -> Result<Option<AttractedBiology>, FadError> {
        let Some(cell_abundance) = cell.as_abundance() else {
            return Err(FadError::from(
                pelagic_biology::BiologyError::IncompatibleBiology {
                    context: "linear abundance attractor over a biomass cell",
                },
            ));
        };

        let capacities = capacity.capacities(fad.id(), rng).to_vec();
        let held = per_species_kilograms(fad.biology(), ctx.global);
        let held_total: f64 = held.iter().sum();
        let capacity_total: f64 = capacities.iter().sum();

        // Rate-scaled, selectivity-filtered matrices and their weights.
        let mut selected = Vec::with_capacity(self.rates.len());
        let mut weights = Vec::with_capacity(self.rates.len());
        for (index, species) in ctx.global.iter().enumerate() {
            let rate = self.rates.get(index).copied().unwrap_or(0.0);
            let Some(counts) = cell_abundance.matrix_of(species.id()) else {
                continue;
            };
            let mut matrix = self
                .selectivity
                .get(index)
                .map_or_else(|| counts.clone(), |curve| curve.filter(counts));
            matrix.scale(rate);
            weights.push(matrix.total_weight(species));
            selected.push((species.id(), matrix));
        }
        let wanted_total: f64 = weights.iter().sum();
        if wanted_total <= 0.0 {
            return Ok(None);
        }

        let scale = uniform_capacity_scale(wanted_total, held_total, capacity_total);
        let mut out = AbundanceBiology::empty(ctx.global);
        let mut total = 0.0;
        for (index, (id, matrix)) in selected.iter_mut().enumerate() {
            let kilograms = weights.get(index).copied().unwrap_or(0.0) * scale;
            if kilograms <= 0.0 {
                continue;
            }
            let headroom = (capacities.get(id.index()).copied().unwrap_or(0.0)
                - held.get(id.index()).copied().unwrap_or(0.0))
            .max(0.0);
            // Uniform scale first, then shrink further if this one species
            // would still overflow its own capacity.
            let factor = scale * (headroom / kilograms).min(1.0);
            matrix.scale(factor);
            let landed = kilograms.min(headroom);
            if landed > 0.0 {
                out.add(*id, matrix)?;
                total += landed;
            }
        }
        if total <= 0.0 {
            return Ok(None);
        }
        Ok(Some(AttractedBiology {
            biology: LocalBiology::Abundance(out),
            total_kilograms: total,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pelagic_biology::{AbundanceMatrix, SpeciesDefinition};
    use pelagic_types::{
        CapacityDistribution, CellId, FadId, FadInitializerParams, VesselId,
    };
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::view::OceanView;

    struct NoOcean;

    impl OceanView for NoOcean {
        fn cell_ids(&self) -> Vec<CellId> {
            Vec::new()
        }

        fn biology(&self, _cell: CellId) -> Option<&LocalBiology> {
            None
        }

        fn neighborhood(&self, _cell: CellId, _range: u32) -> Vec<CellId> {
            Vec::new()
        }
    }

    fn global() -> GlobalBiology {
        GlobalBiology::new(vec![SpeciesDefinition {
            name: "Skipjack".to_owned(),
            weight_per_bin: vec![vec![1.0, 2.0]],
        }])
        .unwrap()
    }

    fn initializer() -> FadInitializerParams {
        FadInitializerParams {
            fish_release_probability: vec![0.0],
            dud_probability: 0.0,
            days_before_turning_off: None,
            days_in_water_before_attraction: 0,
            maximum_attraction_days: None,
        }
    }

    fn biomass_fad(global: &GlobalBiology) -> Fad {
        Fad::new(
            FadId::new(1),
            VesselId::new(0),
            CellId::new(0),
            0,
            LocalBiology::empty_biomass(global),
            &initializer(),
            false,
        )
    }

    fn cache(global: &GlobalBiology, kilograms: f64) -> CapacityCache {
        CapacityCache::new(global, vec![CapacityDistribution::Fixed { kilograms }]).unwrap()
    }

    #[test]
    fn attracts_a_fixed_fraction_of_the_cell() {
        let global = global();
        let fad = biomass_fad(&global);
        let mut capacity = cache(&global, 1_000.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let ocean = NoOcean;
        let ctx = AttractionContext {
            day: 1,
            global: &global,
            ocean: &ocean,
        };

        let mut cell = LocalBiology::empty_biomass(&global);
        if let Some(biomass) = cell.as_biomass_mut() {
            biomass.add(pelagic_types::SpeciesId::new(0), 1_000.0);
        }
        let mut attractor = LinearBiomassAttractor::new(
            &global,
            &LinearAttractorParams {
                attraction_rates: vec![0.01],
            },
        )
        .unwrap();

        let attracted = attractor
            .attract(&fad, &cell, &ctx, &mut capacity, &mut rng)
            .unwrap()
            .unwrap();
        assert!((attracted.total_kilograms - 10.0).abs() < 1e-9);
    }

    #[test]
    fn capacity_clamps_the_daily_take() {
        let global = global();
        let mut fad = biomass_fad(&global);
        let mut capacity = cache(&global, 5.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let ocean = NoOcean;
        let ctx = AttractionContext {
            day: 1,
            global: &global,
            ocean: &ocean,
        };
        let skipjack = pelagic_types::SpeciesId::new(0);

        let mut cell = LocalBiology::empty_biomass(&global);
        if let Some(biomass) = cell.as_biomass_mut() {
            biomass.add(skipjack, 1_000.0);
        }
        let mut attractor = LinearBiomassAttractor::new(
            &global,
            &LinearAttractorParams {
                attraction_rates: vec![0.01],
            },
        )
        .unwrap();

        // Would want 10 kg, only 5 kg fits.
        let attracted = attractor
            .attract(&fad, &cell, &ctx, &mut capacity, &mut rng)
            .unwrap()
            .unwrap();
        assert!((attracted.total_kilograms - 5.0).abs() < 1e-9);

        // A full device attracts nothing further.
        let mut cell_after = cell.clone();
        fad.aggregate_fish(&attracted.biology, &mut cell_after, &global)
            .unwrap();
        let again = attractor
            .attract(&fad, &cell_after, &ctx, &mut capacity, &mut rng)
            .unwrap();
        assert!(again.is_none());
    }

    #[test]
    fn short_rate_table_names_the_missing_species() {
        let global = GlobalBiology::new(vec![
            SpeciesDefinition {
                name: "Skipjack".to_owned(),
                weight_per_bin: vec![vec![1.0, 2.0]],
            },
            SpeciesDefinition {
                name: "Yellowfin".to_owned(),
                weight_per_bin: vec![vec![3.0, 5.0]],
            },
        ])
        .unwrap();

        let result = LinearBiomassAttractor::new(
            &global,
            &LinearAttractorParams {
                attraction_rates: vec![0.01],
            },
        );
        assert!(matches!(
            result,
            Err(FadError::MissingSpeciesParameters(id))
                if id == pelagic_types::SpeciesId::new(1)
        ));
    }

    #[test]
    fn empty_cell_attracts_nothing() {
        let global = global();
        let fad = biomass_fad(&global);
        let mut capacity = cache(&global, 100.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let ocean = NoOcean;
        let ctx = AttractionContext {
            day: 1,
            global: &global,
            ocean: &ocean,
        };

        let cell = LocalBiology::empty_biomass(&global);
        let mut attractor = LinearBiomassAttractor::new(
            &global,
            &LinearAttractorParams {
                attraction_rates: vec![0.5],
            },
        )
        .unwrap();
        let attracted = attractor
            .attract(&fad, &cell, &ctx, &mut capacity, &mut rng)
            .unwrap();
        assert!(attracted.is_none());
    }

    #[test]
    fn wrong_representation_is_an_error() {
        let global = global();
        let fad = biomass_fad(&global);
        let mut capacity = cache(&global, 100.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let ocean = NoOcean;
        let ctx = AttractionContext {
            day: 1,
            global: &global,
            ocean: &ocean,
        };

        let cell = LocalBiology::empty_abundance(&global);
        let mut attractor = LinearBiomassAttractor::new(
            &global,
            &LinearAttractorParams {
                attraction_rates: vec![0.5],
            },
        )
        .unwrap();
        assert!(
            attractor
                .attract(&fad, &cell, &ctx, &mut capacity, &mut rng)
                .is_err()
        );
    }

    #[test]
    fn abundance_attraction_respects_selectivity() {
        let global = global();
        let fad = Fad::new(
            FadId::new(2),
            VesselId::new(0),
            CellId::new(0),
            0,
            LocalBiology::empty_abundance(&global),
            &initializer(),
            false,
        );
        let mut capacity = cache(&global, 1_000.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let ocean = NoOcean;
        let ctx = AttractionContext {
            day: 1,
            global: &global,
            ocean: &ocean,
        };
        let skipjack = pelagic_types::SpeciesId::new(0);

        let mut cell = LocalBiology::empty_abundance(&global);
        if let Some(abundance) = cell.as_abundance_mut() {
            let counts = AbundanceMatrix::from_counts(vec![vec![100.0, 100.0]]).unwrap();
            abundance.add(skipjack, &counts).unwrap();
        }

        // Only the second bin is selected.
        let curve = SelectivityCurve::from_table(vec![vec![0.0, 1.0]]).unwrap();
        let mut attractor = LinearAbundanceAttractor::new(
            &global,
            &LinearAttractorParams {
                attraction_rates: vec![0.1],
            },
            vec![curve],
        )
        .unwrap();

        let attracted = attractor
            .attract(&fad, &cell, &ctx, &mut capacity, &mut rng)
            .unwrap()
            .unwrap();
        let matrix = attracted
            .biology
            .as_abundance()
            .and_then(|a| a.matrix_of(skipjack))
            .unwrap();
        assert!(matrix.count_at(0, 0).abs() < 1e-12);
        assert!((matrix.count_at(0, 1) - 10.0).abs() < 1e-9);
        // 10 fish at 2 kg each.
        assert!((attracted.total_kilograms - 20.0).abs() < 1e-9);
    }
}
