//! Interval attraction: catchability and selectivity over the soak window.
//!
//! These are the calibrated "fill up over an interval" models. The plain
//! [`IntervalAttractor`] works cell-locally, like a daily gear set with a
//! tiny catchability. The [`GlobalSelectivityIntervalAttractor`] instead
//! normalizes selectivity over the whole ocean once per day, so every
//! device demands the same size composition regardless of which cell it
//! drifts in.

use pelagic_biology::{AbundanceBiology, AbundanceMatrix, GlobalBiology, LocalBiology, SelectivityCurve};
use pelagic_types::IntervalAttractorParams;
use rand::RngCore;

use crate::attractors::{AttractedBiology, AttractionContext, FishAttractor};
use crate::capacity::CapacityCache;
use crate::error::{FadError, check_species_table};
use crate::fad::Fad;

fn abundance_mismatch(context: &'static str) -> FadError {
    FadError::from(pelagic_biology::BiologyError::IncompatibleBiology { context })
}

/// Daily transfer of `catchability[s] * selectivity * cell_abundance`.
///
/// A species whose holdings already reached its capacity is skipped
/// entirely; otherwise the day's take is clamped so the capacity is hit
/// exactly, never overshot.
#[derive(Debug, Clone)]
pub struct IntervalAttractor {
    catchability: Vec<f64>,
    selectivity: Vec<SelectivityCurve>,
}

impl IntervalAttractor {
    /// Build the attractor from calibrated parameters and one curve per
    /// species.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for invalid values, a species count
    /// mismatch, or a curve whose shape does not match its species.
    pub fn new(
        global: &GlobalBiology,
        params: &IntervalAttractorParams,
        selectivity: Vec<SelectivityCurve>,
    ) -> Result<Self, FadError> {
        params.validate()?;
        check_species_table(global, params.catchability.len())?;
        check_species_table(global, selectivity.len())?;
        for (species, curve) in global.iter().zip(&selectivity) {
            if !curve.matches_shape(species) {
                return Err(FadError::SelectivityShapeMismatch {
                    species: species.id(),
                });
            }
        }
        Ok(Self {
            catchability: params.catchability.clone(),
            selectivity,
        })
    }
}

impl FishAttractor for IntervalAttractor {
    fn attract_impl(
        &mut self,
        fad: &Fad,
        cell: &LocalBiology,
        ctx: &AttractionContext<'_>,
        capacity: &mut CapacityCache,
        rng: &mut dyn RngCore,
    ) -> Result<Option<AttractedBiology>, FadError> {
        let Some(cell_abundance) = cell.as_abundance() else {
            return Err(abundance_mismatch(
                "interval attractor over a biomass cell",
            ));
        };

        let capacities = capacity.capacities(fad.id(), rng).to_vec();
        let mut out = AbundanceBiology::empty(ctx.global);
        let mut total = 0.0;
        for (index, species) in ctx.global.iter().enumerate() {
            let cap = capacities.get(index).copied().unwrap_or(0.0);
            let held = fad.held_kilograms(species.id(), ctx.global);
            let headroom = (cap - held).max(0.0);
            if headroom <= 0.0 {
                continue;
            }
            let q = self.catchability.get(index).copied().unwrap_or(0.0);
            let Some(counts) = cell_abundance.matrix_of(species.id()) else {
                continue;
            };
            let mut matrix = self
                .selectivity
                .get(index)
                .map_or_else(|| counts.clone(), |curve| curve.filter(counts));
            matrix.scale(q);
            let kilograms = matrix.total_weight(species);
            if kilograms <= 0.0 {
                continue;
            }
            if kilograms > headroom {
                matrix.scale(headroom / kilograms);
            }
            out.add(species.id(), &matrix)?;
            total += kilograms.min(headroom);
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

/// Interval attraction with ocean-wide selectivity normalization.
///
/// Once per day the model weighs the whole ocean's abundance through the
/// selectivity curves and converts it into a per-kilogram attraction
/// table: how many fish of each subdivision/bin make up one attracted
/// kilogram. Each device then demands `capacity[s] /
/// days_it_takes_to_fill_up` kilograms per species in that composition.
///
/// The demanded counts double as per-bin thresholds: a cell that cannot
/// supply the full composition -- any bin short of its demanded count --
/// yields *nothing* that day, for every species. Partial days would skew
/// the size structure the calibration depends on, so the whole day is
/// cancelled instead.
#[derive(Debug, Clone)]
pub struct GlobalSelectivityIntervalAttractor {
    selectivity: Vec<SelectivityCurve>,
    days_it_takes_to_fill_up: u64,
    /// Per-kilogram attraction tables for one day, keyed by that day.
    daily: Option<(u64, Vec<AbundanceMatrix>)>,
}

impl GlobalSelectivityIntervalAttractor {
    /// Build the attractor from calibrated parameters and one curve per
    /// species.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for invalid values, a species count
    /// mismatch, or a curve whose shape does not match its species.
    pub fn new(
        global: &GlobalBiology,
        params: &IntervalAttractorParams,
        selectivity: Vec<SelectivityCurve>,
    ) -> Result<Self, FadError> {
        params.validate()?;
        check_species_table(global, selectivity.len())?;
        for (species, curve) in global.iter().zip(&selectivity) {
            if !curve.matches_shape(species) {
                return Err(FadError::SelectivityShapeMismatch {
                    species: species.id(),
                });
            }
        }
        Ok(Self {
            selectivity,
            days_it_takes_to_fill_up: params.days_it_takes_to_fill_up,
            daily: None,
        })
    }

    /// Compute the per-kilogram attraction tables from today's ocean.
    fn compute_daily_tables(
        &self,
        ctx: &AttractionContext<'_>,
    ) -> Result<Vec<AbundanceMatrix>, FadError> {
        let mut tables = Vec::with_capacity(ctx.global.species_count());
        for (index, species) in ctx.global.iter().enumerate() {
            // Ocean-wide standing abundance for this species.
            let mut standing = AbundanceMatrix::zeros_for(species);
            for cell in ctx.ocean.cell_ids() {
                if let Some(biology) = ctx.ocean.biology(cell)
                    && let Some(abundance) = biology.as_abundance()
                    && let Some(matrix) = abundance.matrix_of(species.id())
                {
                    standing.add(matrix)?;
                }
            }
            let curve = self.selectivity.get(index);
            let selected_weight = standing.map_entries(|sub, bin, count| {
                let retention = curve.map_or(1.0, |c| c.at(sub, bin));
                count * retention * species.weight_at(sub, bin)
            });
            let total_selected = selected_weight.total_count();
            if total_selected <= 0.0 {
                tables.push(AbundanceMatrix::zeros_for(species));
                continue;
            }
            // Fish per attracted kilogram, by subdivision and bin.
            let per_kg = selected_weight.map_entries(|sub, bin, weight| {
                let unit = species.weight_at(sub, bin);
                if unit > 0.0 {
                    weight / total_selected / unit
                } else {
                    0.0
                }
            });
            tables.push(per_kg);
        }
        Ok(tables)
    }

    fn daily_tables(
        &mut self,
        ctx: &AttractionContext<'_>,
    ) -> Result<&[AbundanceMatrix], FadError> {
        if self.daily.as_ref().is_none_or(|(day, _)| *day != ctx.day) {
            let tables = self.compute_daily_tables(ctx)?;
            self.daily = Some((ctx.day, tables));
        }
        Ok(self.daily.as_ref().map_or(&[], |(_, tables)| tables))
    }
}

impl FishAttractor for GlobalSelectivityIntervalAttractor {
    fn attract_impl(
        &mut self,
        fad: &Fad,
        cell: &LocalBiology,
        ctx: &AttractionContext<'_>,
        capacity: &mut CapacityCache,
        rng: &mut dyn RngCore,
    ) -> Result<Option<AttractedBiology>, FadError> {
        let Some(cell_abundance) = cell.as_abundance() else {
            return Err(abundance_mismatch(
                "global-selectivity attractor over a biomass cell",
            ));
        };

        let capacities = capacity.capacities(fad.id(), rng).to_vec();
        let fill_days = self.days_it_takes_to_fill_up;
        let tables = self.daily_tables(ctx)?.to_vec();

        // Demanded counts per species, in today's ocean-wide composition.
        let mut demands = Vec::with_capacity(tables.len());
        for (index, species) in ctx.global.iter().enumerate() {
            let cap = capacities.get(index).copied().unwrap_or(0.0);
            let held = fad.held_kilograms(species.id(), ctx.global);
            #[allow(clippy::cast_precision_loss)]
            let target = (cap / fill_days as f64).min((cap - held).max(0.0));
            let mut demand = tables
                .get(index)
                .cloned()
                .unwrap_or_else(|| AbundanceMatrix::zeros_for(species));
            demand.scale(target);
            demands.push(demand);
        }

        // Threshold gate: every demanded bin must be fully available in
        // the cell, or the whole day is cancelled for every species.
        for (index, species) in ctx.global.iter().enumerate() {
            let Some(demand) = demands.get(index) else {
                continue;
            };
            let available = cell_abundance.matrix_of(species.id());
            for sub in 0..demand.subdivisions() {
                for bin in 0..demand.bins() {
                    let wanted = demand.count_at(sub, bin);
                    if wanted <= 0.0 {
                        continue;
                    }
                    let have = available.map_or(0.0, |m| m.count_at(sub, bin));
                    // Small slack for float rounding in the composition.
                    if wanted > have + 1e-9 {
                        return Ok(None);
                    }
                }
            }
        }

        let mut out = AbundanceBiology::empty(ctx.global);
        let mut total = 0.0;
        for (index, species) in ctx.global.iter().enumerate() {
            if let Some(demand) = demands.get(index) {
                let kilograms = demand.total_weight(species);
                if kilograms > 0.0 {
                    out.add(species.id(), demand)?;
                    total += kilograms;
                }
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
