//! Last-moment devices: virtual holdings computed at fishing time.
//!
//! With tens of thousands of deployed devices, mutating every device's
//! held biology every day is the dominant cost of the step loop. A
//! last-moment device stores nothing but its deployment day and
//! calibrated parameters; what it "holds" is derived on demand from the
//! current cell contents through an effective catchability that ramps up
//! with soak time. Only when the device is actually fished does any real
//! quantity move, and since the fish were never taken out of the water,
//! fishing must remove them from the real cell(s) at that moment.
//!
//! Removal is returned as a [`FishingPlan`] rather than applied in
//! place: the caller owns the ocean mutably and applies the per-cell
//! removals itself, which keeps this module free of any mutable ocean
//! handle.

use pelagic_biology::{Catch, GlobalBiology, LocalBiology, SelectivityCurve};
use pelagic_types::{CellId, FadId, IntervalAttractorParams, VesselId};

use crate::error::{FadError, check_species_table};
use crate::view::OceanView;

/// The outcome of fishing a last-moment device.
///
/// `removals` lists what must be subtracted from which real cell; the
/// caller applies them (clamped) and then reports `catch`.
#[derive(Debug, Clone)]
pub struct FishingPlan {
    /// What the set lands.
    pub catch: Catch,
    /// Per-cell quantities to remove from the ocean.
    pub removals: Vec<(CellId, LocalBiology)>,
}

/// A device whose holdings are computed, not stored.
#[derive(Debug, Clone)]
pub struct LastMomentFad {
    id: FadId,
    owner: VesselId,
    cell: CellId,
    deployed_day: u64,
    catchability: Vec<f64>,
    selectivity: Vec<SelectivityCurve>,
    days_in_water_before_attraction: u64,
    days_it_takes_to_fill_up: u64,
    lost: bool,
}

impl LastMomentFad {
    /// Build a last-moment device from calibrated interval parameters and
    /// one selectivity curve per species.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for invalid values, a species count
    /// mismatch, or a curve whose shape does not match its species.
    pub fn new(
        id: FadId,
        owner: VesselId,
        cell: CellId,
        deployed_day: u64,
        global: &GlobalBiology,
        params: &IntervalAttractorParams,
        selectivity: Vec<SelectivityCurve>,
        days_in_water_before_attraction: u64,
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
            id,
            owner,
            cell,
            deployed_day,
            catchability: params.catchability.clone(),
            selectivity,
            days_in_water_before_attraction,
            days_it_takes_to_fill_up: params.days_it_takes_to_fill_up,
            lost: false,
        })
    }

    /// Stable identity of this device.
    pub const fn id(&self) -> FadId {
        self.id
    }

    /// The vessel that owns this device.
    pub const fn owner(&self) -> VesselId {
        self.owner
    }

    /// The cell this device drifts in.
    pub const fn cell(&self) -> CellId {
        self.cell
    }

    /// Whether the device has been lost (terminal).
    pub const fn is_lost(&self) -> bool {
        self.lost
    }

    /// Mark this device lost. Terminal and irreversible.
    pub const fn mark_lost(&mut self) {
        self.lost = true;
    }

    /// Days this device has soaked by `day`.
    pub const fn soak_days(&self, day: u64) -> u64 {
        day.saturating_sub(self.deployed_day)
    }

    /// The soak-time ramp in `[0, 1]`: zero until the attraction window
    /// opens, then climbing linearly to one over the fill-up duration.
    pub fn soak_ramp(&self, day: u64) -> f64 {
        let soak = self.soak_days(day);
        if soak < self.days_in_water_before_attraction {
            return 0.0;
        }
        let ramp_days = soak.saturating_sub(self.days_in_water_before_attraction);
        #[allow(clippy::cast_precision_loss)]
        let ramp = ramp_days as f64 / self.days_it_takes_to_fill_up as f64;
        ramp.min(1.0)
    }

    /// Effective catchability for one species index at `day`:
    /// `catchability[s] * soak_ramp(day)`.
    pub fn effective_catchability(&self, day: u64, species_index: usize) -> f64 {
        self.catchability.get(species_index).copied().unwrap_or(0.0) * self.soak_ramp(day)
    }

    /// What this device would hold at `day`, derived from a cell's
    /// current contents. Nothing is mutated.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::FadLost`] for a lost device, or a biology
    /// error from the assembly.
    pub fn virtual_biology(
        &self,
        day: u64,
        cell: &LocalBiology,
        global: &GlobalBiology,
    ) -> Result<LocalBiology, FadError> {
        self.ensure_not_lost()?;
        let mut virtual_holdings = cell.empty_like(global);
        match (cell, &mut virtual_holdings) {
            (LocalBiology::Biomass(source), LocalBiology::Biomass(held)) => {
                for (index, id) in global.ids().enumerate() {
                    held.add(
                        id,
                        self.effective_catchability(day, index) * source.kilograms_of(id),
                    );
                }
            }
            (LocalBiology::Abundance(source), LocalBiology::Abundance(held)) => {
                for (index, id) in global.ids().enumerate() {
                    let Some(counts) = source.matrix_of(id) else {
                        continue;
                    };
                    let mut matrix = self
                        .selectivity
                        .get(index)
                        .map_or_else(|| counts.clone(), |curve| curve.filter(counts));
                    matrix.scale(self.effective_catchability(day, index));
                    held.add(id, &matrix)?;
                }
            }
            // empty_like preserves the representation.
            _ => {
                return Err(FadError::from(
                    pelagic_biology::BiologyError::IncompatibleBiology {
                        context: "virtual biology representation drift",
                    },
                ));
            }
        }
        Ok(virtual_holdings)
    }

    /// Fishing reaction: materialize the virtual holdings as a catch and
    /// plan their removal from the real cell.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::FadLost`] for a lost device.
    pub fn react_to_being_fished(
        &self,
        day: u64,
        cell: &LocalBiology,
        global: &GlobalBiology,
    ) -> Result<FishingPlan, FadError> {
        let holdings = self.virtual_biology(day, cell, global)?;
        Ok(FishingPlan {
            catch: Catch::from_biology(&holdings, global),
            removals: vec![(self.cell, holdings)],
        })
    }

    const fn ensure_not_lost(&self) -> Result<(), FadError> {
        if self.lost {
            return Err(FadError::FadLost(self.id));
        }
        Ok(())
    }
}

/// A last-moment device that attracts from a neighborhood of cells.
///
/// The per-cell contributions are computed fresh for every query, so the
/// fishing plan always matches what the neighbors hold at that moment.
#[derive(Debug, Clone)]
pub struct RangedLastMomentFad {
    inner: LastMomentFad,
    range: u32,
}

impl RangedLastMomentFad {
    /// Wrap a last-moment device with an attraction range in cells.
    pub const fn new(inner: LastMomentFad, range: u32) -> Self {
        Self { inner, range }
    }

    /// The wrapped device.
    pub const fn inner(&self) -> &LastMomentFad {
        &self.inner
    }

    /// Mark this device lost. Terminal and irreversible.
    pub const fn mark_lost(&mut self) {
        self.inner.mark_lost();
    }

    /// Per-neighbor virtual contributions at `day`, in the ocean's
    /// stable neighborhood order.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::FadLost`] for a lost device, or a biology
    /// error from the assembly.
    pub fn contributions(
        &self,
        day: u64,
        ocean: &dyn OceanView,
        global: &GlobalBiology,
    ) -> Result<Vec<(CellId, LocalBiology)>, FadError> {
        self.inner.ensure_not_lost()?;
        let mut contributions = Vec::new();
        for neighbor in ocean.neighborhood(self.inner.cell, self.range) {
            let Some(cell) = ocean.biology(neighbor) else {
                continue;
            };
            let holdings = self.inner.virtual_biology(day, cell, global)?;
            if holdings.total_kilograms(global) > 0.0 {
                contributions.push((neighbor, holdings));
            }
        }
        Ok(contributions)
    }

    /// Fishing reaction over the whole neighborhood: one catch, one
    /// removal per contributing neighbor.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::FadLost`] for a lost device, or a biology
    /// error from merging contributions.
    pub fn react_to_being_fished(
        &self,
        day: u64,
        ocean: &dyn OceanView,
        global: &GlobalBiology,
    ) -> Result<FishingPlan, FadError> {
        let removals = self.contributions(day, ocean, global)?;
        let mut combined: Option<LocalBiology> = None;
        for (_, holdings) in &removals {
            match combined.as_mut() {
                Some(total) => total.merge(holdings, global)?,
                None => combined = Some(holdings.clone()),
            }
        }
        let catch = combined.map_or_else(
            || Catch::empty(global),
            |total| Catch::from_biology(&total, global),
        );
        Ok(FishingPlan { catch, removals })
    }
}
