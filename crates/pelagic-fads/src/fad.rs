//! The deployed device entity and its lifecycle state machine.
//!
//! A [`Fad`] moves through **Deployed/Active** (unless spawned as a dud,
//! which never attracts) -> **Deactivated** (irreversible, once past the
//! optional turn-off threshold) -> **Lost** (terminal, reachable from any
//! state). Every operation on a lost device is a caller bug and returns
//! [`FadError::FadLost`].
//!
//! The device holds a [`LocalBiology`] in the same representation as the
//! cells it sits on; the attraction engine moves quantity from the cell
//! into the device, and fishing converts the held quantity into a
//! [`Catch`].

use pelagic_biology::{Catch, GlobalBiology, LocalBiology};
use pelagic_types::{CellId, FadId, FadInitializerParams, SpeciesId, VesselId};
use rand::Rng;

use crate::error::FadError;

/// Which kind of device a manager deploys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadKind {
    /// Devices hold per-species biomass scalars.
    Biomass,
    /// Devices hold size-structured abundance.
    Abundance,
    /// Devices store nothing; holdings are derived at fishing time
    /// (see [`crate::last_moment::LastMomentFad`]).
    LastMoment,
}

/// Outcome of a winning release draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseOutcome {
    /// Kilograms that left the device.
    pub kilograms: f64,
    /// True when the fish were discarded (cell incompatible or absent)
    /// rather than returned to the water column.
    pub discarded: bool,
}

/// A deployed fish aggregation device.
#[derive(Debug, Clone)]
pub struct Fad {
    id: FadId,
    owner: VesselId,
    cell: CellId,
    deployed_day: u64,
    biology: LocalBiology,
    fish_release_probability: Vec<f64>,
    active: bool,
    lost: bool,
    dud: bool,
    days_before_turning_off: Option<u64>,
    days_in_water_before_attraction: u64,
    maximum_attraction_days: Option<u64>,
}

impl Fad {
    /// Create a freshly deployed device.
    ///
    /// `dud` is sampled by the manager at deployment time; a dud never
    /// attracts but still soaks, drifts, and can be lost.
    pub fn new(
        id: FadId,
        owner: VesselId,
        cell: CellId,
        deployed_day: u64,
        biology: LocalBiology,
        params: &FadInitializerParams,
        dud: bool,
    ) -> Self {
        Self {
            id,
            owner,
            cell,
            deployed_day,
            biology,
            fish_release_probability: params.fish_release_probability.clone(),
            active: true,
            lost: false,
            dud,
            days_before_turning_off: params.days_before_turning_off,
            days_in_water_before_attraction: params.days_in_water_before_attraction,
            maximum_attraction_days: params.maximum_attraction_days,
        }
    }

    /// This device's identifier.
    pub const fn id(&self) -> FadId {
        self.id
    }

    /// The vessel whose manager deployed this device.
    pub const fn owner(&self) -> VesselId {
        self.owner
    }

    /// The cell this device currently occupies.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::FadLost`] -- a lost device has no location.
    pub const fn location(&self) -> Result<CellId, FadError> {
        if self.lost {
            return Err(FadError::FadLost(self.id));
        }
        Ok(self.cell)
    }

    /// The day this device went into the water.
    pub const fn deployed_day(&self) -> u64 {
        self.deployed_day
    }

    /// Days this device has soaked as of `day`.
    pub const fn soak_days(&self, day: u64) -> u64 {
        day.saturating_sub(self.deployed_day)
    }

    /// Whether this device was spawned as a dud.
    pub const fn is_dud(&self) -> bool {
        self.dud
    }

    /// Whether this device has been marked lost.
    pub const fn is_lost(&self) -> bool {
        self.lost
    }

    /// Whether this device is still in its active (attracting) state.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The biology currently held by this device.
    pub const fn biology(&self) -> &LocalBiology {
        &self.biology
    }

    /// Kilograms held for one species.
    pub fn held_kilograms(&self, species: SpeciesId, global: &GlobalBiology) -> f64 {
        self.biology.kilograms_of(species, global)
    }

    /// Total kilograms held across species.
    pub fn total_held_kilograms(&self, global: &GlobalBiology) -> f64 {
        self.biology.total_kilograms(global)
    }

    /// Whether this device can attract fish on the given day.
    ///
    /// True iff the device is active, not lost, not a dud, has soaked at
    /// least `days_in_water_before_attraction` days, and -- when a maximum
    /// attraction window is configured -- that window has not yet closed.
    pub const fn can_attract_fish(&self, day: u64) -> bool {
        if self.lost || !self.active || self.dud {
            return false;
        }
        let soak = self.soak_days(day);
        if soak < self.days_in_water_before_attraction {
            return false;
        }
        match self.maximum_attraction_days {
            Some(window) => {
                soak <= self.days_in_water_before_attraction.saturating_add(window)
            }
            None => true,
        }
    }

    /// Daily step reaction: transitions Active -> Deactivated once the
    /// turn-off threshold is passed. Returns true when the transition
    /// happened on this call (so the manager can emit the event exactly
    /// once).
    ///
    /// # Errors
    ///
    /// Returns [`FadError::FadLost`] if the device is lost.
    pub fn react_to_step(&mut self, day: u64) -> Result<bool, FadError> {
        self.ensure_not_lost()?;
        if !self.active {
            return Ok(false);
        }
        if let Some(threshold) = self.days_before_turning_off
            && self.soak_days(day) > threshold
        {
            self.active = false;
            return Ok(true);
        }
        Ok(false)
    }

    /// Merge newly attracted quantity into the held biology, removing the
    /// same quantity from the source cell.
    ///
    /// For abundance devices the removal is a selectivity-filtered catch
    /// extraction from the cell, so a [`Catch`] record is produced;
    /// biomass devices move unstructured weight and produce none.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::FadLost`] for a lost device, or a biology error
    /// if the attracted quantity does not match the representations in
    /// play.
    pub fn aggregate_fish(
        &mut self,
        attracted: &LocalBiology,
        cell: &mut LocalBiology,
        global: &GlobalBiology,
    ) -> Result<Option<Catch>, FadError> {
        self.ensure_not_lost()?;
        self.biology.merge(attracted, global)?;
        cell.remove_clamped(attracted, global)?;
        if attracted.is_abundance() {
            Ok(Some(Catch::from_biology(attracted, global)))
        } else {
            Ok(None)
        }
    }

    /// Release draw for one species: with probability
    /// `fish_release_probability[species]`, empty the held quantity for
    /// that species into the target cell (if the representations are
    /// compatible) or discard it.
    ///
    /// Returns `None` when the draw loses or nothing was held; otherwise
    /// the outcome says how much left and whether it was discarded (the
    /// manager emits the biomass-lost event for discards).
    ///
    /// # Errors
    ///
    /// Returns [`FadError::FadLost`] for a lost device, or a biology error
    /// from the extraction.
    pub fn maybe_release_fish<R: Rng + ?Sized>(
        &mut self,
        species: SpeciesId,
        target: Option<&mut LocalBiology>,
        global: &GlobalBiology,
        rng: &mut R,
    ) -> Result<Option<ReleaseOutcome>, FadError> {
        self.ensure_not_lost()?;
        let probability = self
            .fish_release_probability
            .get(species.index())
            .copied()
            .unwrap_or(0.0);
        if probability <= 0.0 {
            return Ok(None);
        }
        // One draw per species per day, win iff below the probability.
        let roll: f64 = rng.random();
        if roll >= probability {
            return Ok(None);
        }

        let taken = self.biology.take_species(species, global)?;
        let kilograms = taken.total_kilograms(global);
        if kilograms <= 0.0 {
            return Ok(None);
        }

        if let Some(cell) = target
            && cell.is_abundance() == taken.is_abundance()
        {
            cell.merge(&taken, global)?;
            return Ok(Some(ReleaseOutcome {
                kilograms,
                discarded: false,
            }));
        }
        Ok(Some(ReleaseOutcome {
            kilograms,
            discarded: true,
        }))
    }

    /// Fishing reaction: convert the held biology into a [`Catch`] and
    /// leave the device empty.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::FadLost`] for a lost device.
    pub fn react_to_being_fished(&mut self, global: &GlobalBiology) -> Result<Catch, FadError> {
        self.ensure_not_lost()?;
        let drained = self.biology.drain(global);
        Ok(Catch::from_biology(&drained, global))
    }

    /// Mark this device lost. Terminal and irreversible.
    pub(crate) const fn mark_lost(&mut self) {
        self.lost = true;
        self.active = false;
    }

    const fn ensure_not_lost(&self) -> Result<(), FadError> {
        if self.lost {
            return Err(FadError::FadLost(self.id));
        }
        Ok(())
    }
}
