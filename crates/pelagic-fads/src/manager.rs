//! Per-vessel device registry: stock, deployment, and event dispatch.
//!
//! Each vessel owns one [`FadManager`]. The manager is an arena of
//! devices keyed by [`FadId`] (a `BTreeMap`, so every per-device loop
//! runs in stable id order) plus the stock of devices not yet in the
//! water. Every state change appends an event to the manager's journal
//! -- the runner drains it once per day -- and dispatches it to the
//! observers registered for that kind, after the mutation has been
//! applied.

use std::collections::BTreeMap;

use pelagic_biology::{Catch, GlobalBiology, LocalBiology, SelectivityCurve};
use pelagic_types::{
    CellId, EventKind, FadId, FadInitializerParams, IntervalAttractorParams, SpeciesId, VesselId,
};
use rand::Rng;
use tracing::debug;

use crate::error::{FadError, check_species_table};
use crate::events::{FadEvent, FadObserver};
use crate::fad::{Fad, FadKind};
use crate::last_moment::{FishingPlan, LastMomentFad};
use crate::regulations::ActionRegulation;

/// Device ids are the owning vessel in the high bits and a per-vessel
/// counter in the low bits, so ids stay unique across managers without
/// any shared allocator.
fn compose_id(vessel: VesselId, counter: u32) -> FadId {
    FadId::new((u64::from(vessel.into_inner()) << 32) | u64::from(counter))
}

/// Calibration a last-moment manager stamps onto every device it deploys.
struct LastMomentConfig {
    params: IntervalAttractorParams,
    selectivity: Vec<SelectivityCurve>,
}

/// The per-vessel registry of fish aggregation devices.
pub struct FadManager {
    vessel: VesselId,
    kind: FadKind,
    initializer: FadInitializerParams,
    fads: BTreeMap<FadId, Fad>,
    last_moment_fads: BTreeMap<FadId, LastMomentFad>,
    last_moment_config: Option<LastMomentConfig>,
    fads_in_stock: u32,
    next_counter: u32,
    observers: BTreeMap<EventKind, Vec<Box<dyn FadObserver>>>,
    regulations: Vec<Box<dyn ActionRegulation>>,
    journal: Vec<FadEvent>,
}

impl std::fmt::Debug for FadManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FadManager")
            .field("vessel", &self.vessel)
            .field("kind", &self.kind)
            .field("deployed", &self.deployed_count())
            .field("in_stock", &self.fads_in_stock)
            .finish_non_exhaustive()
    }
}

impl FadManager {
    /// Build a manager for one vessel with an initial device stock.
    ///
    /// # Errors
    ///
    /// Returns a parameter error if the initializer is invalid, or
    /// [`FadError::MissingLastMomentCalibration`] for the last-moment
    /// kind (which needs [`Self::new_last_moment`]).
    pub fn new(
        vessel: VesselId,
        kind: FadKind,
        initializer: FadInitializerParams,
        fads_in_stock: u32,
    ) -> Result<Self, FadError> {
        if kind == FadKind::LastMoment {
            return Err(FadError::MissingLastMomentCalibration);
        }
        initializer.validate()?;
        Ok(Self {
            vessel,
            kind,
            initializer,
            fads: BTreeMap::new(),
            last_moment_fads: BTreeMap::new(),
            last_moment_config: None,
            fads_in_stock,
            next_counter: 0,
            observers: BTreeMap::new(),
            regulations: Vec::new(),
            journal: Vec::new(),
        })
    }

    /// Build a manager whose devices are last-moment: holdings are
    /// derived from the water at fishing time instead of being stored
    /// day by day.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for invalid values, a species count
    /// mismatch, or a curve whose shape does not match its species.
    pub fn new_last_moment(
        vessel: VesselId,
        initializer: FadInitializerParams,
        fads_in_stock: u32,
        global: &GlobalBiology,
        params: IntervalAttractorParams,
        selectivity: Vec<SelectivityCurve>,
    ) -> Result<Self, FadError> {
        initializer.validate()?;
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
            vessel,
            kind: FadKind::LastMoment,
            initializer,
            fads: BTreeMap::new(),
            last_moment_fads: BTreeMap::new(),
            last_moment_config: Some(LastMomentConfig {
                params,
                selectivity,
            }),
            fads_in_stock,
            next_counter: 0,
            observers: BTreeMap::new(),
            regulations: Vec::new(),
            journal: Vec::new(),
        })
    }

    /// The vessel this manager belongs to.
    pub const fn vessel(&self) -> VesselId {
        self.vessel
    }

    /// The representation this manager's devices hold.
    pub const fn kind(&self) -> FadKind {
        self.kind
    }

    /// Devices still aboard, not yet deployed.
    pub const fn fads_in_stock(&self) -> u32 {
        self.fads_in_stock
    }

    /// Number of devices currently in the water.
    pub fn deployed_count(&self) -> usize {
        self.fads.len().saturating_add(self.last_moment_fads.len())
    }

    /// Subscribe an observer to one event kind.
    pub fn register_observer(&mut self, kind: EventKind, observer: Box<dyn FadObserver>) {
        self.observers.entry(kind).or_default().push(observer);
    }

    /// Install a regulation. Regulations see *every* event kind.
    pub fn add_regulation(&mut self, regulation: Box<dyn ActionRegulation>) {
        self.regulations.push(regulation);
    }

    /// Consult the active regulations about a prospective deployment.
    /// Purely advisory; [`Self::deploy_fad`] does not call this.
    pub fn is_deployment_allowed(&self, cell: CellId, day: u64) -> bool {
        self.regulations
            .iter()
            .all(|regulation| regulation.allows_deployment(self.vessel, cell, day))
    }

    /// Deploy one device from stock at a cell.
    ///
    /// Whether the device is a dud is drawn here, once, from the
    /// initializer's dud probability.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::OutOfStock`] when no device is left aboard.
    pub fn deploy_fad<R: Rng + ?Sized>(
        &mut self,
        cell: CellId,
        day: u64,
        global: &GlobalBiology,
        rng: &mut R,
    ) -> Result<FadId, FadError> {
        if self.fads_in_stock == 0 {
            return Err(FadError::OutOfStock {
                vessel: self.vessel,
            });
        }
        self.fads_in_stock = self.fads_in_stock.saturating_sub(1);

        let id = compose_id(self.vessel, self.next_counter);
        self.next_counter = self.next_counter.saturating_add(1);
        match self.kind {
            FadKind::Biomass | FadKind::Abundance => {
                let dud = rng.random::<f64>() < self.initializer.dud_probability;
                let biology = if self.kind == FadKind::Biomass {
                    LocalBiology::empty_biomass(global)
                } else {
                    LocalBiology::empty_abundance(global)
                };
                let fad = Fad::new(id, self.vessel, cell, day, biology, &self.initializer, dud);
                self.fads.insert(id, fad);
                debug!(vessel = %self.vessel, fad = %id, cell = %cell, day, dud, "deployed fad");
            }
            FadKind::LastMoment => {
                let Some(config) = &self.last_moment_config else {
                    return Err(FadError::MissingLastMomentCalibration);
                };
                let fad = LastMomentFad::new(
                    id,
                    self.vessel,
                    cell,
                    day,
                    global,
                    &config.params,
                    config.selectivity.clone(),
                    self.initializer.days_in_water_before_attraction,
                )?;
                self.last_moment_fads.insert(id, fad);
                debug!(vessel = %self.vessel, fad = %id, cell = %cell, day, "deployed last-moment fad");
            }
        }

        self.emit(FadEvent::Deployed {
            fad: id,
            vessel: self.vessel,
            cell,
            day,
        });
        Ok(id)
    }

    /// Lose a device: terminal, removes it from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::UnknownFad`] for an untracked id.
    pub fn lose_fad(&mut self, id: FadId, day: u64) -> Result<(), FadError> {
        let cell = if let Some(fad) = self.fads.get_mut(&id) {
            let cell = fad.location()?;
            fad.mark_lost();
            self.fads.remove(&id);
            cell
        } else {
            let fad = self
                .last_moment_fads
                .get_mut(&id)
                .ok_or(FadError::UnknownFad(id))?;
            let cell = fad.cell();
            fad.mark_lost();
            self.last_moment_fads.remove(&id);
            cell
        };
        debug!(vessel = %self.vessel, fad = %id, cell = %cell, day, "lost fad");

        self.emit(FadEvent::Lost { fad: id, cell, day });
        Ok(())
    }

    /// Fish a device: its held biology becomes a catch, the device stays
    /// deployed (and keeps soaking) with empty holdings.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::UnknownFad`] for an untracked id, or
    /// [`FadError::FadLost`] if the device was lost.
    pub fn fish_fad(
        &mut self,
        id: FadId,
        day: u64,
        global: &GlobalBiology,
    ) -> Result<Catch, FadError> {
        let fad = self.fads.get_mut(&id).ok_or(FadError::UnknownFad(id))?;
        let cell = fad.location()?;
        let catch = fad.react_to_being_fished(global)?;
        debug!(
            vessel = %self.vessel,
            fad = %id,
            cell = %cell,
            day,
            kilograms = catch.total_kilograms(),
            "fished fad"
        );

        self.emit(FadEvent::Fished {
            fad: id,
            vessel: self.vessel,
            cell,
            day,
            catch: catch.clone(),
        });
        Ok(catch)
    }

    /// Fish a last-moment device: derive its virtual holdings from the
    /// cell it drifts in and return the removal plan for the caller to
    /// apply to the water. The device stays deployed.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::UnknownFad`] for an untracked id, or the
    /// device's own error.
    pub fn fish_last_moment_fad(
        &mut self,
        id: FadId,
        day: u64,
        cell: &LocalBiology,
        global: &GlobalBiology,
    ) -> Result<FishingPlan, FadError> {
        let fad = self
            .last_moment_fads
            .get(&id)
            .ok_or(FadError::UnknownFad(id))?;
        let cell_id = fad.cell();
        let plan = fad.react_to_being_fished(day, cell, global)?;
        debug!(
            vessel = %self.vessel,
            fad = %id,
            cell = %cell_id,
            day,
            kilograms = plan.catch.total_kilograms(),
            "fished last-moment fad"
        );

        self.emit(FadEvent::Fished {
            fad: id,
            vessel: self.vessel,
            cell: cell_id,
            day,
            catch: plan.catch.clone(),
        });
        Ok(plan)
    }

    /// Advance every deployed device by one day, emitting a deactivation
    /// event for each device that crossed its turn-off threshold.
    /// Last-moment devices carry no daily state and are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the first device error (a lost device left in the
    /// registry is a bug).
    pub fn react_to_step(&mut self, day: u64) -> Result<(), FadError> {
        let mut deactivated = Vec::new();
        for (&id, fad) in &mut self.fads {
            if fad.react_to_step(day)? {
                deactivated.push(id);
            }
        }
        for id in deactivated {
            self.emit(FadEvent::Deactivated { fad: id, day });
        }
        Ok(())
    }

    /// Merge attracted quantity into a device (see
    /// [`Fad::aggregate_fish`]).
    ///
    /// # Errors
    ///
    /// Returns [`FadError::UnknownFad`] for an untracked id, or the
    /// device's own error.
    pub fn aggregate_fish(
        &mut self,
        id: FadId,
        attracted: &LocalBiology,
        cell: &mut LocalBiology,
        global: &GlobalBiology,
    ) -> Result<Option<Catch>, FadError> {
        self.fads
            .get_mut(&id)
            .ok_or(FadError::UnknownFad(id))?
            .aggregate_fish(attracted, cell, global)
    }

    /// Run one species' release draw on a device, emitting a biomass-lost
    /// event if the released fish could not return to the cell.
    ///
    /// # Errors
    ///
    /// Returns [`FadError::UnknownFad`] for an untracked id, or the
    /// device's own error.
    pub fn maybe_release_fish<R: Rng + ?Sized>(
        &mut self,
        id: FadId,
        species: SpeciesId,
        target: Option<&mut LocalBiology>,
        day: u64,
        global: &GlobalBiology,
        rng: &mut R,
    ) -> Result<(), FadError> {
        let outcome = self
            .fads
            .get_mut(&id)
            .ok_or(FadError::UnknownFad(id))?
            .maybe_release_fish(species, target, global, rng)?;
        if let Some(outcome) = outcome
            && outcome.discarded
        {
            self.emit(FadEvent::BiomassLost {
                fad: id,
                species,
                kilograms: outcome.kilograms,
                day,
            });
        }
        Ok(())
    }

    /// A deployed device by id.
    pub fn fad(&self, id: FadId) -> Option<&Fad> {
        self.fads.get(&id)
    }

    /// A deployed last-moment device by id.
    pub fn last_moment_fad(&self, id: FadId) -> Option<&LastMomentFad> {
        self.last_moment_fads.get(&id)
    }

    /// Ids of all deployed last-moment devices, in id order.
    pub fn last_moment_ids(&self) -> Vec<FadId> {
        self.last_moment_fads.keys().copied().collect()
    }

    /// All deployed devices, in id order.
    pub fn deployed_fads(&self) -> impl Iterator<Item = &Fad> {
        self.fads.values()
    }

    /// Ids of all deployed devices, in id order.
    pub fn fad_ids(&self) -> Vec<FadId> {
        self.fads.keys().copied().collect()
    }

    /// Ids of the devices drifting at one cell, in id order.
    pub fn fads_at(&self, cell: CellId) -> Vec<FadId> {
        self.fads
            .iter()
            .filter(|(_, fad)| fad.location().is_ok_and(|c| c == cell))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Drain the event journal (the runner calls this once per day).
    pub fn drain_events(&mut self) -> Vec<FadEvent> {
        std::mem::take(&mut self.journal)
    }

    /// Dispatch the event to subscribed observers and to every
    /// regulation, then append it to the journal.
    fn emit(&mut self, event: FadEvent) {
        if let Some(observers) = self.observers.get_mut(&event.kind()) {
            for observer in observers.iter_mut() {
                observer.on_event(&event);
            }
        }
        for regulation in &mut self.regulations {
            regulation.on_event(&event);
        }
        self.journal.push(event);
    }
}
