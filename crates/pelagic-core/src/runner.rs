//! The day-step loop tying clock, ocean, managers, and attraction together.
//!
//! One [`Simulation`] owns everything mutable: the clock, the ocean
//! grid, the per-vessel managers (in a `BTreeMap`, so vessels are always
//! visited in id order), one attraction strategy shared by every device,
//! the capacity side table, and a single seeded RNG threaded explicitly
//! through every stochastic call. With iteration order fixed and no
//! other randomness source, two simulations built from the same inputs
//! and seed replay bit-identically.

use std::collections::BTreeMap;

use pelagic_biology::{Catch, GlobalBiology};
use pelagic_fads::{
    AttractionContext, CapacityCache, FadError, FadEvent, FadKind, FadManager, FishAttractor,
    OceanView,
};
use pelagic_types::{CellId, EventKind, FadId, SpeciesId, VesselId};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;

use crate::clock::DayClock;
use crate::error::CoreError;
use crate::ocean::Ocean;

/// The simulation: owns all engine state and advances it day by day.
pub struct Simulation {
    clock: DayClock,
    ocean: Ocean,
    global: GlobalBiology,
    managers: BTreeMap<VesselId, FadManager>,
    attractor: Box<dyn FishAttractor>,
    capacity: CapacityCache,
    rng: SmallRng,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("day", &self.clock.day())
            .field("vessels", &self.managers.len())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Assemble a simulation from its parts, seeding the RNG.
    pub fn new(
        global: GlobalBiology,
        ocean: Ocean,
        attractor: Box<dyn FishAttractor>,
        capacity: CapacityCache,
        seed: u64,
    ) -> Self {
        Self {
            clock: DayClock::new(),
            ocean,
            global,
            managers: BTreeMap::new(),
            attractor,
            capacity,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Register a vessel's manager. Replaces any previous manager for
    /// the same vessel.
    pub fn add_manager(&mut self, manager: FadManager) {
        self.managers.insert(manager.vessel(), manager);
    }

    /// The current simulated day.
    pub const fn day(&self) -> u64 {
        self.clock.day()
    }

    /// The species registry.
    pub const fn global(&self) -> &GlobalBiology {
        &self.global
    }

    /// The ocean grid.
    pub const fn ocean(&self) -> &Ocean {
        &self.ocean
    }

    /// Mutable access to the ocean grid (scenario setup).
    pub const fn ocean_mut(&mut self) -> &mut Ocean {
        &mut self.ocean
    }

    /// A vessel's manager.
    pub fn manager(&self, vessel: VesselId) -> Option<&FadManager> {
        self.managers.get(&vessel)
    }

    /// Mutable access to a vessel's manager.
    pub fn manager_mut(&mut self, vessel: VesselId) -> Option<&mut FadManager> {
        self.managers.get_mut(&vessel)
    }

    /// Deploy one device from a vessel's stock at a cell, today.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownVessel`] or [`CoreError::UnknownCell`]
    /// for bad ids, or the manager's own error.
    pub fn deploy_fad(&mut self, vessel: VesselId, cell: CellId) -> Result<FadId, CoreError> {
        if self.ocean.biology(cell).is_none() {
            return Err(CoreError::UnknownCell(cell));
        }
        let day = self.clock.day();
        let manager = self
            .managers
            .get_mut(&vessel)
            .ok_or(CoreError::UnknownVessel(vessel))?;
        Ok(manager.deploy_fad(cell, day, &self.global, &mut self.rng)?)
    }

    /// Lose a device, evicting its capacity draws.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownVessel`] for a bad vessel, or the
    /// manager's own error.
    pub fn lose_fad(&mut self, vessel: VesselId, fad: FadId) -> Result<(), CoreError> {
        let day = self.clock.day();
        self.managers
            .get_mut(&vessel)
            .ok_or(CoreError::UnknownVessel(vessel))?
            .lose_fad(fad, day)?;
        self.capacity.evict(fad);
        Ok(())
    }

    /// Fish a device, landing its held biology.
    ///
    /// For a last-moment manager the holdings are derived from the water
    /// at this instant, and the plan's removals are applied to the ocean
    /// before the catch is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownVessel`] for a bad vessel, or the
    /// manager's own error.
    pub fn fish_fad(&mut self, vessel: VesselId, fad: FadId) -> Result<Catch, CoreError> {
        let day = self.clock.day();
        let manager = self
            .managers
            .get_mut(&vessel)
            .ok_or(CoreError::UnknownVessel(vessel))?;
        if manager.kind() == FadKind::LastMoment {
            let cell_id = manager
                .last_moment_fad(fad)
                .ok_or(FadError::UnknownFad(fad))?
                .cell();
            let cell = self
                .ocean
                .biology(cell_id)
                .ok_or(CoreError::UnknownCell(cell_id))?;
            let plan = manager.fish_last_moment_fad(fad, day, cell, &self.global)?;
            for (target, removal) in &plan.removals {
                if let Some(biology) = self.ocean.biology_mut(*target) {
                    biology.remove_clamped(removal, &self.global)?;
                }
            }
            return Ok(plan.catch);
        }
        Ok(manager.fish_fad(fad, day, &self.global)?)
    }

    /// Advance the simulation by one day and return the day's events.
    ///
    /// Order within the day, fixed for reproducibility: the clock
    /// advances; every manager steps its devices (deactivations);
    /// then per manager and per device in id order, attraction runs and
    /// the attracted quantity is aggregated out of the cell, followed by
    /// the per-species release draws. Events are drained in vessel
    /// order, and lost devices have their capacity draws evicted.
    ///
    /// # Errors
    ///
    /// Returns the first error from the clock, a manager, or a device.
    pub fn step_day(&mut self) -> Result<Vec<FadEvent>, CoreError> {
        let day = self.clock.advance()?;

        for manager in self.managers.values_mut() {
            manager.react_to_step(day)?;
        }

        let species_ids: Vec<SpeciesId> = self.global.ids().collect();
        let vessels: Vec<VesselId> = self.managers.keys().copied().collect();
        for vessel in vessels {
            let ids = self
                .managers
                .get(&vessel)
                .map(FadManager::fad_ids)
                .unwrap_or_default();
            for id in ids {
                let (cell_id, attracted) = {
                    let Some(manager) = self.managers.get(&vessel) else {
                        break;
                    };
                    let Some(fad) = manager.fad(id) else {
                        continue;
                    };
                    let cell_id = fad.location()?;
                    let Some(cell) = self.ocean.biology(cell_id) else {
                        continue;
                    };
                    let ctx = AttractionContext {
                        day,
                        global: &self.global,
                        ocean: &self.ocean,
                    };
                    let attracted =
                        self.attractor
                            .attract(fad, cell, &ctx, &mut self.capacity, &mut self.rng)?;
                    (cell_id, attracted)
                };
                let Some(manager) = self.managers.get_mut(&vessel) else {
                    break;
                };
                if let Some(attracted) = attracted
                    && let Some(cell) = self.ocean.biology_mut(cell_id)
                {
                    manager.aggregate_fish(id, &attracted.biology, cell, &self.global)?;
                }
                for &species in &species_ids {
                    let target = self.ocean.biology_mut(cell_id);
                    manager.maybe_release_fish(
                        id,
                        species,
                        target,
                        day,
                        &self.global,
                        &mut self.rng,
                    )?;
                }
            }
        }

        let mut events = Vec::new();
        for manager in self.managers.values_mut() {
            events.extend(manager.drain_events());
        }
        for event in &events {
            if event.kind() == EventKind::Lost {
                self.capacity.evict(event.fad());
            }
        }
        info!(day, events = events.len(), "stepped simulation day");
        Ok(events)
    }
}
