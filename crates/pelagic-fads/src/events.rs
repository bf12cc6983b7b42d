//! Device lifecycle/action events and the observer registry.
//!
//! Every state change in a manager produces an immutable [`FadEvent`].
//! Events are appended to the manager's journal (the source of truth the
//! runner drains each day) and dispatched synchronously, after the state
//! mutation completes, to observers registered for that [`EventKind`] --
//! regulations and monitoring collaborators subscribe without the manager
//! knowing their concrete types.

use pelagic_biology::Catch;
use pelagic_types::{CellId, EventKind, FadId, SpeciesId, VesselId};
use serde::{Deserialize, Serialize};

/// A device lifecycle or action event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FadEvent {
    /// A device was deployed at a cell.
    Deployed {
        /// The new device.
        fad: FadId,
        /// The deploying vessel.
        vessel: VesselId,
        /// Deployment cell.
        cell: CellId,
        /// Deployment day.
        day: u64,
    },
    /// A device crossed its turn-off threshold.
    Deactivated {
        /// The deactivated device.
        fad: FadId,
        /// Day of the transition.
        day: u64,
    },
    /// A device was lost and removed from its manager.
    Lost {
        /// The lost device.
        fad: FadId,
        /// The cell it was lost at.
        cell: CellId,
        /// Day of the loss.
        day: u64,
    },
    /// A device was fished, producing a catch.
    Fished {
        /// The fished device.
        fad: FadId,
        /// The fishing vessel.
        vessel: VesselId,
        /// The cell the set happened at.
        cell: CellId,
        /// Day of the set.
        day: u64,
        /// What was landed.
        catch: Catch,
    },
    /// Held fish were discarded rather than returned to a cell.
    BiomassLost {
        /// The releasing device.
        fad: FadId,
        /// The species discarded.
        species: SpeciesId,
        /// Kilograms discarded.
        kilograms: f64,
        /// Day of the discard.
        day: u64,
    },
}

impl FadEvent {
    /// The subscription key this event dispatches under.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Deployed { .. } => EventKind::Deployed,
            Self::Deactivated { .. } => EventKind::Deactivated,
            Self::Lost { .. } => EventKind::Lost,
            Self::Fished { .. } => EventKind::Fished,
            Self::BiomassLost { .. } => EventKind::BiomassLost,
        }
    }

    /// The device this event concerns.
    pub const fn fad(&self) -> FadId {
        match self {
            Self::Deployed { fad, .. }
            | Self::Deactivated { fad, .. }
            | Self::Lost { fad, .. }
            | Self::Fished { fad, .. }
            | Self::BiomassLost { fad, .. } => *fad,
        }
    }

    /// The day this event happened.
    pub const fn day(&self) -> u64 {
        match self {
            Self::Deployed { day, .. }
            | Self::Deactivated { day, .. }
            | Self::Lost { day, .. }
            | Self::Fished { day, .. }
            | Self::BiomassLost { day, .. } => *day,
        }
    }
}

/// An observer of device events.
///
/// Observers receive events *after* the state mutation they describe has
/// been applied; reacting (including enforcement by regulations) is the
/// observer's own responsibility.
pub trait FadObserver {
    /// Handle one dispatched event.
    fn on_event(&mut self, event: &FadEvent);
}
