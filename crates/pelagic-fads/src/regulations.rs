//! Action regulations: observers that may also be consulted before acting.
//!
//! A regulation is an ordinary [`FadObserver`] with one extra question it
//! can answer: whether it would allow a deployment. The manager *consults*
//! its active set (collaborators may ask [`FadManager::is_deployment_allowed`]
//! before committing a vessel to a cell) but never enforces -- enforcement
//! is the regulation's own business when the dispatched event reaches it.
//!
//! [`FadManager::is_deployment_allowed`]: crate::manager::FadManager::is_deployment_allowed

use pelagic_types::{CellId, VesselId};

use crate::events::{FadEvent, FadObserver};

/// A replaceable, consultable device-action regulation.
pub trait ActionRegulation: FadObserver {
    /// Whether this regulation would allow `vessel` to deploy at `cell`
    /// on `day`. Purely advisory.
    fn allows_deployment(&self, vessel: VesselId, cell: CellId, day: u64) -> bool;
}

/// Caps the number of concurrently deployed devices per vessel.
///
/// Tracks deployments and losses through the event stream; fished devices
/// stay deployed (an emptied FAD keeps soaking), so only losses free up
/// room.
#[derive(Debug, Clone)]
pub struct ActiveFadLimit {
    limit: usize,
    active: usize,
}

impl ActiveFadLimit {
    /// A limit of `limit` concurrently deployed devices.
    pub const fn new(limit: usize) -> Self {
        Self { limit, active: 0 }
    }

    /// Devices currently counted as deployed.
    pub const fn active(&self) -> usize {
        self.active
    }
}

impl FadObserver for ActiveFadLimit {
    fn on_event(&mut self, event: &FadEvent) {
        match event {
            FadEvent::Deployed { .. } => self.active = self.active.saturating_add(1),
            FadEvent::Lost { .. } => self.active = self.active.saturating_sub(1),
            _ => {}
        }
    }
}

impl ActionRegulation for ActiveFadLimit {
    fn allows_deployment(&self, _vessel: VesselId, _cell: CellId, _day: u64) -> bool {
        self.active < self.limit
    }
}
