//! Fish aggregation devices: entities, attraction, and management.
//!
//! A FAD drifts in an ocean cell, accumulates fish from that cell while
//! its attraction window is open, and eventually gets fished, released,
//! deactivated, or lost. This crate owns the device state machine, the
//! family of attraction strategies, the per-device carrying-capacity
//! side table, and the per-vessel manager with its event/observer
//! plumbing. The ocean itself is abstract here -- anything implementing
//! [`OceanView`] will do; the concrete grid lives in `pelagic-core`.
//!
//! # Modules
//!
//! - [`fad`] -- the [`Fad`] entity and its lifecycle.
//! - [`attractors`] -- the [`FishAttractor`] strategy family.
//! - [`capacity`] -- per-device capacity draws, memoized in a
//!   [`CapacityCache`].
//! - [`manager`] -- the per-vessel [`FadManager`] registry.
//! - [`events`] -- [`FadEvent`] payloads and the [`FadObserver`] trait.
//! - [`regulations`] -- consultable [`ActionRegulation`] observers.
//! - [`last_moment`] -- devices whose holdings are computed at fishing
//!   time instead of stored.
//! - [`view`] -- the [`OceanView`] abstraction.
//! - [`error`] -- [`FadError`].

pub mod attractors;
pub mod capacity;
pub mod error;
pub mod events;
pub mod fad;
pub mod last_moment;
pub mod manager;
pub mod regulations;
pub mod view;

// Re-export primary types at crate root.
pub use attractors::{
    AttractedBiology, AttractionContext, CompressedExponentialAttractor, FishAttractor,
    GlobalSelectivityIntervalAttractor, IntervalAttractor, LinearAbundanceAttractor,
    LinearBiomassAttractor,
};
pub use capacity::{CapacityCache, sample_capacity};
pub use error::FadError;
pub use events::{FadEvent, FadObserver};
pub use fad::{Fad, FadKind, ReleaseOutcome};
pub use last_moment::{FishingPlan, LastMomentFad, RangedLastMomentFad};
pub use manager::FadManager;
pub use regulations::{ActionRegulation, ActiveFadLimit};
pub use view::OceanView;
