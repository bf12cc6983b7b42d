//! Shared type definitions for the pelagic FAD simulation.
//!
//! This crate is the leaf of the workspace: type-safe identifiers, shared
//! enums, and the plain parameter structs the (external) scenario-loading
//! layer hands to the engine. Nothing here owns behavior; the biology and
//! device crates build on these types.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (event kinds)
//! - [`params`] -- Parameter structs supplied by the scenario layer

pub mod enums;
pub mod ids;
pub mod params;

// Re-export all public types at crate root for convenience.
pub use enums::EventKind;
pub use ids::{CellId, FadId, SpeciesId, VesselId};
pub use params::{
    CapacityDistribution, CompressedExponentialCoefficients, CompressedExponentialParams,
    FadInitializerParams, IntervalAttractorParams, LinearAttractorParams, ParamsError,
};
