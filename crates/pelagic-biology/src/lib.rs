//! Biology primitives for the pelagic FAD simulation.
//!
//! This crate models quantities of fish: species identity and meristics,
//! unstructured biomass, size-structured abundance, selectivity curves,
//! and the catch records fishing reactions produce. Cells and devices
//! both hold a [`LocalBiology`]; the attraction engine in `pelagic-fads`
//! moves quantity between them.
//!
//! # Modules
//!
//! - [`species`] -- [`Species`] meristics and the [`GlobalBiology`] registry.
//! - [`abundance`] -- [`AbundanceMatrix`]: non-negative counts by
//!   subdivision and bin, with clamped mutation and weight conversion.
//! - [`local`] -- [`LocalBiology`]: the Biomass | Abundance sum type held
//!   by cells and devices.
//! - [`selectivity`] -- [`SelectivityCurve`] per-bin retention multipliers.
//! - [`catch_record`] -- [`Catch`] records consumed by downstream
//!   collaborators.
//! - [`error`] -- [`BiologyError`].

pub mod abundance;
pub mod catch_record;
pub mod error;
pub mod local;
pub mod selectivity;
pub mod species;

// Re-export primary types at crate root.
pub use abundance::AbundanceMatrix;
pub use catch_record::Catch;
pub use error::BiologyError;
pub use local::{AbundanceBiology, BiomassBiology, LocalBiology};
pub use selectivity::SelectivityCurve;
pub use species::{GlobalBiology, Species, SpeciesDefinition};
