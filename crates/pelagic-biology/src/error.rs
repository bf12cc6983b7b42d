//! Error types for the `pelagic-biology` crate.
//!
//! All fallible operations in this crate return [`BiologyError`] through the
//! standard [`Result`] type alias.

use pelagic_types::SpeciesId;

/// Errors that can occur during biology operations.
#[derive(Debug, thiserror::Error)]
pub enum BiologyError {
    /// A species id does not exist in the global biology.
    #[error("unknown species: {0}")]
    UnknownSpecies(SpeciesId),

    /// A matrix or curve does not match a species' subdivision/bin shape.
    #[error(
        "shape mismatch: expected {expected_subdivisions}x{expected_bins}, \
         got {actual_subdivisions}x{actual_bins}"
    )]
    ShapeMismatch {
        /// Expected subdivision count.
        expected_subdivisions: usize,
        /// Expected bin count.
        expected_bins: usize,
        /// Actual subdivision count.
        actual_subdivisions: usize,
        /// Actual bin count.
        actual_bins: usize,
    },

    /// A structured matrix has rows of unequal length.
    #[error("ragged matrix: row {row} has {row_bins} bins, expected {expected_bins}")]
    RaggedMatrix {
        /// Index of the offending row.
        row: usize,
        /// Bin count of the offending row.
        row_bins: usize,
        /// Bin count of the first row.
        expected_bins: usize,
    },

    /// A matrix has no subdivisions or no bins.
    #[error("empty matrix: a species needs at least one subdivision and one bin")]
    EmptyMatrix,

    /// A count, weight, or multiplier is negative or not finite.
    #[error("invalid quantity {value} at subdivision {subdivision}, bin {bin}")]
    InvalidQuantity {
        /// The rejected value.
        value: f64,
        /// Subdivision of the offending entry.
        subdivision: usize,
        /// Bin of the offending entry.
        bin: usize,
    },

    /// An operation mixed the biomass and abundance representations.
    #[error("incompatible biology representations: {context}")]
    IncompatibleBiology {
        /// What was being attempted.
        context: &'static str,
    },

    /// A per-species table does not cover every species in the registry.
    #[error("species table covers {actual} species, registry has {expected}")]
    SpeciesCountMismatch {
        /// Species count in the registry.
        expected: usize,
        /// Species count in the supplied table.
        actual: usize,
    },
}
