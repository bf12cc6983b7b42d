//! Error types for the `pelagic-core` crate.

use pelagic_biology::BiologyError;
use pelagic_fads::FadError;
use pelagic_types::{CellId, VesselId};

/// Errors that can occur while running the simulation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The day counter would overflow.
    #[error("day counter overflow: cannot advance beyond u64::MAX")]
    ClockOverflow,

    /// No manager is registered for a vessel.
    #[error("no fad manager registered for vessel {0}")]
    UnknownVessel(VesselId),

    /// A cell id does not lie on the ocean grid.
    #[error("cell {0} is outside the ocean grid")]
    UnknownCell(CellId),

    /// A device or manager operation failed.
    #[error("fad error: {source}")]
    Fad {
        /// The underlying device error.
        #[from]
        source: FadError,
    },

    /// A biology operation failed.
    #[error("biology error: {source}")]
    Biology {
        /// The underlying biology error.
        #[from]
        source: BiologyError,
    },
}
