//! Error types for the `pelagic-fads` crate.
//!
//! Precondition violations (operating on a lost device, deploying with
//! zero stock, missing per-species configuration) are caller bugs: they
//! abort the offending call with an explicit error instead of being
//! silently tolerated. Numeric edge cases inside the attraction models
//! are *not* errors -- those recover locally by attracting nothing.

use pelagic_biology::{BiologyError, GlobalBiology};
use pelagic_types::{FadId, ParamsError, SpeciesId, VesselId};

/// Errors that can occur during device and manager operations.
#[derive(Debug, thiserror::Error)]
pub enum FadError {
    /// An operation was attempted on a device already marked lost.
    #[error("fad {0} is lost; it can no longer attract, be fished, or be queried")]
    FadLost(FadId),

    /// A deployment was attempted with an empty device stock.
    #[error("vessel {vessel} has no fads left in stock")]
    OutOfStock {
        /// The vessel whose stock is empty.
        vessel: VesselId,
    },

    /// A device id is not tracked by this manager.
    #[error("fad {0} is not tracked by this manager")]
    UnknownFad(FadId),

    /// A per-species parameter table has no entry for a species.
    #[error("missing per-species parameters for species {0}")]
    MissingSpeciesParameters(SpeciesId),

    /// A last-moment manager was built without its interval calibration.
    #[error("last-moment managers carry interval calibration; use FadManager::new_last_moment")]
    MissingLastMomentCalibration,

    /// A selectivity curve does not match its species' shape.
    #[error("selectivity curve for species {species} does not match its meristics shape")]
    SelectivityShapeMismatch {
        /// The species whose curve is malformed.
        species: SpeciesId,
    },

    /// Parameter validation failed.
    #[error("invalid parameters: {source}")]
    Params {
        /// The underlying parameter error.
        #[from]
        source: ParamsError,
    },

    /// A biology operation failed.
    #[error("biology error: {source}")]
    Biology {
        /// The underlying biology error.
        #[from]
        source: BiologyError,
    },
}

/// Check that a per-species table has an entry for every registered
/// species, naming the first species without one.
pub(crate) fn check_species_table(global: &GlobalBiology, len: usize) -> Result<(), FadError> {
    if len < global.species_count() {
        let index = u32::try_from(len).unwrap_or(u32::MAX);
        return Err(FadError::MissingSpeciesParameters(SpeciesId::new(index)));
    }
    global.check_table_len(len)?;
    Ok(())
}
