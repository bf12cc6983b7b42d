//! The family of attraction algorithms.
//!
//! An attractor is a strategy shared by every device of a kind: given the
//! biology of the cell a device sits on, it computes how much quantity
//! transfers into the device today. Strategies are explicit trait objects
//! selected at construction time; they carry calibrated parameters but no
//! per-device state -- per-device memos live in the [`CapacityCache`]
//! side table passed to each call.
//!
//! Every model goes through [`FishAttractor::attract`], which gates on
//! [`Fad::can_attract_fish`] before touching model logic; a `None` result
//! means "nothing attracted this step" and mutates nothing.
//!
//! # Models
//!
//! - [`LinearBiomassAttractor`] / [`LinearAbundanceAttractor`] -- fixed
//!   daily rates with uniform capacity scaling.
//! - [`CompressedExponentialAttractor`] -- per-species Bernoulli gate
//!   with a compressed-exponential probability.
//! - [`IntervalAttractor`] -- catchability x selectivity over the soak
//!   window.
//! - [`GlobalSelectivityIntervalAttractor`] -- daily ocean-wide
//!   selectivity normalization with per-bin thresholds.

mod compressed;
mod interval;
mod linear;

pub use compressed::CompressedExponentialAttractor;
pub use interval::{GlobalSelectivityIntervalAttractor, IntervalAttractor};
pub use linear::{LinearAbundanceAttractor, LinearBiomassAttractor};

use pelagic_biology::{GlobalBiology, LocalBiology};
use rand::RngCore;

use crate::capacity::CapacityCache;
use crate::error::FadError;
use crate::fad::Fad;
use crate::view::OceanView;

/// Quantity attracted by one device in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct AttractedBiology {
    /// The attracted quantity, same representation as the source cell.
    pub biology: LocalBiology,
    /// Total kilograms across species (precomputed by the model).
    pub total_kilograms: f64,
}

/// Read-only context shared by every attraction call of one day.
pub struct AttractionContext<'a> {
    /// The current simulated day.
    pub day: u64,
    /// The species registry.
    pub global: &'a GlobalBiology,
    /// The ocean, for models that look beyond the device's own cell.
    pub ocean: &'a dyn OceanView,
}

/// A pluggable attraction strategy.
pub trait FishAttractor {
    /// Attract fish from `cell` into `fad` for one day.
    ///
    /// Checks the device's attraction gate first; models only see devices
    /// that are allowed to attract today. Returns `Ok(None)` when nothing
    /// is attracted -- by the gate, by empty water, or by a losing draw.
    ///
    /// # Errors
    ///
    /// Returns [`FadError`] for representation mismatches between the
    /// model and the cell (a configuration bug).
    fn attract(
        &mut self,
        fad: &Fad,
        cell: &LocalBiology,
        ctx: &AttractionContext<'_>,
        capacity: &mut CapacityCache,
        rng: &mut dyn RngCore,
    ) -> Result<Option<AttractedBiology>, FadError> {
        if !fad.can_attract_fish(ctx.day) {
            return Ok(None);
        }
        self.attract_impl(fad, cell, ctx, capacity, rng)
    }

    /// Model-specific attraction, called only for devices whose gate is
    /// open.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::attract`].
    fn attract_impl(
        &mut self,
        fad: &Fad,
        cell: &LocalBiology,
        ctx: &AttractionContext<'_>,
        capacity: &mut CapacityCache,
        rng: &mut dyn RngCore,
    ) -> Result<Option<AttractedBiology>, FadError>;
}

/// Uniform scale-down factor keeping an attraction step within the
/// device's total capacity: `min(1, (capacity - held) / attracted)`.
///
/// Zero or negative attracted totals yield a zero factor (nothing to
/// scale); exhausted capacity clamps to zero rather than going negative.
pub(crate) fn uniform_capacity_scale(attracted: f64, held: f64, capacity: f64) -> f64 {
    if attracted <= 0.0 {
        return 0.0;
    }
    ((capacity - held) / attracted).clamp(0.0, 1.0)
}

/// Per-species kilograms of a biology, in species-index order.
pub(crate) fn per_species_kilograms(biology: &LocalBiology, global: &GlobalBiology) -> Vec<f64> {
    global
        .ids()
        .map(|id| biology.kilograms_of(id, global))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_one_with_plenty_of_headroom() {
        assert!((uniform_capacity_scale(10.0, 0.0, 100.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scale_shrinks_near_capacity() {
        // 40 held of 50, 20 attracted -> only 10 fits -> scale 0.5.
        assert!((uniform_capacity_scale(20.0, 40.0, 50.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn scale_is_zero_at_or_over_capacity() {
        assert!(uniform_capacity_scale(20.0, 50.0, 50.0).abs() < 1e-12);
        assert!(uniform_capacity_scale(20.0, 60.0, 50.0).abs() < 1e-12);
    }

    #[test]
    fn zero_attraction_scales_to_zero() {
        assert!(uniform_capacity_scale(0.0, 0.0, 50.0).abs() < 1e-12);
    }
}
