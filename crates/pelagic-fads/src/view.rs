//! Read-only view of the ocean the attraction engine runs against.
//!
//! The production spatial index lives outside this workspace; the engine
//! only needs three queries, expressed here as a trait. `pelagic-core`
//! ships a concrete grid implementation for the harness and tests.

use pelagic_biology::LocalBiology;
use pelagic_types::CellId;

/// Spatial queries the attraction engine needs from its host.
///
/// Implementations must return cells in a stable, deterministic order --
/// the global-selectivity attractor and the range-aware last-moment
/// variant iterate these results while a shared RNG is live.
pub trait OceanView {
    /// All cell ids, in stable iteration order.
    fn cell_ids(&self) -> Vec<CellId>;

    /// The biology currently held by a cell, if the cell exists.
    fn biology(&self, cell: CellId) -> Option<&LocalBiology>;

    /// The cells within `range` steps of `cell` (including `cell`
    /// itself), in stable order.
    fn neighborhood(&self, cell: CellId, range: u32) -> Vec<CellId>;
}
