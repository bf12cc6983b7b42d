//! A concrete ocean grid for the engine to run against.
//!
//! Cells are laid out row-major; a [`CellId`] is the row-major index, so
//! iterating `cell_ids()` is already in deterministic order. The grid is
//! deliberately simple -- the production spatial index is an external
//! collaborator behind the same [`OceanView`] trait.

use pelagic_biology::{GlobalBiology, LocalBiology};
use pelagic_fads::OceanView;
use pelagic_types::CellId;

/// A rectangular grid of cells, each holding one [`LocalBiology`].
#[derive(Debug, Clone)]
pub struct Ocean {
    width: u32,
    height: u32,
    cells: Vec<LocalBiology>,
}

impl Ocean {
    /// A grid of empty biomass cells.
    pub fn new_biomass(global: &GlobalBiology, width: u32, height: u32) -> Self {
        Self::filled(width, height, || LocalBiology::empty_biomass(global))
    }

    /// A grid of empty abundance cells.
    pub fn new_abundance(global: &GlobalBiology, width: u32, height: u32) -> Self {
        Self::filled(width, height, || LocalBiology::empty_abundance(global))
    }

    fn filled(width: u32, height: u32, mut cell: impl FnMut() -> LocalBiology) -> Self {
        let count = (u64::from(width))
            .checked_mul(u64::from(height))
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        let mut cells = Vec::with_capacity(count);
        for _ in 0..count {
            cells.push(cell());
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Grid width in cells.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The cell id at `(x, y)`, if the coordinates are on the grid.
    pub fn cell_at(&self, x: u32, y: u32) -> Option<CellId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        u64::from(y)
            .checked_mul(u64::from(self.width))
            .and_then(|row| row.checked_add(u64::from(x)))
            .map(CellId::new)
    }

    /// The `(x, y)` coordinates of a cell id, if it is on the grid.
    pub fn coordinates(&self, cell: CellId) -> Option<(u32, u32)> {
        if self.width == 0 {
            return None;
        }
        let index = cell.into_inner();
        let x = u32::try_from(index % u64::from(self.width)).ok()?;
        let y = u32::try_from(index / u64::from(self.width)).ok()?;
        if y >= self.height { None } else { Some((x, y)) }
    }

    /// Mutable access to one cell's biology.
    pub fn biology_mut(&mut self, cell: CellId) -> Option<&mut LocalBiology> {
        let index = usize::try_from(cell.into_inner()).ok()?;
        self.cells.get_mut(index)
    }
}

impl OceanView for Ocean {
    fn cell_ids(&self) -> Vec<CellId> {
        let mut ids = Vec::with_capacity(self.cells.len());
        for index in 0..self.cells.len() {
            if let Ok(id) = u64::try_from(index) {
                ids.push(CellId::new(id));
            }
        }
        ids
    }

    fn biology(&self, cell: CellId) -> Option<&LocalBiology> {
        let index = usize::try_from(cell.into_inner()).ok()?;
        self.cells.get(index)
    }

    /// Cells within a Chebyshev distance of `range`, clamped at the grid
    /// edges (no wraparound), in row-major order. Includes `cell` itself.
    fn neighborhood(&self, cell: CellId, range: u32) -> Vec<CellId> {
        let Some((x, y)) = self.coordinates(cell) else {
            return Vec::new();
        };
        let x0 = x.saturating_sub(range);
        let y0 = y.saturating_sub(range);
        let x1 = x
            .saturating_add(range)
            .min(self.width.saturating_sub(1));
        let y1 = y
            .saturating_add(range)
            .min(self.height.saturating_sub(1));
        let mut ids = Vec::new();
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                if let Some(id) = self.cell_at(nx, ny) {
                    ids.push(id);
                }
            }
        }
        ids
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pelagic_biology::SpeciesDefinition;
    use pelagic_types::SpeciesId;

    use super::*;

    fn global() -> GlobalBiology {
        GlobalBiology::new(vec![SpeciesDefinition {
            name: "Skipjack".to_owned(),
            weight_per_bin: vec![vec![1.0]],
        }])
        .unwrap()
    }

    #[test]
    fn ids_are_row_major() {
        let ocean = Ocean::new_biomass(&global(), 3, 2);
        assert_eq!(ocean.cell_at(0, 0), Some(CellId::new(0)));
        assert_eq!(ocean.cell_at(2, 0), Some(CellId::new(2)));
        assert_eq!(ocean.cell_at(0, 1), Some(CellId::new(3)));
        assert_eq!(ocean.cell_at(3, 0), None);
        assert_eq!(ocean.coordinates(CellId::new(4)), Some((1, 1)));
        assert_eq!(ocean.coordinates(CellId::new(6)), None);
    }

    #[test]
    fn neighborhood_clamps_at_the_edges() {
        let ocean = Ocean::new_biomass(&global(), 3, 3);
        // Corner cell: only the 2x2 block exists.
        let corner = ocean.cell_at(0, 0).unwrap();
        assert_eq!(
            ocean.neighborhood(corner, 1),
            vec![
                CellId::new(0),
                CellId::new(1),
                CellId::new(3),
                CellId::new(4)
            ]
        );
        // Center cell: the full 3x3 block.
        let center = ocean.cell_at(1, 1).unwrap();
        assert_eq!(ocean.neighborhood(center, 1).len(), 9);
    }

    #[test]
    fn mutation_reaches_the_right_cell() {
        let global = global();
        let mut ocean = Ocean::new_biomass(&global, 2, 2);
        let cell = ocean.cell_at(1, 1).unwrap();
        if let Some(biology) = ocean.biology_mut(cell)
            && let Some(biomass) = biology.as_biomass_mut()
        {
            biomass.add(SpeciesId::new(0), 42.0);
        }
        let total: f64 = ocean
            .cell_ids()
            .iter()
            .filter_map(|&id| ocean.biology(id))
            .map(|b| b.total_kilograms(&global))
            .sum();
        assert!((total - 42.0).abs() < 1e-12);
        assert!(
            (ocean
                .biology(cell)
                .map(|b| b.total_kilograms(&global))
                .unwrap_or(0.0)
                - 42.0)
                .abs()
                < 1e-12
        );
    }
}
