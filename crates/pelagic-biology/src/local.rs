//! A local quantity of fish, held by an ocean cell or by a device.
//!
//! [`LocalBiology`] is an explicit tagged type rather than a class
//! hierarchy: every holder is either *biomass* (one scalar per species)
//! or *abundance* (one structured matrix per species), and callers match
//! on the variant instead of downcasting. Mixing the two representations
//! in an add/remove is an [`BiologyError::IncompatibleBiology`] -- the one
//! legal cross-representation query is weighing abundance, which needs
//! the species meristics.

use serde::{Deserialize, Serialize};

use crate::abundance::AbundanceMatrix;
use crate::error::BiologyError;
use crate::species::GlobalBiology;
use pelagic_types::SpeciesId;

/// Per-species biomass in kilograms, no size structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomassBiology {
    kilograms: Vec<f64>,
}

impl BiomassBiology {
    /// Zero biomass for every species in the registry.
    pub fn empty(global: &GlobalBiology) -> Self {
        Self {
            kilograms: vec![0.0; global.species_count()],
        }
    }

    /// Build from per-species kilograms.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::SpeciesCountMismatch`] if the table does not
    /// cover the registry, or [`BiologyError::InvalidQuantity`] for a
    /// negative or non-finite entry.
    pub fn from_kilograms(global: &GlobalBiology, kilograms: Vec<f64>) -> Result<Self, BiologyError> {
        global.check_table_len(kilograms.len())?;
        for (index, kg) in kilograms.iter().enumerate() {
            if !kg.is_finite() || *kg < 0.0 {
                return Err(BiologyError::InvalidQuantity {
                    value: *kg,
                    subdivision: index,
                    bin: 0,
                });
            }
        }
        Ok(Self { kilograms })
    }

    /// Kilograms held for one species (zero for unknown ids).
    pub fn kilograms_of(&self, species: SpeciesId) -> f64 {
        self.kilograms.get(species.index()).copied().unwrap_or(0.0)
    }

    /// Add kilograms for one species.
    pub fn add(&mut self, species: SpeciesId, kilograms: f64) {
        if let Some(kg) = self.kilograms.get_mut(species.index()) {
            *kg = (*kg + kilograms).max(0.0);
        }
    }

    /// Remove up to `kilograms` for one species, clamping at zero.
    /// Returns the amount actually removed.
    pub fn remove_clamped(&mut self, species: SpeciesId, kilograms: f64) -> f64 {
        self.kilograms.get_mut(species.index()).map_or(0.0, |kg| {
            let removed = kilograms.min(*kg).max(0.0);
            *kg -= removed;
            removed
        })
    }

    /// Total kilograms across species.
    pub fn total_kilograms(&self) -> f64 {
        self.kilograms.iter().sum()
    }
}

/// Per-species structured abundance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbundanceBiology {
    matrices: Vec<AbundanceMatrix>,
}

impl AbundanceBiology {
    /// Zero matrices shaped to every species in the registry.
    pub fn empty(global: &GlobalBiology) -> Self {
        Self {
            matrices: global.iter().map(AbundanceMatrix::zeros_for).collect(),
        }
    }

    /// Build from per-species matrices, checking each shape against the
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::SpeciesCountMismatch`] for a wrong table
    /// length or [`BiologyError::ShapeMismatch`] for a wrongly shaped
    /// matrix.
    pub fn from_matrices(
        global: &GlobalBiology,
        matrices: Vec<AbundanceMatrix>,
    ) -> Result<Self, BiologyError> {
        global.check_table_len(matrices.len())?;
        for (species, matrix) in global.iter().zip(&matrices) {
            if !matrix.matches_shape(species) {
                return Err(BiologyError::ShapeMismatch {
                    expected_subdivisions: species.subdivisions(),
                    expected_bins: species.bins(),
                    actual_subdivisions: matrix.subdivisions(),
                    actual_bins: matrix.bins(),
                });
            }
        }
        Ok(Self { matrices })
    }

    /// The matrix for one species, if the id is in range.
    pub fn matrix_of(&self, species: SpeciesId) -> Option<&AbundanceMatrix> {
        self.matrices.get(species.index())
    }

    /// Add counts for one species.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::UnknownSpecies`] for an out-of-range id or
    /// [`BiologyError::ShapeMismatch`] for a wrongly shaped delta.
    pub fn add(&mut self, species: SpeciesId, delta: &AbundanceMatrix) -> Result<(), BiologyError> {
        self.matrices
            .get_mut(species.index())
            .ok_or(BiologyError::UnknownSpecies(species))?
            .add(delta)
    }

    /// Remove counts for one species, clamping each entry at zero.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::UnknownSpecies`] for an out-of-range id or
    /// [`BiologyError::ShapeMismatch`] for a wrongly shaped removal.
    pub fn remove_clamped(
        &mut self,
        species: SpeciesId,
        removal: &AbundanceMatrix,
    ) -> Result<(), BiologyError> {
        self.matrices
            .get_mut(species.index())
            .ok_or(BiologyError::UnknownSpecies(species))?
            .subtract_clamped(removal)
    }

    /// Kilograms held for one species, weighed through the meristics.
    pub fn kilograms_of(&self, species: SpeciesId, global: &GlobalBiology) -> f64 {
        match (self.matrices.get(species.index()), global.get(species)) {
            (Some(matrix), Some(meta)) => matrix.total_weight(meta),
            _ => 0.0,
        }
    }

    /// Total kilograms across species.
    pub fn total_kilograms(&self, global: &GlobalBiology) -> f64 {
        global
            .iter()
            .zip(&self.matrices)
            .map(|(species, matrix)| matrix.total_weight(species))
            .sum()
    }
}

/// A quantity of fish held by one cell or one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocalBiology {
    /// Unstructured per-species biomass.
    Biomass(BiomassBiology),
    /// Size-structured per-species abundance.
    Abundance(AbundanceBiology),
}

impl LocalBiology {
    /// Empty biomass biology shaped to the registry.
    pub fn empty_biomass(global: &GlobalBiology) -> Self {
        Self::Biomass(BiomassBiology::empty(global))
    }

    /// Empty abundance biology shaped to the registry.
    pub fn empty_abundance(global: &GlobalBiology) -> Self {
        Self::Abundance(AbundanceBiology::empty(global))
    }

    /// An empty biology of the same representation as `self`.
    pub fn empty_like(&self, global: &GlobalBiology) -> Self {
        match self {
            Self::Biomass(_) => Self::empty_biomass(global),
            Self::Abundance(_) => Self::empty_abundance(global),
        }
    }

    /// Whether this is the structured-abundance representation.
    pub const fn is_abundance(&self) -> bool {
        matches!(self, Self::Abundance(_))
    }

    /// Kilograms held for one species.
    pub fn kilograms_of(&self, species: SpeciesId, global: &GlobalBiology) -> f64 {
        match self {
            Self::Biomass(biomass) => biomass.kilograms_of(species),
            Self::Abundance(abundance) => abundance.kilograms_of(species, global),
        }
    }

    /// Total kilograms across species.
    pub fn total_kilograms(&self, global: &GlobalBiology) -> f64 {
        match self {
            Self::Biomass(biomass) => biomass.total_kilograms(),
            Self::Abundance(abundance) => abundance.total_kilograms(global),
        }
    }

    /// Merge another biology of the *same representation* into this one.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::IncompatibleBiology`] when the
    /// representations differ, or a shape error from the abundance merge.
    pub fn merge(&mut self, other: &Self, global: &GlobalBiology) -> Result<(), BiologyError> {
        match (self, other) {
            (Self::Biomass(mine), Self::Biomass(theirs)) => {
                for id in global.ids() {
                    mine.add(id, theirs.kilograms_of(id));
                }
                Ok(())
            }
            (Self::Abundance(mine), Self::Abundance(theirs)) => {
                for id in global.ids() {
                    if let Some(matrix) = theirs.matrix_of(id) {
                        mine.add(id, matrix)?;
                    }
                }
                Ok(())
            }
            _ => Err(BiologyError::IncompatibleBiology {
                context: "merge of biomass and abundance biologies",
            }),
        }
    }

    /// Remove another biology of the same representation from this one,
    /// clamping at zero.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::IncompatibleBiology`] when the
    /// representations differ, or a shape error from the abundance removal.
    pub fn remove_clamped(
        &mut self,
        other: &Self,
        global: &GlobalBiology,
    ) -> Result<(), BiologyError> {
        match (self, other) {
            (Self::Biomass(mine), Self::Biomass(theirs)) => {
                for id in global.ids() {
                    mine.remove_clamped(id, theirs.kilograms_of(id));
                }
                Ok(())
            }
            (Self::Abundance(mine), Self::Abundance(theirs)) => {
                for id in global.ids() {
                    if let Some(matrix) = theirs.matrix_of(id) {
                        mine.remove_clamped(id, matrix)?;
                    }
                }
                Ok(())
            }
            _ => Err(BiologyError::IncompatibleBiology {
                context: "removal across biomass and abundance biologies",
            }),
        }
    }

    /// Remove and return everything held for one species, as a biology of
    /// the same representation containing only that species' quantity.
    ///
    /// Used by release and fishing reactions: the caller decides whether
    /// the extracted quantity goes back to a cell or becomes a catch.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::UnknownSpecies`] for an id outside the
    /// registry.
    pub fn take_species(
        &mut self,
        species: SpeciesId,
        global: &GlobalBiology,
    ) -> Result<Self, BiologyError> {
        global.expect(species)?;
        let mut taken = self.empty_like(global);
        match (self, &mut taken) {
            (Self::Biomass(mine), Self::Biomass(out)) => {
                let kilograms = mine.kilograms_of(species);
                mine.remove_clamped(species, kilograms);
                out.add(species, kilograms);
            }
            (Self::Abundance(mine), Self::Abundance(out)) => {
                if let Some(matrix) = mine.matrix_of(species).cloned() {
                    mine.remove_clamped(species, &matrix)?;
                    out.add(species, &matrix)?;
                }
            }
            // empty_like preserves the representation.
            _ => {
                return Err(BiologyError::IncompatibleBiology {
                    context: "take_species representation drift",
                });
            }
        }
        Ok(taken)
    }

    /// Remove and return everything held, leaving this biology empty.
    pub fn drain(&mut self, global: &GlobalBiology) -> Self {
        let empty = self.empty_like(global);
        core::mem::replace(self, empty)
    }

    /// Mutable access to the biomass form.
    pub const fn as_biomass_mut(&mut self) -> Option<&mut BiomassBiology> {
        match self {
            Self::Biomass(biomass) => Some(biomass),
            Self::Abundance(_) => None,
        }
    }

    /// Mutable access to the abundance form.
    pub const fn as_abundance_mut(&mut self) -> Option<&mut AbundanceBiology> {
        match self {
            Self::Biomass(_) => None,
            Self::Abundance(abundance) => Some(abundance),
        }
    }

    /// Shared access to the abundance form.
    pub const fn as_abundance(&self) -> Option<&AbundanceBiology> {
        match self {
            Self::Biomass(_) => None,
            Self::Abundance(abundance) => Some(abundance),
        }
    }

    /// Shared access to the biomass form.
    pub const fn as_biomass(&self) -> Option<&BiomassBiology> {
        match self {
            Self::Biomass(biomass) => Some(biomass),
            Self::Abundance(_) => None,
        }
    }
}
