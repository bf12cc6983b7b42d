//! Species identity, meristics, and the global species registry.
//!
//! A [`Species`] is immutable after construction: a name, a stable index
//! into every per-species array in the simulation, and a weight-at-bin
//! table (the meristics) sized `[subdivision][bin]`. Subdivisions usually
//! encode sex; bins encode age or length class.
//!
//! [`GlobalBiology`] owns all species. Everything else in the workspace
//! references species by [`SpeciesId`] and borrows from the registry.

use pelagic_types::SpeciesId;
use serde::{Deserialize, Serialize};

use crate::error::BiologyError;

/// Scenario-supplied definition of one species, before id assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDefinition {
    /// Display name ("Skipjack tuna").
    pub name: String,
    /// Weight in kilograms of one fish, per `[subdivision][bin]`.
    pub weight_per_bin: Vec<Vec<f64>>,
}

/// An immutable species: identity plus meristics.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    id: SpeciesId,
    name: String,
    weight_per_bin: Vec<Vec<f64>>,
    bins: usize,
}

impl Species {
    /// Build a species from a definition, validating the meristics table.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::EmptyMatrix`] if the table has no rows or no
    /// columns, [`BiologyError::RaggedMatrix`] if rows differ in length, and
    /// [`BiologyError::InvalidQuantity`] for negative or non-finite weights.
    pub fn new(id: SpeciesId, definition: SpeciesDefinition) -> Result<Self, BiologyError> {
        let bins = validate_rectangular(&definition.weight_per_bin)?;
        for (sub, row) in definition.weight_per_bin.iter().enumerate() {
            for (bin, weight) in row.iter().enumerate() {
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(BiologyError::InvalidQuantity {
                        value: *weight,
                        subdivision: sub,
                        bin,
                    });
                }
            }
        }
        Ok(Self {
            id,
            name: definition.name,
            weight_per_bin: definition.weight_per_bin,
            bins,
        })
    }

    /// Stable index of this species in per-species arrays.
    pub const fn id(&self) -> SpeciesId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of subdivisions (e.g. sexes) in the meristics.
    pub const fn subdivisions(&self) -> usize {
        self.weight_per_bin.len()
    }

    /// Number of age/length bins per subdivision.
    pub const fn bins(&self) -> usize {
        self.bins
    }

    /// Weight in kilograms of one fish of the given subdivision and bin.
    ///
    /// Out-of-range coordinates weigh nothing; shapes are validated at
    /// construction so in-engine callers never hit that branch.
    pub fn weight_at(&self, subdivision: usize, bin: usize) -> f64 {
        self.weight_per_bin
            .get(subdivision)
            .and_then(|row| row.get(bin))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Validate that a matrix is non-empty and rectangular; returns the bin
/// count shared by every row.
pub(crate) fn validate_rectangular(rows: &[Vec<f64>]) -> Result<usize, BiologyError> {
    let first = rows.first().ok_or(BiologyError::EmptyMatrix)?;
    let bins = first.len();
    if bins == 0 {
        return Err(BiologyError::EmptyMatrix);
    }
    for (row, entries) in rows.iter().enumerate() {
        if entries.len() != bins {
            return Err(BiologyError::RaggedMatrix {
                row,
                row_bins: entries.len(),
                expected_bins: bins,
            });
        }
    }
    Ok(bins)
}

/// Ordered registry of every species in the simulation.
///
/// Species indices are stable for the lifetime of a run; iteration always
/// happens in index order, which keeps every downstream RNG call sequence
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalBiology {
    species: Vec<Species>,
}

impl GlobalBiology {
    /// Build the registry, assigning ids in definition order.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::EmptyMatrix`] if no species are defined, or
    /// any meristics validation error from [`Species::new`].
    pub fn new(definitions: Vec<SpeciesDefinition>) -> Result<Self, BiologyError> {
        if definitions.is_empty() {
            return Err(BiologyError::EmptyMatrix);
        }
        let mut species = Vec::with_capacity(definitions.len());
        for (index, definition) in definitions.into_iter().enumerate() {
            let id = SpeciesId::new(u32::try_from(index).unwrap_or(u32::MAX));
            species.push(Species::new(id, definition)?);
        }
        Ok(Self { species })
    }

    /// Number of species in the registry.
    pub const fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Look up a species by id.
    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(id.index())
    }

    /// Look up a species by id, treating absence as a caller bug.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::UnknownSpecies`] for an id outside the
    /// registry.
    pub fn expect(&self, id: SpeciesId) -> Result<&Species, BiologyError> {
        self.get(id).ok_or(BiologyError::UnknownSpecies(id))
    }

    /// Iterate species in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }

    /// Iterate species ids in index order.
    pub fn ids(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.species.iter().map(Species::id)
    }

    /// Check that a per-species table covers exactly this registry.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::SpeciesCountMismatch`] on a length mismatch.
    pub fn check_table_len(&self, len: usize) -> Result<(), BiologyError> {
        if len == self.species.len() {
            Ok(())
        } else {
            Err(BiologyError::SpeciesCountMismatch {
                expected: self.species.len(),
                actual: len,
            })
        }
    }
}
