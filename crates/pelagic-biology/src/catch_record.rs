//! Catch records emitted by fishing reactions.
//!
//! A [`Catch`] is the species-indexed quantity a fishing action landed:
//! kilograms per species, plus the structured abundance that was removed
//! when the source biology was size-structured. Downstream collaborators
//! (stock feedback, reporting) consume these records; the engine only
//! produces them.

use serde::{Deserialize, Serialize};

use crate::abundance::AbundanceMatrix;
use crate::local::LocalBiology;
use crate::species::GlobalBiology;
use pelagic_types::SpeciesId;

/// Species-indexed landed quantities from one fishing action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catch {
    /// Kilograms landed per species, indexed by species.
    kilograms: Vec<f64>,
    /// Structured abundance removed per species, when the source biology
    /// was size-structured.
    abundance: Option<Vec<AbundanceMatrix>>,
}

impl Catch {
    /// An empty catch covering every species in the registry.
    pub fn empty(global: &GlobalBiology) -> Self {
        Self {
            kilograms: vec![0.0; global.species_count()],
            abundance: None,
        }
    }

    /// Snapshot a biology into a catch record (does not mutate the source).
    pub fn from_biology(biology: &LocalBiology, global: &GlobalBiology) -> Self {
        let kilograms = global
            .ids()
            .map(|id| biology.kilograms_of(id, global))
            .collect();
        let abundance = biology.as_abundance().map(|abundance| {
            global
                .iter()
                .map(|species| {
                    abundance
                        .matrix_of(species.id())
                        .cloned()
                        .unwrap_or_else(|| AbundanceMatrix::zeros_for(species))
                })
                .collect()
        });
        Self {
            kilograms,
            abundance,
        }
    }

    /// Kilograms landed for one species.
    pub fn kilograms_of(&self, species: SpeciesId) -> f64 {
        self.kilograms.get(species.index()).copied().unwrap_or(0.0)
    }

    /// Total kilograms landed across species.
    pub fn total_kilograms(&self) -> f64 {
        self.kilograms.iter().sum()
    }

    /// Structured abundance removed for one species, if recorded.
    pub fn abundance_of(&self, species: SpeciesId) -> Option<&AbundanceMatrix> {
        self.abundance.as_ref()?.get(species.index())
    }

    /// Whether nothing was landed.
    pub fn is_empty(&self) -> bool {
        self.total_kilograms() < f64::EPSILON
    }
}
