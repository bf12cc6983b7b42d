//! Selectivity curves: per-bin retention multipliers.
//!
//! A selectivity curve says what fraction of each subdivision/bin an
//! attraction model (or gear) actually retains, as a multiplier in
//! `[0, 1]`. Curves are shaped to one species and validated at
//! construction -- a curve that does not match its species' shape is a
//! configuration bug and never reaches the attraction step.

use serde::{Deserialize, Serialize};

use crate::abundance::AbundanceMatrix;
use crate::error::BiologyError;
use crate::species::{Species, validate_rectangular};

/// Per-bin retention multipliers for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectivityCurve {
    values: Vec<Vec<f64>>,
}

impl SelectivityCurve {
    /// Build a curve from an explicit `[subdivision][bin]` table.
    ///
    /// # Errors
    ///
    /// Returns a shape error for malformed tables and
    /// [`BiologyError::InvalidQuantity`] for entries outside `[0, 1]`.
    pub fn from_table(values: Vec<Vec<f64>>) -> Result<Self, BiologyError> {
        validate_rectangular(&values)?;
        for (sub, row) in values.iter().enumerate() {
            for (bin, value) in row.iter().enumerate() {
                if !value.is_finite() || !(0.0..=1.0).contains(value) {
                    return Err(BiologyError::InvalidQuantity {
                        value: *value,
                        subdivision: sub,
                        bin,
                    });
                }
            }
        }
        Ok(Self { values })
    }

    /// Build a logistic curve over bin index, shaped to a species.
    ///
    /// `value = 1 / (1 + exp(-(bin - l50) / slope))` for every
    /// subdivision; `l50` is the bin at which half the fish are retained.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::InvalidQuantity`] if `slope` is not a
    /// finite positive number or `l50` is not finite.
    pub fn logistic(species: &Species, l50: f64, slope: f64) -> Result<Self, BiologyError> {
        if !slope.is_finite() || slope <= 0.0 || !l50.is_finite() {
            return Err(BiologyError::InvalidQuantity {
                value: slope,
                subdivision: 0,
                bin: 0,
            });
        }
        let mut values = Vec::with_capacity(species.subdivisions());
        for _ in 0..species.subdivisions() {
            let mut row = Vec::with_capacity(species.bins());
            let mut bin_index: u32 = 0;
            for _ in 0..species.bins() {
                let bin = f64::from(bin_index);
                row.push(1.0 / (1.0 + (-(bin - l50) / slope).exp()));
                bin_index = bin_index.saturating_add(1);
            }
            values.push(row);
        }
        Ok(Self { values })
    }

    /// A flat curve (every bin fully selected) shaped to a species.
    pub fn flat(species: &Species) -> Self {
        Self {
            values: vec![vec![1.0; species.bins()]; species.subdivisions()],
        }
    }

    /// Multiplier at a subdivision/bin, zero if out of range.
    pub fn at(&self, subdivision: usize, bin: usize) -> f64 {
        self.values
            .get(subdivision)
            .and_then(|row| row.get(bin))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of subdivisions.
    pub const fn subdivisions(&self) -> usize {
        self.values.len()
    }

    /// Number of bins per subdivision.
    pub fn bins(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// Whether this curve matches a species' shape exactly.
    pub fn matches_shape(&self, species: &Species) -> bool {
        self.subdivisions() == species.subdivisions() && self.bins() == species.bins()
    }

    /// Filter an abundance matrix through this curve, entry-wise.
    pub fn filter(&self, abundance: &AbundanceMatrix) -> AbundanceMatrix {
        abundance.map_entries(|sub, bin, count| count * self.at(sub, bin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pelagic_types::SpeciesId;

    use super::*;
    use crate::species::SpeciesDefinition;

    fn species() -> Species {
        Species::new(
            SpeciesId::new(0),
            SpeciesDefinition {
                name: "Skipjack".to_owned(),
                weight_per_bin: vec![vec![0.5, 2.0, 6.0, 12.0]],
            },
        )
        .unwrap()
    }

    #[test]
    fn table_entries_must_be_probabilities() {
        assert!(SelectivityCurve::from_table(vec![vec![0.0, 1.1]]).is_err());
        assert!(SelectivityCurve::from_table(vec![vec![0.0, 1.0]]).is_ok());
    }

    #[test]
    fn logistic_is_monotone_in_bin() {
        let curve = SelectivityCurve::logistic(&species(), 1.5, 0.5).unwrap();
        let mut previous = -1.0;
        for bin in 0..4 {
            let value = curve.at(0, bin);
            assert!(value > previous, "selectivity must rise with bin");
            previous = value;
        }
    }

    #[test]
    fn logistic_half_retention_at_l50() {
        // With l50 = 2.0, bin 2 sits exactly at the inflection point.
        let curve = SelectivityCurve::logistic(&species(), 2.0, 1.0).unwrap();
        assert!((curve.at(0, 2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn logistic_rejects_bad_slope() {
        assert!(SelectivityCurve::logistic(&species(), 2.0, 0.0).is_err());
    }

    #[test]
    fn filter_multiplies_entrywise() {
        let curve = SelectivityCurve::from_table(vec![vec![0.0, 0.5, 1.0, 1.0]]).unwrap();
        let abundance =
            AbundanceMatrix::from_counts(vec![vec![10.0, 10.0, 10.0, 10.0]]).unwrap();
        let filtered = curve.filter(&abundance);
        assert!(filtered.count_at(0, 0).abs() < 1e-12);
        assert!((filtered.count_at(0, 1) - 5.0).abs() < 1e-12);
        assert!((filtered.count_at(0, 3) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn flat_curve_matches_shape() {
        let species = species();
        let curve = SelectivityCurve::flat(&species);
        assert!(curve.matches_shape(&species));
        assert!((curve.at(0, 3) - 1.0).abs() < 1e-12);
    }
}
