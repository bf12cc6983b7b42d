//! Structured-abundance matrices: fish counts by subdivision and bin.
//!
//! An [`AbundanceMatrix`] holds non-negative (possibly fractional) counts
//! sized exactly `[subdivisions][bins]` for one species. Counts are `f64`
//! because attraction and selectivity arithmetic routinely produces
//! fractions of a fish; the invariant maintained everywhere is that no
//! entry ever goes negative -- removals clamp to zero.

use serde::{Deserialize, Serialize};

use crate::error::BiologyError;
use crate::species::{Species, validate_rectangular};

/// Non-negative fish counts for one species, by subdivision and bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbundanceMatrix {
    counts: Vec<Vec<f64>>,
}

impl AbundanceMatrix {
    /// A zero matrix shaped to the given species.
    pub fn zeros_for(species: &Species) -> Self {
        Self {
            counts: vec![vec![0.0; species.bins()]; species.subdivisions()],
        }
    }

    /// Build a matrix from raw counts, validating shape and sign.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::EmptyMatrix`] or [`BiologyError::RaggedMatrix`]
    /// for malformed shapes, and [`BiologyError::InvalidQuantity`] for
    /// negative or non-finite entries.
    pub fn from_counts(counts: Vec<Vec<f64>>) -> Result<Self, BiologyError> {
        validate_rectangular(&counts)?;
        for (sub, row) in counts.iter().enumerate() {
            for (bin, count) in row.iter().enumerate() {
                if !count.is_finite() || *count < 0.0 {
                    return Err(BiologyError::InvalidQuantity {
                        value: *count,
                        subdivision: sub,
                        bin,
                    });
                }
            }
        }
        Ok(Self { counts })
    }

    /// Number of subdivisions.
    pub const fn subdivisions(&self) -> usize {
        self.counts.len()
    }

    /// Number of bins per subdivision.
    pub fn bins(&self) -> usize {
        self.counts.first().map_or(0, Vec::len)
    }

    /// Whether this matrix matches a species' shape exactly.
    pub fn matches_shape(&self, species: &Species) -> bool {
        self.subdivisions() == species.subdivisions() && self.bins() == species.bins()
    }

    /// Count at a subdivision/bin, zero if out of range.
    pub fn count_at(&self, subdivision: usize, bin: usize) -> f64 {
        self.counts
            .get(subdivision)
            .and_then(|row| row.get(bin))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum of all counts.
    pub fn total_count(&self) -> f64 {
        self.counts.iter().flatten().sum()
    }

    /// Whether every entry is (numerically) zero.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().flatten().all(|c| c.abs() < f64::EPSILON)
    }

    /// Total weight in kilograms: `sum(count[sub][bin] * weight_at(sub, bin))`.
    pub fn total_weight(&self, species: &Species) -> f64 {
        let mut total = 0.0;
        for (sub, row) in self.counts.iter().enumerate() {
            for (bin, count) in row.iter().enumerate() {
                total += count * species.weight_at(sub, bin);
            }
        }
        total
    }

    /// Add another matrix entry-wise.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::ShapeMismatch`] if the shapes differ.
    pub fn add(&mut self, other: &Self) -> Result<(), BiologyError> {
        self.check_same_shape(other)?;
        for (row, other_row) in self.counts.iter_mut().zip(&other.counts) {
            for (count, delta) in row.iter_mut().zip(other_row) {
                *count += delta;
            }
        }
        Ok(())
    }

    /// Subtract another matrix entry-wise, clamping each result at zero.
    ///
    /// Floating-point rounding can push an entry a hair below zero; the
    /// clamp keeps the non-negativity invariant unconditional.
    ///
    /// # Errors
    ///
    /// Returns [`BiologyError::ShapeMismatch`] if the shapes differ.
    pub fn subtract_clamped(&mut self, other: &Self) -> Result<(), BiologyError> {
        self.check_same_shape(other)?;
        for (row, other_row) in self.counts.iter_mut().zip(&other.counts) {
            for (count, delta) in row.iter_mut().zip(other_row) {
                *count = (*count - delta).max(0.0);
            }
        }
        Ok(())
    }

    /// Multiply every entry by a factor, clamping negatives to zero.
    pub fn scale(&mut self, factor: f64) {
        for row in &mut self.counts {
            for count in row.iter_mut() {
                *count = (*count * factor).max(0.0);
            }
        }
    }

    /// Return a new matrix with every entry transformed by `f(sub, bin,
    /// count)`, clamped at zero.
    pub fn map_entries(&self, mut f: impl FnMut(usize, usize, f64) -> f64) -> Self {
        let counts = self
            .counts
            .iter()
            .enumerate()
            .map(|(sub, row)| {
                row.iter()
                    .enumerate()
                    .map(|(bin, count)| f(sub, bin, *count).max(0.0))
                    .collect()
            })
            .collect();
        Self { counts }
    }

    /// Set every entry to zero, keeping the shape.
    pub fn clear(&mut self) {
        for row in &mut self.counts {
            for count in row.iter_mut() {
                *count = 0.0;
            }
        }
    }

    fn check_same_shape(&self, other: &Self) -> Result<(), BiologyError> {
        if self.subdivisions() == other.subdivisions() && self.bins() == other.bins() {
            Ok(())
        } else {
            Err(BiologyError::ShapeMismatch {
                expected_subdivisions: self.subdivisions(),
                expected_bins: self.bins(),
                actual_subdivisions: other.subdivisions(),
                actual_bins: other.bins(),
            })
        }
    }
}
