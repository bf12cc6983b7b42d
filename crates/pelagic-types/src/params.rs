//! Parameter structs handed to the engine by the scenario-loading layer.
//!
//! The engine never reads configuration files itself; the excluded scenario
//! layer deserializes these structs (hence the serde derives) and passes
//! them in as plain values. Validation here is purely numeric -- per-species
//! vector lengths are checked later, against the global biology, by the
//! constructors that consume them.
//!
//! All quantities are kilograms and days unless noted otherwise.

use serde::{Deserialize, Serialize};

/// Errors produced by parameter validation.
///
/// Bad parameters indicate a scenario-configuration bug and are fatal to
/// construction of whatever component consumes them.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// A numeric field is NaN or infinite.
    #[error("parameter {field} is not finite")]
    NotFinite {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A probability lies outside `[0, 1]`.
    #[error("parameter {field} = {value} is not a probability in [0, 1]")]
    NotAProbability {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A quantity that must be non-negative is negative.
    #[error("parameter {field} = {value} must be non-negative")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A quantity that must be strictly positive is zero or negative.
    #[error("parameter {field} = {value} must be strictly positive")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A duration in days that must be at least one day is zero.
    #[error("parameter {field} must be at least 1 day")]
    ZeroDuration {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A per-species table is empty.
    #[error("per-species parameter table {field} is empty")]
    EmptyTable {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Check that a value is a finite probability in `[0, 1]`.
fn check_probability(field: &'static str, value: f64) -> Result<(), ParamsError> {
    if !value.is_finite() {
        return Err(ParamsError::NotFinite { field });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ParamsError::NotAProbability { field, value });
    }
    Ok(())
}

/// Check that a value is finite and non-negative.
fn check_non_negative(field: &'static str, value: f64) -> Result<(), ParamsError> {
    if !value.is_finite() {
        return Err(ParamsError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ParamsError::Negative { field, value });
    }
    Ok(())
}

/// Check that a value is finite and strictly positive.
fn check_positive(field: &'static str, value: f64) -> Result<(), ParamsError> {
    if !value.is_finite() {
        return Err(ParamsError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ParamsError::NotPositive { field, value });
    }
    Ok(())
}

/// Distribution a device's per-species carrying capacity is drawn from.
///
/// The draw happens once per device per species, lazily, and is memoized
/// for the device's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CapacityDistribution {
    /// Every device gets the same capacity.
    Fixed {
        /// The capacity in kilograms.
        kilograms: f64,
    },
    /// Capacity is Weibull-distributed (the calibrated choice in the
    /// source fishery model; heavier right tail than a fixed cap).
    Weibull {
        /// Weibull shape parameter (k > 0).
        shape: f64,
        /// Weibull scale parameter (lambda > 0, kilograms).
        scale: f64,
    },
}

impl CapacityDistribution {
    /// Validate the distribution parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError`] if the fixed capacity is negative or a
    /// Weibull parameter is not strictly positive.
    pub fn validate(&self) -> Result<(), ParamsError> {
        match *self {
            Self::Fixed { kilograms } => check_non_negative("capacity.kilograms", kilograms),
            Self::Weibull { shape, scale } => {
                check_positive("capacity.shape", shape)?;
                check_positive("capacity.scale", scale)
            }
        }
    }
}

/// Parameters for the linear attraction models (biomass and abundance).
///
/// One attraction rate per species, indexed by species id. A rate of
/// 0.01 means the device pulls 1% of the cell's attractable quantity
/// per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearAttractorParams {
    /// Per-species daily attraction rates, indexed by species.
    pub attraction_rates: Vec<f64>,
}

impl LinearAttractorParams {
    /// Validate the rates (finite, non-negative, at least one species).
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError`] on an empty or invalid table.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.attraction_rates.is_empty() {
            return Err(ParamsError::EmptyTable {
                field: "attraction_rates",
            });
        }
        for rate in &self.attraction_rates {
            check_non_negative("attraction_rates", *rate)?;
        }
        Ok(())
    }
}

/// Calibrated coefficients of the compressed-exponential attraction
/// probability for one species.
///
/// The daily probability that the species attracts at all is
/// `1 - exp(-(b0 * B + b1 * B * F)^power)` where `B` is the attractable
/// cell biomass and `F` the biomass already on the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressedExponentialCoefficients {
    /// Weight of the cell biomass term.
    pub b0: f64,
    /// Weight of the cell-biomass x device-biomass interaction term.
    pub b1: f64,
    /// Compression exponent applied to the linear combination.
    pub power: f64,
}

/// Parameters for the compressed-exponential (logistic-gated) attractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedExponentialParams {
    /// Per-species probability coefficients, indexed by species.
    pub coefficients: Vec<CompressedExponentialCoefficients>,
    /// Per-species transfer rates applied when the daily draw wins.
    pub attraction_rates: Vec<f64>,
}

impl CompressedExponentialParams {
    /// Validate coefficients and rates.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError`] on empty tables or non-finite/negative
    /// values.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.coefficients.is_empty() {
            return Err(ParamsError::EmptyTable {
                field: "coefficients",
            });
        }
        for c in &self.coefficients {
            check_non_negative("coefficients.b0", c.b0)?;
            check_non_negative("coefficients.b1", c.b1)?;
            check_positive("coefficients.power", c.power)?;
        }
        if self.attraction_rates.is_empty() {
            return Err(ParamsError::EmptyTable {
                field: "attraction_rates",
            });
        }
        for rate in &self.attraction_rates {
            check_non_negative("attraction_rates", *rate)?;
        }
        Ok(())
    }
}

/// Parameters for the interval (catchability-selectivity) attractors and
/// the last-moment variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalAttractorParams {
    /// Per-species catchability coefficients, indexed by species.
    pub catchability: Vec<f64>,
    /// Per-species carrying-capacity distributions, indexed by species.
    pub capacity: Vec<CapacityDistribution>,
    /// Days it takes a device to fill to capacity at the daily target rate.
    pub days_it_takes_to_fill_up: u64,
}

impl IntervalAttractorParams {
    /// Validate catchabilities, capacity distributions, and the fill-up
    /// duration.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError`] on empty tables, invalid distributions, or
    /// a zero fill-up duration.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.catchability.is_empty() {
            return Err(ParamsError::EmptyTable {
                field: "catchability",
            });
        }
        for q in &self.catchability {
            check_non_negative("catchability", *q)?;
        }
        if self.capacity.is_empty() {
            return Err(ParamsError::EmptyTable { field: "capacity" });
        }
        for dist in &self.capacity {
            dist.validate()?;
        }
        if self.days_it_takes_to_fill_up == 0 {
            return Err(ParamsError::ZeroDuration {
                field: "days_it_takes_to_fill_up",
            });
        }
        Ok(())
    }
}

/// Initialization parameters for newly deployed devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FadInitializerParams {
    /// Per-species daily probability of releasing held fish, indexed by
    /// species.
    pub fish_release_probability: Vec<f64>,
    /// Probability that a device is a dud (never attracts) from birth.
    pub dud_probability: f64,
    /// Days after deployment at which the device irreversibly turns off,
    /// if configured.
    pub days_before_turning_off: Option<u64>,
    /// Days a device must soak before it can start attracting.
    pub days_in_water_before_attraction: u64,
    /// Length of the attraction window after it opens, if bounded.
    pub maximum_attraction_days: Option<u64>,
}

impl FadInitializerParams {
    /// Validate the probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError`] if a probability is outside `[0, 1]` or the
    /// release table is empty.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.fish_release_probability.is_empty() {
            return Err(ParamsError::EmptyTable {
                field: "fish_release_probability",
            });
        }
        for p in &self.fish_release_probability {
            check_probability("fish_release_probability", *p)?;
        }
        check_probability("dud_probability", self.dud_probability)
    }
}
