//! Parameter sampling engine
//!
//! This crate turns tabular parameter definitions into reproducible random
//! sample generators. It supports:
//! - Static draws from a closed registry of distributions
//! - Monthly time series with constant-uncertainty CAGR growth
//! - Mean/variance growth (exponential or interpolated) with a growing
//!   triangular uncertainty band, optionally stratified by group
//! - Scenario variants with metadata inherited from the default scenario
//! - Single-draw caching per parameter
//!
//! # Example
//!
//! ```ignore
//! use paramgen_core::{ParameterDefinition, ParameterRepository, SamplingSettings, TimeAxis};
//! use jiff::civil::date;
//! use rand::SeedableRng;
//!
//! let mut repo = ParameterRepository::new();
//! repo.register(
//!     ParameterDefinition::new("power_laptop")
//!         .distribution("numpy.random", "triangular")
//!         .params(10.0, Some(15.0.into()), Some(20.0.into()))
//!         .cagr(0.05)
//!         .into(),
//! );
//!
//! let settings = SamplingSettings::new()
//!     .sample_size(100)
//!     .time_series(TimeAxis::monthly(date(2020, 1, 1), date(2025, 1, 1))?);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let value = repo.get("power_laptop", "default")?.invoke(&settings, &mut rng)?;
//! ```

#![warn(clippy::all)]

/// Scenario every parameter falls back to
pub const DEFAULT_SCENARIO: &str = "default";

// ============================================================================
// Core modules
// ============================================================================

pub mod date_math;
pub mod distribution;
pub mod error;
pub mod growth;
pub mod interpolation;
pub mod parameter;
pub mod repository;
pub mod series;
pub mod time_axis;
pub mod timeseries;

// ============================================================================
// Definition and settings modules
// ============================================================================

pub mod loader;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use distribution::{Distribution, DistributionKind, DistributionParam, DistributionSampler};
pub use error::{ConfigError, LookupError, SamplingError};
pub use growth::{Matrix, growth_coefficients};
pub use interpolation::{InterpolationKind, KeyPoints};
pub use loader::{Row, load_definitions, load_parameters};
pub use model::{
    GroupValue, ParameterDefinition, ParameterId, RefValue, SamplingSettings, SchemaVersion,
};
pub use parameter::{Generator, Parameter, ParameterValue};
pub use repository::{ParameterRepository, ParameterScenarioSet};
pub use series::{SampleSeries, SeriesPoint, TimeStepSummary, Unit, percentile};
pub use time_axis::TimeAxis;
pub use timeseries::{GrowthPolicy, TimeSeriesGenerator, Trajectory};
