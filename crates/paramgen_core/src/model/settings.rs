//! Run-time sampling settings passed to `Parameter::invoke`

use serde::{Deserialize, Serialize};

use crate::time_axis::TimeAxis;

fn default_sample_size() -> usize {
    1
}

/// Controls how a parameter is sampled on its first invocation.
///
/// Every field has a default, so a settings file only needs the switches it
/// changes. Later invocations of the same parameter ignore these settings and
/// return the cached draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// Draws per time step (or vector length for static draws)
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Substitute the distribution mean for a genuine draw
    pub sample_mean_value: bool,

    /// Tag output series with the parameter's unit
    #[serde(alias = "with_pint_units")]
    pub with_units: bool,

    /// Select a time-series generator instead of a static draw
    pub use_time_series: bool,

    /// Monthly axis, required when `use_time_series` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times: Option<TimeAxis>,

    /// Enable group-stratified generation for `group_vars`
    pub with_group: bool,
    pub group_vars: Vec<String>,
    /// Ordered group labels
    pub groupings: Vec<String>,

    /// Seed for callers that build their own RNG; the engine never reads it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            sample_mean_value: false,
            with_units: false,
            use_time_series: false,
            times: None,
            with_group: false,
            group_vars: Vec::new(),
            groupings: Vec::new(),
            seed: None,
        }
    }
}

impl SamplingSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sample_size(mut self, n: usize) -> Self {
        self.sample_size = n;
        self
    }

    #[must_use]
    pub fn mean_only(mut self) -> Self {
        self.sample_mean_value = true;
        self
    }

    #[must_use]
    pub fn with_units(mut self) -> Self {
        self.with_units = true;
        self
    }

    /// Switch to time-series generation over `times`
    #[must_use]
    pub fn time_series(mut self, times: TimeAxis) -> Self {
        self.use_time_series = true;
        self.times = Some(times);
        self
    }

    /// Enable grouping for the named variables over the ordered labels
    #[must_use]
    pub fn grouped<S: Into<String>>(
        mut self,
        group_vars: impl IntoIterator<Item = S>,
        groupings: impl IntoIterator<Item = S>,
    ) -> Self {
        self.with_group = true;
        self.group_vars = group_vars.into_iter().map(Into::into).collect();
        self.groupings = groupings.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether `name` is sampled per group under these settings
    #[must_use]
    pub fn is_group_variable(&self, name: &str) -> bool {
        self.with_group && self.group_vars.iter().any(|v| v == name)
    }
}
