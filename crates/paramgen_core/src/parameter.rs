//! Parameters: named, cached handles around a definition.
//!
//! A parameter is drawn at most once. The first [`Parameter::invoke`] picks a
//! generator from the settings, draws, and stores the result; every later call
//! returns that stored value and ignores its settings. Only
//! [`Parameter::clear_cache`] (usually through the repository) allows a redraw.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use crate::distribution::DistributionSampler;
use crate::error::{ConfigError, SamplingError};
use crate::model::{ParameterDefinition, SamplingSettings, SchemaVersion};
use crate::series::SampleSeries;
use crate::timeseries::TimeSeriesGenerator;

/// Result of sampling a parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Static draw of `sample_size` values
    Sample(Vec<f64>),
    /// Time series draw
    Series(SampleSeries),
}

impl ParameterValue {
    #[must_use]
    pub fn as_sample(&self) -> Option<&[f64]> {
        match self {
            ParameterValue::Sample(v) => Some(v),
            ParameterValue::Series(_) => None,
        }
    }

    #[must_use]
    pub fn as_series(&self) -> Option<&SampleSeries> {
        match self {
            ParameterValue::Series(s) => Some(s),
            ParameterValue::Sample(_) => None,
        }
    }

    /// Every drawn value in index order
    #[must_use]
    pub fn values(&self) -> &[f64] {
        match self {
            ParameterValue::Sample(v) => v,
            ParameterValue::Series(s) => s.values(),
        }
    }
}

/// The generator a parameter uses for its draw
#[derive(Debug, Clone)]
pub enum Generator {
    Static(DistributionSampler),
    TimeSeries(TimeSeriesGenerator),
}

impl Generator {
    /// Time series when `use_time_series` is set (growth policy by schema
    /// version), otherwise a static distribution draw.
    pub fn select(
        definition: &ParameterDefinition,
        settings: &SamplingSettings,
    ) -> Result<Self, ConfigError> {
        if settings.use_time_series {
            Ok(Generator::TimeSeries(TimeSeriesGenerator::from_definition(
                definition, settings,
            )?))
        } else {
            Ok(Generator::Static(DistributionSampler::from_definition(
                definition,
                settings.sample_size,
                settings.sample_mean_value,
            )?))
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> ParameterValue {
        match self {
            Generator::Static(sampler) => ParameterValue::Sample(sampler.generate(rng, None)),
            Generator::TimeSeries(generator) => ParameterValue::Series(generator.generate(rng)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    definition: ParameterDefinition,
    cache: OnceCell<ParameterValue>,
    /// process name -> process variables backed by this parameter
    processes: BTreeMap<String, Vec<String>>,
}

impl Parameter {
    #[must_use]
    pub fn new(definition: ParameterDefinition) -> Self {
        Self {
            definition,
            cache: OnceCell::new(),
            processes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub fn definition(&self) -> &ParameterDefinition {
        &self.definition
    }

    pub(crate) fn definition_mut(&mut self) -> &mut ParameterDefinition {
        &mut self.definition
    }

    #[must_use]
    pub fn version(&self) -> Option<SchemaVersion> {
        self.definition.version
    }

    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.definition.unit.as_deref()
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.definition.label.as_deref()
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.definition.comment.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.definition.source.as_deref()
    }

    #[must_use]
    pub fn tags(&self) -> Option<&str> {
        self.definition.tags.as_deref()
    }

    /// Draw once and cache; later calls return the cached value regardless of `settings`.
    pub fn invoke<R: Rng + ?Sized>(
        &self,
        settings: &SamplingSettings,
        rng: &mut R,
    ) -> Result<&ParameterValue, SamplingError> {
        if let Some(value) = self.cache.get() {
            return Ok(value);
        }
        let generator = Generator::select(&self.definition, settings)?;
        let value = generator.generate(rng);
        Ok(self.cache.get_or_init(|| value))
    }

    /// The cached draw, if any
    #[must_use]
    pub fn cached(&self) -> Option<&ParameterValue> {
        self.cache.get()
    }

    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn clear_cache(&mut self) {
        self.cache.take();
    }

    /// Note that `variable_name` of `process_name` is backed by this parameter.
    pub fn record_usage(&mut self, process_name: impl Into<String>, variable_name: impl Into<String>) {
        self.processes
            .entry(process_name.into())
            .or_default()
            .push(variable_name.into());
    }

    #[must_use]
    pub fn processes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.processes
    }
}

impl From<ParameterDefinition> for Parameter {
    fn from(definition: ParameterDefinition) -> Self {
        Parameter::new(definition)
    }
}
