//! Time-series generators.
//!
//! One generator type covers both growth policies. The policy is picked once
//! from the definition's schema version and every variant-specific field is
//! resolved and validated up front, so [`TimeSeriesGenerator::generate`]
//! cannot fail.
//!
//! Ungrouped generation runs as a single internal group labelled
//! [`DEFAULT_GROUP`]; the label is dropped from the output.

use jiff::civil::Date;
use rand::Rng;
use rand::distr::Distribution as _;
use rand_distr::Triangular;

use crate::date_math::truncate_to_month_start;
use crate::distribution::DistributionSampler;
use crate::error::ConfigError;
use crate::growth::growth_coefficients;
use crate::interpolation::{InterpolationKind, KeyPoints};
use crate::model::{GroupValue, ParameterDefinition, RefValue, SamplingSettings, SchemaVersion};
use crate::series::{SampleSeries, Unit};
use crate::time_axis::TimeAxis;

/// Internal label of the single group used for ungrouped generation
pub const DEFAULT_GROUP: &str = "__default__";

/// Shape of the mean trajectory in mean/variance growth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trajectory {
    /// Reference value compounded by `growth_factor`
    Exp,
    /// Interpolated between two dated key points
    Interp(InterpolationKind),
}

impl Trajectory {
    fn parse(definition: &ParameterDefinition) -> Result<Self, ConfigError> {
        let name = &definition.name;
        match definition.growth_type.as_deref().map(str::trim) {
            Some("exp") => Ok(Trajectory::Exp),
            Some("interp") => Ok(Trajectory::Interp(InterpolationKind::parse(
                name,
                definition.interpolation.as_deref(),
            )?)),
            Some(other) => Err(ConfigError::UnknownGrowthType {
                name: name.clone(),
                growth_type: other.to_string(),
            }),
            None => Err(ConfigError::MissingField {
                name: name.clone(),
                field: "type",
            }),
        }
    }
}

#[derive(Debug, Clone)]
enum MeanSpec {
    Exp { ref_value: f64, growth_factor: f64 },
    Interp {
        points: KeyPoints,
        kind: InterpolationKind,
    },
}

/// Resolved growth fields for one group
#[derive(Debug, Clone)]
pub struct GroupTrack {
    label: String,
    mean: MeanSpec,
    /// Half-width of the triangular uncertainty band
    variability: f64,
    band: Option<Triangular<f64>>,
    ef_growth_factor: f64,
}

impl GroupTrack {
    fn resolve(
        definition: &ParameterDefinition,
        trajectory: Trajectory,
        label: &str,
        group: Option<&str>,
        sample_mean_value: bool,
    ) -> Result<Self, ConfigError> {
        let name = &definition.name;
        let ref_value = definition
            .ref_value
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRefValue { name: name.clone() })?
            .resolve(name, "ref value", group)?;

        let mean = match trajectory {
            Trajectory::Exp => MeanSpec::Exp {
                ref_value: ref_value.as_number(name)?,
                growth_factor: *resolve_f64(
                    definition,
                    definition.growth_factor.as_ref(),
                    "growth_factor",
                    group,
                )?,
            },
            Trajectory::Interp(kind) => match ref_value {
                RefValue::Text(text) => MeanSpec::Interp {
                    points: KeyPoints::parse(name, text)?,
                    kind,
                },
                RefValue::Number(v) => {
                    return Err(ConfigError::InvalidKeyPoints {
                        name: name.clone(),
                        reason: format!("expected JSON key points, got the number {v}"),
                    });
                }
            },
        };

        let ef_growth_factor = *resolve_f64(
            definition,
            definition.ef_growth_factor.as_ref(),
            "ef_growth_factor",
            group,
        )?;

        let (variability, band) = if sample_mean_value {
            (0.0, None)
        } else {
            let variation = *resolve_f64(
                definition,
                definition.initial_value_proportional_variation.as_ref(),
                "initial_value_proportional_variation",
                group,
            )?;
            let initial = match &mean {
                MeanSpec::Exp { ref_value, .. } => *ref_value,
                MeanSpec::Interp { points, .. } => points.initial_value(),
            };
            // Negative half-widths are rejected by `Triangular::new`
            let variability = initial * variation;
            tracing::debug!(
                "sampling random distribution with parameters -{variability}, 0, {variability}"
            );
            let band = if variability != 0.0 {
                Some(Triangular::new(-variability, variability, 0.0).map_err(|e| {
                    ConfigError::InvalidDistributionParameters {
                        name: name.clone(),
                        distribution: "triangular",
                        reason: e.to_string(),
                    }
                })?)
            } else {
                None
            };
            (variability, band)
        };

        Ok(Self {
            label: label.to_string(),
            mean,
            variability,
            band,
            ef_growth_factor,
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn variability(&self) -> f64 {
        self.variability
    }

    #[must_use]
    pub fn ef_growth_factor(&self) -> f64 {
        self.ef_growth_factor
    }
}

fn resolve_f64<'a>(
    definition: &'a ParameterDefinition,
    value: Option<&'a GroupValue<f64>>,
    field: &'static str,
    group: Option<&str>,
) -> Result<&'a f64, ConfigError> {
    value
        .ok_or_else(|| ConfigError::MissingField {
            name: definition.name.clone(),
            field,
        })?
        .resolve(&definition.name, field, group)
}

/// First of the reference date's month, with a warning when that moves the date
fn month_start_ref_date(name: &str, ref_date: Date) -> Date {
    let truncated = truncate_to_month_start(ref_date);
    if truncated != ref_date {
        tracing::warn!("ref date truncated to first of month for variable {name}");
    }
    truncated
}

/// How a series is built from a definition
#[derive(Debug, Clone)]
pub enum GrowthPolicy {
    /// One base draw per cell, scaled by a single CAGR curve
    ConstantUncertaintyExponential {
        sampler: DistributionSampler,
        cagr: f64,
    },
    /// Mean trajectory plus a triangular band growing at its own rate
    MeanVarianceGrowth {
        trajectory: Trajectory,
        tracks: Vec<GroupTrack>,
    },
}

/// Produces a time × sample (× group) series for one parameter
#[derive(Debug, Clone)]
pub struct TimeSeriesGenerator {
    name: String,
    times: TimeAxis,
    samples: usize,
    sample_mean_value: bool,
    ref_date: Date,
    unit: Option<Unit>,
    grouped: bool,
    policy: GrowthPolicy,
}

impl TimeSeriesGenerator {
    /// Schema version 2 selects mean/variance growth, anything else constant uncertainty.
    pub fn from_definition(
        definition: &ParameterDefinition,
        settings: &SamplingSettings,
    ) -> Result<Self, ConfigError> {
        match definition.version {
            Some(SchemaVersion::V2) => Self::mean_variance(definition, settings),
            Some(SchemaVersion::V1) | None => Self::constant_uncertainty(definition, settings),
        }
    }

    fn time_axis(
        definition: &ParameterDefinition,
        settings: &SamplingSettings,
    ) -> Result<TimeAxis, ConfigError> {
        settings
            .times
            .clone()
            .ok_or_else(|| ConfigError::MissingTimeAxis {
                name: definition.name.clone(),
            })
    }

    fn unit(definition: &ParameterDefinition, settings: &SamplingSettings) -> Option<Unit> {
        settings
            .with_units
            .then(|| Unit::from_declared(definition.unit.as_deref()))
    }

    /// Base draw times a CAGR curve. Grouping settings do not apply.
    pub fn constant_uncertainty(
        definition: &ParameterDefinition,
        settings: &SamplingSettings,
    ) -> Result<Self, ConfigError> {
        let times = Self::time_axis(definition, settings)?;
        let sampler = DistributionSampler::from_definition(
            definition,
            settings.sample_size,
            settings.sample_mean_value,
        )?;
        Ok(Self {
            name: definition.name.clone(),
            ref_date: definition
                .ref_date
                .map_or_else(|| times.start(), |d| month_start_ref_date(&definition.name, d)),
            times,
            samples: settings.sample_size,
            sample_mean_value: settings.sample_mean_value,
            unit: Self::unit(definition, settings),
            grouped: false,
            policy: GrowthPolicy::ConstantUncertaintyExponential {
                sampler,
                cagr: definition.cagr.unwrap_or(0.0),
            },
        })
    }

    /// Mean trajectory plus growing uncertainty band, per group when configured.
    pub fn mean_variance(
        definition: &ParameterDefinition,
        settings: &SamplingSettings,
    ) -> Result<Self, ConfigError> {
        let name = &definition.name;
        let times = Self::time_axis(definition, settings)?;
        let ref_date = definition
            .ref_date
            .map(|d| month_start_ref_date(name, d))
            .ok_or_else(|| ConfigError::MissingRefDate { name: name.clone() })?;
        if definition.ref_value.is_none() {
            return Err(ConfigError::MissingRefValue { name: name.clone() });
        }
        let trajectory = Trajectory::parse(definition)?;

        let grouped = settings.is_group_variable(name);
        let tracks = if grouped {
            if settings.groupings.is_empty() {
                return Err(ConfigError::MissingGroupings { name: name.clone() });
            }
            settings
                .groupings
                .iter()
                .map(|g| {
                    GroupTrack::resolve(
                        definition,
                        trajectory,
                        g,
                        Some(g),
                        settings.sample_mean_value,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            vec![GroupTrack::resolve(
                definition,
                trajectory,
                DEFAULT_GROUP,
                None,
                settings.sample_mean_value,
            )?]
        };

        Ok(Self {
            name: name.clone(),
            times,
            samples: settings.sample_size,
            sample_mean_value: settings.sample_mean_value,
            ref_date,
            unit: Self::unit(definition, settings),
            grouped,
            policy: GrowthPolicy::MeanVarianceGrowth { trajectory, tracks },
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn times(&self) -> &TimeAxis {
        &self.times
    }

    #[must_use]
    pub fn ref_date(&self) -> Date {
        self.ref_date
    }

    #[must_use]
    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    /// Group labels of the output, `None` when ungrouped
    #[must_use]
    pub fn groups(&self) -> Option<Vec<String>> {
        match &self.policy {
            GrowthPolicy::MeanVarianceGrowth { tracks, .. } if self.grouped => {
                Some(tracks.iter().map(|t| t.label.clone()).collect())
            }
            _ => None,
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> SampleSeries {
        match &self.policy {
            GrowthPolicy::ConstantUncertaintyExponential { sampler, cagr } => {
                self.generate_constant(rng, sampler, *cagr)
            }
            GrowthPolicy::MeanVarianceGrowth { tracks, .. } => {
                self.generate_mean_variance(rng, tracks)
            }
        }
    }

    fn generate_constant<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        sampler: &DistributionSampler,
        cagr: f64,
    ) -> SampleSeries {
        let t = self.times.len();
        let mut values = sampler.generate(rng, Some(t * self.samples));
        let growth = growth_coefficients(
            self.times.start(),
            self.times.end(),
            self.ref_date,
            cagr,
            self.samples,
        );
        for (v, g) in values.iter_mut().zip(growth.as_slice()) {
            *v *= g;
        }
        SampleSeries::new(
            self.name.clone(),
            self.times.dates().to_vec(),
            self.samples,
            None,
            values,
            self.unit.clone(),
        )
    }

    fn generate_mean_variance<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        tracks: &[GroupTrack],
    ) -> SampleSeries {
        let start = self.times.start();
        let end = self.times.end();
        let t_len = self.times.len();
        let s_len = self.samples;
        let g_len = tracks.len();

        let mut values = vec![0.0; t_len * s_len * g_len];
        for (g, track) in tracks.iter().enumerate() {
            // 1. mu
            let mu = match &track.mean {
                MeanSpec::Exp {
                    ref_value,
                    growth_factor,
                } => growth_coefficients(start, end, self.ref_date, *growth_factor, 1)
                    .into_vec()
                    .into_iter()
                    .map(|a| ref_value * a)
                    .collect::<Vec<_>>(),
                MeanSpec::Interp { points, kind } => points.evaluate_all(*kind, self.times.dates()),
            };

            // 2. sigma, zero in mean-only mode
            let sigma: Vec<f64> = match (&track.band, self.sample_mean_value) {
                (Some(band), false) => (0..t_len * s_len).map(|_| band.sample(rng)).collect(),
                _ => vec![0.0; t_len * s_len],
            };

            // 3. alpha_sigma
            let alpha =
                growth_coefficients(start, end, self.ref_date, track.ef_growth_factor, 1).into_vec();

            // 4. combine
            for t in 0..t_len {
                for s in 0..s_len {
                    values[(t * s_len + s) * g_len + g] = sigma[t * s_len + s] * alpha[t] + mu[t];
                }
            }
        }

        let series = SampleSeries::new(
            self.name.clone(),
            self.times.dates().to_vec(),
            s_len,
            self.groups(),
            values,
            self.unit.clone(),
        );
        warn_on_negatives(&series);
        series
    }
}

/// Log the first negative entry. The series is returned untouched.
fn warn_on_negatives(series: &SampleSeries) {
    if let Some(first) = series.negative_entries().next() {
        tracing::warn!(
            parameter = series.name(),
            time = %first.time,
            "Negative values for parameter {} from {}",
            series.name(),
            first.time
        );
    }
}
