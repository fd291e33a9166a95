//! Distribution registry and the static (non time-series) sampler.
//!
//! Definitions name a distribution by a module identifier and a function name,
//! e.g. `numpy.random` / `triangular`. Both are resolved against a closed
//! registry when the sampler is built, so an unknown name fails immediately
//! with a [`ConfigError`] instead of at draw time.

use rand::Rng;
use rand::distr::Distribution as _;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::ParameterDefinition;

/// Module identifiers accepted in definition tables.
///
/// They only select a naming convention; every module maps onto the same
/// registry and numpy's positional argument order.
pub const KNOWN_MODULES: [&str; 5] = ["numpy.random", "numpy", "random", "rand", "rand_distr"];

pub const DEFAULT_MODULE: &str = "numpy.random";

/// A raw distribution parameter cell: a number, or text such as `"3, 4, 5"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistributionParam {
    Number(f64),
    Text(String),
}

impl DistributionParam {
    fn is_unset(&self) -> bool {
        matches!(self, DistributionParam::Text(s) if s.trim().is_empty())
    }
}

impl From<f64> for DistributionParam {
    fn from(v: f64) -> Self {
        DistributionParam::Number(v)
    }
}

impl From<&str> for DistributionParam {
    fn from(v: &str) -> Self {
        DistributionParam::Text(v.to_string())
    }
}

/// Supported distribution functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionKind {
    Normal,
    Uniform,
    Triangular,
    Choice,
    LogNormal,
    Exponential,
    Gamma,
    Beta,
    Poisson,
    Binomial,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 10] = [
        DistributionKind::Normal,
        DistributionKind::Uniform,
        DistributionKind::Triangular,
        DistributionKind::Choice,
        DistributionKind::LogNormal,
        DistributionKind::Exponential,
        DistributionKind::Gamma,
        DistributionKind::Beta,
        DistributionKind::Poisson,
        DistributionKind::Binomial,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DistributionKind::Normal => "normal",
            DistributionKind::Uniform => "uniform",
            DistributionKind::Triangular => "triangular",
            DistributionKind::Choice => "choice",
            DistributionKind::LogNormal => "lognormal",
            DistributionKind::Exponential => "exponential",
            DistributionKind::Gamma => "gamma",
            DistributionKind::Beta => "beta",
            DistributionKind::Poisson => "poisson",
            DistributionKind::Binomial => "binomial",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// A distribution with fully resolved positional parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    Normal { mean: f64, std_dev: f64 },
    Uniform { low: f64, high: f64 },
    /// numpy order: left, mode, right
    Triangular { left: f64, mode: f64, right: f64 },
    Choice { candidates: Vec<f64> },
    LogNormal { mean: f64, sigma: f64 },
    Exponential { scale: f64 },
    Gamma { shape: f64, scale: f64 },
    Beta { alpha: f64, beta: f64 },
    Poisson { lambda: f64 },
    Binomial { trials: u64, probability: f64 },
}

impl Distribution {
    #[must_use]
    pub fn kind(&self) -> DistributionKind {
        match self {
            Distribution::Normal { .. } => DistributionKind::Normal,
            Distribution::Uniform { .. } => DistributionKind::Uniform,
            Distribution::Triangular { .. } => DistributionKind::Triangular,
            Distribution::Choice { .. } => DistributionKind::Choice,
            Distribution::LogNormal { .. } => DistributionKind::LogNormal,
            Distribution::Exponential { .. } => DistributionKind::Exponential,
            Distribution::Gamma { .. } => DistributionKind::Gamma,
            Distribution::Beta { .. } => DistributionKind::Beta,
            Distribution::Poisson { .. } => DistributionKind::Poisson,
            Distribution::Binomial { .. } => DistributionKind::Binomial,
        }
    }

    /// Resolve positional parameters the way numpy's functions take them,
    /// applying numpy's defaults for trailing optional arguments.
    pub fn from_positional(
        name: &str,
        kind: DistributionKind,
        params: &[f64],
    ) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidDistributionParameters {
            name: name.to_string(),
            distribution: kind.name(),
            reason,
        };
        let arity = |min: usize, max: usize| {
            if params.len() < min || params.len() > max {
                Err(invalid(format!(
                    "expected {min} to {max} parameters, got {}",
                    params.len()
                )))
            } else {
                Ok(())
            }
        };
        let at = |i: usize, default: f64| params.get(i).copied().unwrap_or(default);

        let distribution = match kind {
            DistributionKind::Normal => {
                arity(0, 2)?;
                Distribution::Normal {
                    mean: at(0, 0.0),
                    std_dev: at(1, 1.0),
                }
            }
            DistributionKind::Uniform => {
                arity(0, 2)?;
                Distribution::Uniform {
                    low: at(0, 0.0),
                    high: at(1, 1.0),
                }
            }
            DistributionKind::Triangular => {
                arity(3, 3)?;
                Distribution::Triangular {
                    left: params[0],
                    mode: params[1],
                    right: params[2],
                }
            }
            DistributionKind::Choice => {
                if params.is_empty() {
                    return Err(invalid("choice needs at least one candidate".to_string()));
                }
                Distribution::Choice {
                    candidates: params.to_vec(),
                }
            }
            DistributionKind::LogNormal => {
                arity(0, 2)?;
                Distribution::LogNormal {
                    mean: at(0, 0.0),
                    sigma: at(1, 1.0),
                }
            }
            DistributionKind::Exponential => {
                arity(0, 1)?;
                Distribution::Exponential { scale: at(0, 1.0) }
            }
            DistributionKind::Gamma => {
                arity(1, 2)?;
                Distribution::Gamma {
                    shape: params[0],
                    scale: at(1, 1.0),
                }
            }
            DistributionKind::Beta => {
                arity(2, 2)?;
                Distribution::Beta {
                    alpha: params[0],
                    beta: params[1],
                }
            }
            DistributionKind::Poisson => {
                arity(0, 1)?;
                Distribution::Poisson { lambda: at(0, 1.0) }
            }
            DistributionKind::Binomial => {
                arity(2, 2)?;
                if params[0] < 0.0 || params[0].fract() != 0.0 {
                    return Err(invalid(format!(
                        "number of trials must be a non-negative integer, got {}",
                        params[0]
                    )));
                }
                Distribution::Binomial {
                    trials: params[0] as u64,
                    probability: params[1],
                }
            }
        };
        Ok(distribution)
    }

    /// Closed-form mean for normal, uniform, choice and triangular
    #[must_use]
    pub fn analytic_mean(&self) -> Option<f64> {
        match self {
            Distribution::Normal { mean, .. } => Some(*mean),
            Distribution::Uniform { low, high } => Some((low + high) / 2.0),
            Distribution::Choice { candidates } => {
                Some(candidates.iter().sum::<f64>() / candidates.len() as f64)
            }
            Distribution::Triangular { left, mode, right } => Some((left + mode + right) / 3.0),
            _ => None,
        }
    }
}

/// Sampling backend built once from validated parameters
#[derive(Debug, Clone)]
enum Backend {
    Normal(rand_distr::Normal<f64>),
    Uniform { low: f64, high: f64 },
    Triangular(rand_distr::Triangular<f64>),
    Choice(Vec<f64>),
    LogNormal(rand_distr::LogNormal<f64>),
    Exponential(rand_distr::Exp<f64>),
    Gamma(rand_distr::Gamma<f64>),
    Beta(rand_distr::Beta<f64>),
    Poisson(rand_distr::Poisson<f64>),
    Binomial(rand_distr::Binomial),
}

impl Backend {
    fn new(distribution: &Distribution) -> Result<Self, String> {
        let backend = match distribution {
            Distribution::Normal { mean, std_dev } => {
                Backend::Normal(rand_distr::Normal::new(*mean, *std_dev).map_err(|e| e.to_string())?)
            }
            Distribution::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite()) {
                    return Err("bounds must be finite".to_string());
                }
                Backend::Uniform {
                    low: *low,
                    high: *high,
                }
            }
            Distribution::Triangular { left, mode, right } => Backend::Triangular(
                rand_distr::Triangular::new(*left, *right, *mode).map_err(|e| e.to_string())?,
            ),
            Distribution::Choice { candidates } => {
                if !candidates.iter().all(|c| c.is_finite()) {
                    return Err("candidates must be finite".to_string());
                }
                Backend::Choice(candidates.clone())
            }
            Distribution::LogNormal { mean, sigma } => Backend::LogNormal(
                rand_distr::LogNormal::new(*mean, *sigma).map_err(|e| e.to_string())?,
            ),
            Distribution::Exponential { scale } => {
                if !(*scale > 0.0 && scale.is_finite()) {
                    return Err("scale must be positive and finite".to_string());
                }
                Backend::Exponential(rand_distr::Exp::new(1.0 / scale).map_err(|e| e.to_string())?)
            }
            Distribution::Gamma { shape, scale } => {
                Backend::Gamma(rand_distr::Gamma::new(*shape, *scale).map_err(|e| e.to_string())?)
            }
            Distribution::Beta { alpha, beta } => {
                Backend::Beta(rand_distr::Beta::new(*alpha, *beta).map_err(|e| e.to_string())?)
            }
            Distribution::Poisson { lambda } => {
                Backend::Poisson(rand_distr::Poisson::new(*lambda).map_err(|e| e.to_string())?)
            }
            Distribution::Binomial {
                trials,
                probability,
            } => Backend::Binomial(
                rand_distr::Binomial::new(*trials, *probability).map_err(|e| e.to_string())?,
            ),
        };
        Ok(backend)
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<f64> {
        match self {
            Backend::Normal(d) => (0..n).map(|_| d.sample(rng)).collect(),
            Backend::Uniform { low, high } => (0..n)
                .map(|_| low + (high - low) * rng.random::<f64>())
                .collect(),
            Backend::Triangular(d) => (0..n).map(|_| d.sample(rng)).collect(),
            Backend::Choice(candidates) => (0..n)
                .map(|_| candidates[rng.random_range(0..candidates.len())])
                .collect(),
            Backend::LogNormal(d) => (0..n).map(|_| d.sample(rng)).collect(),
            Backend::Exponential(d) => (0..n).map(|_| d.sample(rng)).collect(),
            Backend::Gamma(d) => (0..n).map(|_| d.sample(rng)).collect(),
            Backend::Beta(d) => (0..n).map(|_| d.sample(rng)).collect(),
            Backend::Poisson(d) => (0..n).map(|_| d.sample(rng)).collect(),
            Backend::Binomial(d) => (0..n).map(|_| d.sample(rng) as f64).collect(),
        }
    }
}

/// Draws sample vectors from one named distribution.
///
/// In mean-only mode the draw is replaced by a vector filled with the
/// distribution's mean, keeping the requested size.
#[derive(Debug, Clone)]
pub struct DistributionSampler {
    name: String,
    module: String,
    distribution: Distribution,
    backend: Backend,
    size: usize,
    sample_mean_value: bool,
}

impl DistributionSampler {
    /// Resolve a module/function pair and up to three raw parameters.
    ///
    /// For `choice`, `param_a` may be a comma-separated list of candidates;
    /// otherwise the set parameters are passed positionally, skipping unset ones.
    pub fn new(
        name: &str,
        module: &str,
        distribution: &str,
        params: [Option<&DistributionParam>; 3],
        size: usize,
        sample_mean_value: bool,
    ) -> Result<Self, ConfigError> {
        let module = module.trim();
        if !KNOWN_MODULES.contains(&module) {
            return Err(ConfigError::UnknownModule {
                name: name.to_string(),
                module: module.to_string(),
            });
        }
        let kind =
            DistributionKind::from_name(distribution).ok_or_else(|| {
                ConfigError::UnknownDistribution {
                    name: name.to_string(),
                    distribution: distribution.to_string(),
                }
            })?;

        let positional = match (kind, params[0]) {
            (DistributionKind::Choice, Some(DistributionParam::Text(list))) => {
                parse_list(name, kind, list)?
            }
            _ => params
                .iter()
                .flatten()
                .filter(|p| !p.is_unset())
                .map(|p| param_to_f64(name, kind, p))
                .collect::<Result<Vec<_>, _>>()?,
        };
        tracing::debug!(
            "setting function params for {} distribution of {name}: {positional:?}",
            kind.name()
        );

        let distribution = Distribution::from_positional(name, kind, &positional)?;
        let backend =
            Backend::new(&distribution).map_err(|reason| ConfigError::InvalidDistributionParameters {
                name: name.to_string(),
                distribution: kind.name(),
                reason,
            })?;

        Ok(Self {
            name: name.to_string(),
            module: module.to_string(),
            distribution,
            backend,
            size,
            sample_mean_value,
        })
    }

    /// Build the sampler described by a definition's distribution fields
    pub fn from_definition(
        definition: &ParameterDefinition,
        size: usize,
        sample_mean_value: bool,
    ) -> Result<Self, ConfigError> {
        let Some(distribution) = definition.distribution_name.as_deref() else {
            return Err(ConfigError::MissingDistribution {
                name: definition.name.clone(),
            });
        };
        let module = definition.module_name.as_deref().unwrap_or(DEFAULT_MODULE);
        Self::new(
            &definition.name,
            module,
            distribution,
            [
                definition.param_a.as_ref(),
                definition.param_b.as_ref(),
                definition.param_c.as_ref(),
            ],
            size,
            sample_mean_value,
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn sample_mean_value(&self) -> bool {
        self.sample_mean_value
    }

    /// Analytic mean where one is known, otherwise the mean of one draw of `size` values
    pub fn mean<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if let Some(mean) = self.distribution.analytic_mean() {
            return mean;
        }
        let n = self.size.max(1);
        let draw = self.backend.draw(rng, n);
        draw.iter().sum::<f64>() / n as f64
    }

    /// Draw `size` values, or `size_override` when given
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, size_override: Option<usize>) -> Vec<f64> {
        let size = size_override.unwrap_or(self.size);
        if self.sample_mean_value {
            vec![self.mean(rng); size]
        } else {
            self.backend.draw(rng, size)
        }
    }
}

fn param_to_f64(
    name: &str,
    kind: DistributionKind,
    param: &DistributionParam,
) -> Result<f64, ConfigError> {
    match param {
        DistributionParam::Number(v) => Ok(*v),
        DistributionParam::Text(text) => {
            text.trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidDistributionParameters {
                    name: name.to_string(),
                    distribution: kind.name(),
                    reason: format!("<{text}> is not a number"),
                })
        }
    }
}

fn parse_list(name: &str, kind: DistributionKind, list: &str) -> Result<Vec<f64>, ConfigError> {
    list.split(',')
        .map(|token| param_to_f64(name, kind, &DistributionParam::Text(token.to_string())))
        .collect()
}
