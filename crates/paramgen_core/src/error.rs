use std::fmt;

use jiff::civil::Date;

/// Errors raised while turning a parameter definition into a generator.
///
/// These are fatal: the caller decides whether to abort the run. Every variant
/// that can be traced back to a single parameter carries its name.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The statistical module identifier is not one we can sample from
    UnknownModule { name: String, module: String },
    /// The distribution function is not part of the registry
    UnknownDistribution { name: String, distribution: String },
    /// No module/distribution pair was given but a static draw was requested
    MissingDistribution { name: String },
    /// A distribution parameter could not be used as given
    InvalidDistributionParameters {
        name: String,
        distribution: &'static str,
        reason: String,
    },
    MissingRefDate { name: String },
    MissingRefValue { name: String },
    /// Anything other than `exp` or `interp`
    UnknownGrowthType { name: String, growth_type: String },
    /// A required growth field (e.g. `growth_factor`) is absent
    MissingField { name: String, field: &'static str },
    /// A field holds per-group values but no group was selected, or the group is missing
    MissingGroupValue {
        name: String,
        field: &'static str,
        group: Option<String>,
    },
    UnknownInterpolationKind { name: String, kind: String },
    /// Interpolation key points are not a JSON object of two `YYYY-MM-DD` dates
    InvalidKeyPoints { name: String, reason: String },
    /// Series generation requested without a time axis
    MissingTimeAxis { name: String },
    /// Grouped generation requested without group labels
    MissingGroupings { name: String },
    /// The time axis is not month-start spaced by exactly one month
    NonMonthlyTimeAxis { index: usize, date: Date },
    EmptyTimeAxis,
    DuplicateDefinition { name: String, scenario: String },
    DuplicateGroup {
        name: String,
        scenario: String,
        group: String,
    },
    /// Per-group cells do not share one group set across the loaded rows
    InconsistentGroups {
        name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// A cell that must be numeric could not be coerced
    NotANumber {
        name: String,
        field: String,
        value: String,
    },
    InvalidDate {
        name: String,
        field: String,
        value: String,
    },
    /// A definition row failed schema-level deserialization
    InvalidDefinition { name: String, reason: String },
    UnsupportedSchemaVersion(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownModule { name, module } => {
                write!(f, "unknown distribution module <{module}> for variable {name}")
            }
            ConfigError::UnknownDistribution { name, distribution } => {
                write!(
                    f,
                    "unknown distribution function <{distribution}> for variable {name}"
                )
            }
            ConfigError::MissingDistribution { name } => {
                write!(f, "no distribution configured for variable {name}")
            }
            ConfigError::InvalidDistributionParameters {
                name,
                distribution,
                reason,
            } => write!(
                f,
                "invalid {distribution} parameters for variable {name}: {reason}"
            ),
            ConfigError::MissingRefDate { name } => {
                write!(f, "ref date not set for variable {name}")
            }
            ConfigError::MissingRefValue { name } => {
                write!(f, "ref value not set for variable {name}")
            }
            ConfigError::UnknownGrowthType { name, growth_type } => write!(
                f,
                "unknown variable type <{growth_type}> for variable {name}, must be one of ['exp', 'interp']"
            ),
            ConfigError::MissingField { name, field } => {
                write!(f, "{field} not set for variable {name}")
            }
            ConfigError::MissingGroupValue { name, field, group } => match group {
                Some(group) => write!(f, "{field} for variable {name} has no value for group {group}"),
                None => write!(
                    f,
                    "{field} for variable {name} holds per-group values but no group was selected"
                ),
            },
            ConfigError::UnknownInterpolationKind { name, kind } => write!(
                f,
                "param for variable {name} was {kind}, must be one of ['linear', 'nearest', 'previous', 'next']"
            ),
            ConfigError::InvalidKeyPoints { name, reason } => {
                write!(f, "ref value for interp variable {name} {reason}")
            }
            ConfigError::MissingTimeAxis { name } => {
                write!(f, "time series requested for variable {name} without times")
            }
            ConfigError::MissingGroupings { name } => {
                write!(f, "group variable {name} sampled without groupings")
            }
            ConfigError::NonMonthlyTimeAxis { index, date } => write!(
                f,
                "time index must have monthly frequency (entry {index} is {date})"
            ),
            ConfigError::EmptyTimeAxis => write!(f, "time index is empty"),
            ConfigError::DuplicateDefinition { name, scenario } => write!(
                f,
                "duplicate entry for parameter with name <{name}> and <{scenario}> scenario"
            ),
            ConfigError::DuplicateGroup {
                name,
                scenario,
                group,
            } => write!(
                f,
                "duplicate entry for parameter with name <{name}>, <{scenario}> scenario and <{group}> group"
            ),
            ConfigError::InconsistentGroups {
                name,
                expected,
                found,
            } => write!(
                f,
                "Expected values for groups: {expected:?}, but got values for groups: {found:?} (variable {name})"
            ),
            ConfigError::NotANumber { name, field, value } => write!(
                f,
                "could not convert value <{value}> for key {field} to number for variable {name}"
            ),
            ConfigError::InvalidDate { name, field, value } => write!(
                f,
                "{value} for key {field} of variable {name} is not a date"
            ),
            ConfigError::InvalidDefinition { name, reason } => {
                write!(f, "invalid definition for variable {name}: {reason}")
            }
            ConfigError::UnsupportedSchemaVersion(v) => {
                write!(f, "unsupported definition schema version {v}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors related to repository lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    ParameterNotFound(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::ParameterNotFound(name) => write!(f, "{name} not found"),
        }
    }
}

impl std::error::Error for LookupError {}

/// Errors raised while drawing a parameter's sample
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingError {
    Config(ConfigError),
}

impl fmt::Display for SamplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingError::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SamplingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SamplingError::Config(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SamplingError {
    fn from(e: ConfigError) -> Self {
        SamplingError::Config(e)
    }
}
