//! Typed parameter definitions
//!
//! A `ParameterDefinition` is one normalized table row: metadata, an optional
//! static distribution (schema version 1) and optional growth fields (schema
//! version 2). Variant-specific required fields are checked when a generator
//! is built from it, not here.

use std::collections::BTreeMap;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::distribution::DistributionParam;
use crate::error::ConfigError;

/// Definition table schema. Selects the default time-series generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SchemaVersion {
    /// distribution + CAGR columns
    V1,
    /// reference value + mean/variability growth columns
    V2,
}

impl TryFrom<u8> for SchemaVersion {
    type Error = ConfigError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(SchemaVersion::V1),
            2 => Ok(SchemaVersion::V2),
            other => Err(ConfigError::UnsupportedSchemaVersion(other)),
        }
    }
}

impl From<SchemaVersion> for u8 {
    fn from(v: SchemaVersion) -> Self {
        match v {
            SchemaVersion::V1 => 1,
            SchemaVersion::V2 => 2,
        }
    }
}

/// A value that is either shared by every group or given per group label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupValue<T> {
    Scalar(T),
    PerGroup(BTreeMap<String, T>),
}

impl<T> GroupValue<T> {
    /// The value for `group`, or the scalar when the value is shared.
    ///
    /// Per-group values require a group; asking without one is a configuration error.
    pub fn resolve(
        &self,
        name: &str,
        field: &'static str,
        group: Option<&str>,
    ) -> Result<&T, ConfigError> {
        match (self, group) {
            (GroupValue::Scalar(v), _) => Ok(v),
            (GroupValue::PerGroup(values), Some(group)) => {
                values
                    .get(group)
                    .ok_or_else(|| ConfigError::MissingGroupValue {
                        name: name.to_string(),
                        field,
                        group: Some(group.to_string()),
                    })
            }
            (GroupValue::PerGroup(_), None) => Err(ConfigError::MissingGroupValue {
                name: name.to_string(),
                field,
                group: None,
            }),
        }
    }

    /// Group labels in sorted order, `None` for a shared value
    pub fn groups(&self) -> Option<Vec<&str>> {
        match self {
            GroupValue::Scalar(_) => None,
            GroupValue::PerGroup(values) => Some(values.keys().map(String::as_str).collect()),
        }
    }
}

impl<T> From<T> for GroupValue<T> {
    fn from(v: T) -> Self {
        GroupValue::Scalar(v)
    }
}

/// A `ref value` cell: a number for `exp` rows, JSON key points for `interp` rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefValue {
    Number(f64),
    Text(String),
}

impl RefValue {
    /// Numeric reference value; text cells are parsed
    pub fn as_number(&self, name: &str) -> Result<f64, ConfigError> {
        match self {
            RefValue::Number(v) => Ok(*v),
            RefValue::Text(text) => {
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::NotANumber {
                        name: name.to_string(),
                        field: "ref value".to_string(),
                        value: text.clone(),
                    })
            }
        }
    }
}

impl From<f64> for RefValue {
    fn from(v: f64) -> Self {
        RefValue::Number(v)
    }
}

impl From<&str> for RefValue {
    fn from(v: &str) -> Self {
        RefValue::Text(v.to_string())
    }
}

/// One normalized parameter definition row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterDefinition {
    pub name: String,
    pub unit: Option<String>,
    pub label: Option<String>,
    pub comment: Option<String>,
    pub source: Option<String>,
    /// Comma-separated tag list
    pub tags: Option<String>,
    /// Comma-separated scenario list; empty means the default scenario
    pub source_scenarios_string: Option<String>,
    pub version: Option<SchemaVersion>,

    // === Static distribution (schema version 1) ===
    pub module_name: Option<String>,
    pub distribution_name: Option<String>,
    pub param_a: Option<DistributionParam>,
    pub param_b: Option<DistributionParam>,
    pub param_c: Option<DistributionParam>,
    pub cagr: Option<f64>,

    // === Growth trajectory (schema version 2) ===
    pub ref_date: Option<Date>,
    /// `exp` or `interp`
    #[serde(rename = "type")]
    pub growth_type: Option<String>,
    /// Interpolation kind for `interp` rows
    #[serde(rename = "param")]
    pub interpolation: Option<String>,
    #[serde(rename = "ref value")]
    pub ref_value: Option<GroupValue<RefValue>>,
    pub growth_factor: Option<GroupValue<f64>>,
    pub ef_growth_factor: Option<GroupValue<f64>>,
    pub initial_value_proportional_variation: Option<GroupValue<f64>>,
}

impl ParameterDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    #[must_use]
    pub fn scenarios(mut self, scenarios: impl Into<String>) -> Self {
        self.source_scenarios_string = Some(scenarios.into());
        self
    }

    #[must_use]
    pub fn version(mut self, version: SchemaVersion) -> Self {
        self.version = Some(version);
        self
    }

    // =========================================================================
    // Static distribution
    // =========================================================================

    /// e.g. `.distribution("numpy.random", "normal")`
    #[must_use]
    pub fn distribution(mut self, module: impl Into<String>, function: impl Into<String>) -> Self {
        self.module_name = Some(module.into());
        self.distribution_name = Some(function.into());
        self
    }

    #[must_use]
    pub fn params(
        mut self,
        a: impl Into<DistributionParam>,
        b: Option<DistributionParam>,
        c: Option<DistributionParam>,
    ) -> Self {
        self.param_a = Some(a.into());
        self.param_b = b;
        self.param_c = c;
        self
    }

    #[must_use]
    pub fn cagr(mut self, cagr: f64) -> Self {
        self.cagr = Some(cagr);
        self
    }

    // =========================================================================
    // Growth trajectory
    // =========================================================================

    #[must_use]
    pub fn ref_date(mut self, date: Date) -> Self {
        self.ref_date = Some(date);
        self
    }

    #[must_use]
    pub fn growth_type(mut self, growth_type: impl Into<String>) -> Self {
        self.growth_type = Some(growth_type.into());
        self
    }

    #[must_use]
    pub fn interpolation(mut self, kind: impl Into<String>) -> Self {
        self.interpolation = Some(kind.into());
        self
    }

    #[must_use]
    pub fn ref_value(mut self, value: impl Into<GroupValue<RefValue>>) -> Self {
        self.ref_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn growth_factor(mut self, value: impl Into<GroupValue<f64>>) -> Self {
        self.growth_factor = Some(value.into());
        self
    }

    #[must_use]
    pub fn ef_growth_factor(mut self, value: impl Into<GroupValue<f64>>) -> Self {
        self.ef_growth_factor = Some(value.into());
        self
    }

    #[must_use]
    pub fn variation(mut self, value: impl Into<GroupValue<f64>>) -> Self {
        self.initial_value_proportional_variation = Some(value.into());
        self
    }

    /// Scenario names declared by this row, `["default"]` when none are
    pub fn scenario_names(&self) -> Vec<String> {
        match self.source_scenarios_string.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s
                .split(',')
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty())
                .collect(),
            _ => vec![crate::DEFAULT_SCENARIO.to_string()],
        }
    }

    /// Tags declared by this row
    pub fn tag_names(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|t| {
                t.split(',')
                    .map(|i| i.trim().to_string())
                    .filter(|i| !i.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<f64> for GroupValue<RefValue> {
    fn from(v: f64) -> Self {
        GroupValue::Scalar(RefValue::Number(v))
    }
}

impl From<&str> for GroupValue<RefValue> {
    fn from(v: &str) -> Self {
        GroupValue::Scalar(RefValue::Text(v.to_string()))
    }
}

impl<const N: usize> From<[(&str, f64); N]> for GroupValue<RefValue> {
    fn from(values: [(&str, f64); N]) -> Self {
        GroupValue::PerGroup(
            values
                .into_iter()
                .map(|(g, v)| (g.to_string(), RefValue::Number(v)))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, f64); N]> for GroupValue<f64> {
    fn from(values: [(&str, f64); N]) -> Self {
        GroupValue::PerGroup(values.into_iter().map(|(g, v)| (g.to_string(), v)).collect())
    }
}
