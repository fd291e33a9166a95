//! Sample series produced by the time-series generators.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Unit tag attached to a series when unit tracking is enabled
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Dimensionless,
    Named(String),
}

impl Unit {
    /// The declared unit, or dimensionless when none was given
    #[must_use]
    pub fn from_declared(unit: Option<&str>) -> Self {
        match unit.map(str::trim) {
            Some(u) if !u.is_empty() => Unit::Named(u.to_string()),
            _ => Unit::Dimensionless,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Dimensionless => write!(f, "dimensionless"),
            Unit::Named(u) => write!(f, "{u}"),
        }
    }
}

/// One entry of a series with its full index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint<'a> {
    pub time: Date,
    pub sample: usize,
    pub group: Option<&'a str>,
    pub value: f64,
}

/// Per time step (and group) statistics across samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStepSummary {
    pub time: Date,
    pub group: Option<String>,
    pub mean: f64,
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}

/// Values indexed by time × sample, or time × sample × group.
///
/// Stored flat with group varying fastest, then sample, then time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSeries {
    name: String,
    times: Vec<Date>,
    samples: usize,
    groups: Option<Vec<String>>,
    values: Vec<f64>,
    unit: Option<Unit>,
}

impl SampleSeries {
    /// Panics if `values` does not match the index shape.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        times: Vec<Date>,
        samples: usize,
        groups: Option<Vec<String>>,
        values: Vec<f64>,
        unit: Option<Unit>,
    ) -> Self {
        let group_count = groups.as_ref().map_or(1, Vec::len);
        assert_eq!(
            values.len(),
            times.len() * samples * group_count,
            "series values do not match index shape"
        );
        Self {
            name: name.into(),
            times,
            samples,
            groups,
            values,
            unit,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn times(&self) -> &[Date] {
        &self.times
    }

    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    #[must_use]
    pub fn groups(&self) -> Option<&[String]> {
        self.groups.as_deref()
    }

    #[must_use]
    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of index levels: 2 for (time, sample), 3 with groups
    #[must_use]
    pub fn index_levels(&self) -> usize {
        if self.groups.is_some() { 3 } else { 2 }
    }

    fn group_count(&self) -> usize {
        self.groups.as_ref().map_or(1, Vec::len)
    }

    /// Value at `(time, sample, group)`; `group` is ignored for ungrouped series
    #[must_use]
    pub fn get(&self, time: usize, sample: usize, group: usize) -> f64 {
        let g = self.group_count();
        let group = if self.groups.is_some() { group } else { 0 };
        self.values[(time * self.samples + sample) * g + group]
    }

    #[must_use]
    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    fn point(&self, flat: usize) -> SeriesPoint<'_> {
        let g = self.group_count();
        let group = flat % g;
        let sample = (flat / g) % self.samples;
        let time = flat / (g * self.samples);
        SeriesPoint {
            time: self.times[time],
            sample,
            group: self.groups.as_ref().map(|labels| labels[group].as_str()),
            value: self.values[flat],
        }
    }

    /// All entries in index order
    pub fn iter(&self) -> impl Iterator<Item = SeriesPoint<'_>> + '_ {
        (0..self.values.len()).map(|i| self.point(i))
    }

    /// Values of one group in (time, sample) order
    #[must_use]
    pub fn group_values(&self, label: &str) -> Option<Vec<f64>> {
        let groups = self.groups.as_ref()?;
        let idx = groups.iter().position(|g| g == label)?;
        let g = groups.len();
        Some(self.values.iter().skip(idx).step_by(g).copied().collect())
    }

    /// Entries below zero, in index order
    pub fn negative_entries(&self) -> impl Iterator<Item = SeriesPoint<'_>> + '_ {
        self.iter().filter(|p| p.value < 0.0)
    }

    /// Mean and P5/P50/P95 across samples for each time step and group
    #[must_use]
    pub fn summarize(&self) -> Vec<TimeStepSummary> {
        let g = self.group_count();
        let mut out = Vec::with_capacity(self.times.len() * g);
        for (t, time) in self.times.iter().enumerate() {
            for group in 0..g {
                let mut column: Vec<f64> =
                    (0..self.samples).map(|s| self.get(t, s, group)).collect();
                column.sort_by(f64::total_cmp);
                let mean = column.iter().sum::<f64>() / column.len().max(1) as f64;
                out.push(TimeStepSummary {
                    time: *time,
                    group: self.groups.as_ref().map(|labels| labels[group].clone()),
                    mean,
                    p5: percentile(&column, 0.05),
                    p50: percentile(&column, 0.50),
                    p95: percentile(&column, 0.95),
                });
            }
        }
        out
    }
}

/// Nearest-rank percentile of sorted values, NaN when empty
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
