//! Monthly time axis shared by every time-series generator.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{add_months, is_month_start, months_between};
use crate::error::ConfigError;

/// An ordered, strictly monthly sequence of month-start dates.
///
/// Construction rejects anything else, so generators can rely on
/// `len() == months_between(first, last) + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimeAxisSpec", into = "TimeAxisSpec")]
pub struct TimeAxis {
    dates: Vec<Date>,
}

/// Serialized forms: an explicit date list or an inclusive month range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeAxisSpec {
    Range { start: Date, end: Date },
    Dates(Vec<Date>),
}

impl TimeAxis {
    /// Validate an explicit list of dates.
    pub fn new(dates: Vec<Date>) -> Result<Self, ConfigError> {
        let Some(first) = dates.first() else {
            return Err(ConfigError::EmptyTimeAxis);
        };
        if !is_month_start(*first) {
            return Err(ConfigError::NonMonthlyTimeAxis {
                index: 0,
                date: *first,
            });
        }
        for (index, pair) in dates.windows(2).enumerate() {
            if !is_month_start(pair[1]) || add_months(pair[0], 1) != pair[1] {
                return Err(ConfigError::NonMonthlyTimeAxis {
                    index: index + 1,
                    date: pair[1],
                });
            }
        }
        Ok(Self { dates })
    }

    /// Every month start from `start` through `end` inclusive. Both bounds
    /// must be the first of a month.
    pub fn monthly(start: Date, end: Date) -> Result<Self, ConfigError> {
        if !is_month_start(start) {
            return Err(ConfigError::NonMonthlyTimeAxis {
                index: 0,
                date: start,
            });
        }
        if end < start {
            return Err(ConfigError::EmptyTimeAxis);
        }
        let steps = months_between(start, end);
        if !is_month_start(end) {
            return Err(ConfigError::NonMonthlyTimeAxis {
                index: steps as usize + 1,
                date: end,
            });
        }
        let dates = (0..=steps).map(|i| add_months(start, i)).collect();
        Ok(Self { dates })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    #[must_use]
    pub fn start(&self) -> Date {
        self.dates[0]
    }

    #[must_use]
    pub fn end(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn iter(&self) -> impl Iterator<Item = Date> + '_ {
        self.dates.iter().copied()
    }
}

impl TryFrom<TimeAxisSpec> for TimeAxis {
    type Error = ConfigError;

    fn try_from(spec: TimeAxisSpec) -> Result<Self, Self::Error> {
        match spec {
            TimeAxisSpec::Range { start, end } => TimeAxis::monthly(start, end),
            TimeAxisSpec::Dates(dates) => TimeAxis::new(dates),
        }
    }
}

impl From<TimeAxis> for TimeAxisSpec {
    fn from(axis: TimeAxis) -> Self {
        TimeAxisSpec::Dates(axis.dates)
    }
}
