//! Mean trajectories interpolated between two dated key points.
//!
//! `interp` rows carry their key points as a JSON object in the `ref value`
//! cell, e.g. `{"2020-01-01": 10, "2030-01-01": 25}`. Positions are measured
//! in days, so a month contributes in proportion to its length.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::fast_days_between;
use crate::error::ConfigError;

/// How values between (and beyond) the key points are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationKind {
    /// Straight line through both points, extended past either end
    #[default]
    Linear,
    Nearest,
    /// Value of the latest key point at or before the date
    Previous,
    /// Value of the earliest key point at or after the date
    Next,
}

impl InterpolationKind {
    pub const ALL: [InterpolationKind; 4] = [
        InterpolationKind::Linear,
        InterpolationKind::Nearest,
        InterpolationKind::Previous,
        InterpolationKind::Next,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            InterpolationKind::Linear => "linear",
            InterpolationKind::Nearest => "nearest",
            InterpolationKind::Previous => "previous",
            InterpolationKind::Next => "next",
        }
    }

    /// Parse a `param` cell. Blank means linear.
    pub fn parse(name: &str, kind: Option<&str>) -> Result<Self, ConfigError> {
        let kind = kind.map(str::trim).unwrap_or_default();
        if kind.is_empty() {
            return Ok(InterpolationKind::Linear);
        }
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(kind))
            .ok_or_else(|| ConfigError::UnknownInterpolationKind {
                name: name.to_string(),
                kind: kind.to_string(),
            })
    }
}

/// Two key points sorted by date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoints {
    first: (Date, f64),
    second: (Date, f64),
}

impl KeyPoints {
    /// Parse the JSON text of an `interp` reference value.
    pub fn parse(name: &str, text: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidKeyPoints {
            name: name.to_string(),
            reason,
        };

        let value: serde_json::Value =
            serde_json::from_str(text.trim()).map_err(|e| invalid(e.to_string()))?;
        let Some(object) = value.as_object() else {
            return Err(invalid(format!("expected a JSON object, got <{text}>")));
        };
        if object.len() != 2 {
            return Err(invalid(format!(
                "expected exactly two key points, got {}",
                object.len()
            )));
        }

        let mut points = Vec::with_capacity(2);
        for (key, v) in object {
            let date = key
                .parse::<Date>()
                .ok()
                .filter(|_| key.len() == 10)
                .ok_or_else(|| invalid(format!("<{key}> is not a YYYY-MM-DD date")))?;
            let value = v
                .as_f64()
                .ok_or_else(|| invalid(format!("value for {key} is not a number")))?;
            points.push((date, value));
        }
        points.sort_by_key(|(date, _)| *date);

        if points[0].0 == points[1].0 {
            return Err(invalid("key point dates must differ".to_string()));
        }
        Ok(Self {
            first: points[0],
            second: points[1],
        })
    }

    /// Value of the earliest key point
    #[must_use]
    pub fn initial_value(&self) -> f64 {
        self.first.1
    }

    #[must_use]
    pub fn points(&self) -> [(Date, f64); 2] {
        [self.first, self.second]
    }

    /// Evaluate at `date`, extrapolating outside the key points
    #[must_use]
    pub fn evaluate(&self, kind: InterpolationKind, date: Date) -> f64 {
        let (d0, y0) = self.first;
        let (d1, y1) = self.second;
        let span = f64::from(fast_days_between(d0, d1));
        let x = f64::from(fast_days_between(d0, date));

        match kind {
            InterpolationKind::Linear => y0 + (y1 - y0) * x / span,
            InterpolationKind::Nearest => {
                if x <= span / 2.0 {
                    y0
                } else {
                    y1
                }
            }
            InterpolationKind::Previous => {
                if x < span {
                    y0
                } else {
                    y1
                }
            }
            InterpolationKind::Next => {
                if x <= 0.0 {
                    y0
                } else {
                    y1
                }
            }
        }
    }

    /// Evaluate at every date of an axis
    pub fn evaluate_all(&self, kind: InterpolationKind, dates: &[Date]) -> Vec<f64> {
        dates.iter().map(|d| self.evaluate(kind, *d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn points() -> KeyPoints {
        KeyPoints::parse("p", r#"{"2021-01-01": 20, "2020-01-01": 10}"#).unwrap()
    }

    #[test]
    fn test_parse_sorts_by_date() {
        let kp = points();
        assert_eq!(kp.initial_value(), 10.0);
        assert_eq!(kp.points()[1], (date(2021, 1, 1), 20.0));
    }

    #[test]
    fn test_linear_and_extrapolation() {
        let kp = points();
        let k = InterpolationKind::Linear;
        assert_eq!(kp.evaluate(k, date(2020, 1, 1)), 10.0);
        assert_eq!(kp.evaluate(k, date(2021, 1, 1)), 20.0);
        // 2020 is a leap year: 366 days between the anchors
        let mid = kp.evaluate(k, date(2020, 7, 2));
        assert!((mid - (10.0 + 10.0 * 183.0 / 366.0)).abs() < 1e-12);
        assert!(kp.evaluate(k, date(2022, 1, 1)) > 29.9);
        assert!(kp.evaluate(k, date(2019, 1, 1)) < 0.1);
    }

    #[test]
    fn test_step_kinds() {
        let kp = points();
        let d = date(2020, 3, 1);
        assert_eq!(kp.evaluate(InterpolationKind::Previous, d), 10.0);
        assert_eq!(kp.evaluate(InterpolationKind::Next, d), 20.0);
        assert_eq!(kp.evaluate(InterpolationKind::Nearest, d), 10.0);
        assert_eq!(kp.evaluate(InterpolationKind::Nearest, date(2020, 11, 1)), 20.0);
        assert_eq!(kp.evaluate(InterpolationKind::Previous, date(2025, 1, 1)), 20.0);
        assert_eq!(kp.evaluate(InterpolationKind::Next, date(2015, 1, 1)), 10.0);
    }

    #[test]
    fn test_rejects_malformed_key_points() {
        for text in [
            "not json",
            "[1, 2]",
            r#"{"2020-01-01": 1}"#,
            r#"{"2020-01-01": 1, "2021-01-01": 2, "2022-01-01": 3}"#,
            r#"{"2020/01/01": 1, "2021-01-01": 2}"#,
            r#"{"2020-01-01": "a", "2021-01-01": 2}"#,
        ] {
            let err = KeyPoints::parse("p", text).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidKeyPoints { .. }), "{text}");
        }
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(InterpolationKind::parse("p", None).unwrap(), InterpolationKind::Linear);
        assert_eq!(
            InterpolationKind::parse("p", Some("Nearest")).unwrap(),
            InterpolationKind::Nearest
        );
        assert!(matches!(
            InterpolationKind::parse("p", Some("cubic")),
            Err(ConfigError::UnknownInterpolationKind { .. })
        ));
    }
}
