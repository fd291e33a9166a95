//! Tests for time-series generation through `Parameter::invoke`
//!
//! These tests verify that:
//! - A 10% CAGR grows the first value by exactly 10% over twelve months
//! - Grouped series are indexed by time, sample and group
//! - Negative values are reported once and left in the series
//! - Units are attached only when requested
//! - A mid-month reference date counts from its month start
//! - The interp band stays within the variation of the earliest key point

use jiff::civil::date;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::capture_warnings;
use crate::model::{ParameterDefinition, SamplingSettings, SchemaVersion};
use crate::parameter::Parameter;
use crate::series::Unit;
use crate::time_axis::TimeAxis;

fn axis(start: jiff::civil::Date, end: jiff::civil::Date) -> TimeAxis {
    TimeAxis::monthly(start, end).unwrap()
}

#[test]
fn test_cagr_over_one_year() {
    let p = Parameter::new(
        ParameterDefinition::new("a")
            .distribution("numpy.random", "uniform")
            .params(2.0, Some(4.0.into()), None)
            .cagr(0.1),
    );
    let settings = SamplingSettings::new()
        .mean_only()
        .time_series(axis(date(2009, 1, 1), date(2010, 1, 1)));
    let series = p
        .invoke(&settings, &mut StdRng::seed_from_u64(1))
        .unwrap()
        .as_series()
        .unwrap()
        .clone();

    assert_eq!(series.times().len(), 13);
    let first = series.first().unwrap();
    let last = series.last().unwrap();
    assert_eq!(first, 3.0);
    assert!((last - first * 1.1).abs() < 1e-12);
}

fn grouped_definition() -> ParameterDefinition {
    ParameterDefinition::new("power")
        .unit("W")
        .version(SchemaVersion::V2)
        .growth_type("exp")
        .ref_date(date(2020, 1, 1))
        .ref_value([("A", 1.0), ("B", 2.0), ("C", 4.0)])
        .growth_factor(0.0)
        .ef_growth_factor(0.0)
        .variation(0.0)
}

#[test]
fn test_group_series_shape() {
    let settings = SamplingSettings::new()
        .sample_size(3)
        .mean_only()
        .with_units()
        .time_series(axis(date(2020, 1, 1), date(2020, 3, 1)))
        .grouped(["power"], ["A", "B", "C"]);
    let p = Parameter::new(grouped_definition());
    let value = p.invoke(&settings, &mut StdRng::seed_from_u64(2)).unwrap();
    let series = value.as_series().unwrap();

    assert_eq!(series.index_levels(), 3);
    assert_eq!(series.len(), 27);
    assert_eq!(series.unit(), Some(&Unit::Named("W".to_string())));
    for point in series.iter() {
        let expected = match point.group {
            Some("A") => 1.0,
            Some("B") => 2.0,
            Some("C") => 4.0,
            other => panic!("unexpected group {other:?}"),
        };
        assert_eq!(point.value, expected);
    }
    assert_eq!(series.group_values("C").unwrap(), vec![4.0; 9]);
}

#[test]
fn test_group_series_with_variability_stays_aligned() {
    let def = grouped_definition()
        .variation(0.5)
        .ef_growth_factor([("A", 0.0), ("B", 0.0), ("C", 0.0)]);
    let settings = SamplingSettings::new()
        .sample_size(20)
        .time_series(axis(date(2020, 1, 1), date(2020, 6, 1)))
        .grouped(["power"], ["A", "B", "C"]);
    let value = Parameter::new(def)
        .invoke(&settings, &mut StdRng::seed_from_u64(3))
        .unwrap()
        .clone();
    let series = value.as_series().unwrap();

    for (label, centre) in [("A", 1.0), ("B", 2.0), ("C", 4.0)] {
        let values = series.group_values(label).unwrap();
        assert_eq!(values.len(), 6 * 20);
        assert!(
            values.iter().all(|v| (v - centre).abs() <= centre * 0.5 + 1e-12),
            "group {label}"
        );
    }
}

#[test]
fn test_ungrouped_variable_ignores_group_settings() {
    let def = ParameterDefinition::new("other")
        .version(SchemaVersion::V2)
        .growth_type("exp")
        .ref_date(date(2020, 1, 1))
        .ref_value(5.0)
        .growth_factor(0.0)
        .ef_growth_factor(0.0);
    let settings = SamplingSettings::new()
        .sample_size(2)
        .mean_only()
        .time_series(axis(date(2020, 1, 1), date(2020, 2, 1)))
        .grouped(["power"], ["A", "B"]);
    let value = Parameter::new(def)
        .invoke(&settings, &mut StdRng::seed_from_u64(4))
        .unwrap()
        .clone();
    let series = value.as_series().unwrap();
    assert_eq!(series.index_levels(), 2);
    assert_eq!(series.groups(), None);
    assert_eq!(series.values(), &[5.0; 4]);
    assert_eq!(series.unit(), None);
}

#[test]
fn test_negative_values_warn_once_and_are_kept() {
    let def = ParameterDefinition::new("shaky")
        .version(SchemaVersion::V2)
        .growth_type("exp")
        .ref_date(date(2020, 1, 1))
        .ref_value(0.1)
        .growth_factor(0.0)
        .ef_growth_factor(0.0)
        .variation(10.0);
    let settings = SamplingSettings::new()
        .sample_size(10)
        .time_series(axis(date(2020, 1, 1), date(2020, 12, 1)));
    let p = Parameter::new(def);

    let (series, warnings) = capture_warnings(|| {
        p.invoke(&settings, &mut StdRng::seed_from_u64(6))
            .unwrap()
            .as_series()
            .unwrap()
            .clone()
    });

    let first_negative = series.negative_entries().next().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("shaky"));
    assert!(warnings[0].contains(&first_negative.time.to_string()));
    assert!(series.values().iter().any(|v| *v < 0.0));
    assert_eq!(series.len(), 12 * 10);
}

#[test]
fn test_no_warning_without_negatives() {
    let settings = SamplingSettings::new()
        .sample_size(3)
        .mean_only()
        .time_series(axis(date(2020, 1, 1), date(2020, 3, 1)))
        .grouped(["power"], ["A", "B", "C"]);
    let p = Parameter::new(grouped_definition());
    let (_, warnings) = capture_warnings(|| {
        p.invoke(&settings, &mut StdRng::seed_from_u64(6)).unwrap();
    });
    assert!(warnings.is_empty());
}

#[test]
fn test_dimensionless_unit_when_none_declared() {
    let def = ParameterDefinition::new("ratio")
        .distribution("numpy.random", "normal")
        .params(1.0, Some(0.0.into()), None);
    let settings = SamplingSettings::new()
        .with_units()
        .time_series(axis(date(2020, 1, 1), date(2020, 2, 1)));
    let value = Parameter::new(def)
        .invoke(&settings, &mut StdRng::seed_from_u64(8))
        .unwrap()
        .clone();
    assert_eq!(value.as_series().unwrap().unit(), Some(&Unit::Dimensionless));
}

#[test]
fn test_interp_per_group_key_points() {
    let def = ParameterDefinition {
        ref_value: Some(crate::model::GroupValue::PerGroup(
            [
                ("A".to_string(), r#"{"2020-01-01": 0, "2021-01-01": 12}"#.into()),
                ("B".to_string(), r#"{"2020-01-01": 5, "2021-01-01": 5}"#.into()),
            ]
            .into_iter()
            .collect(),
        )),
        ..ParameterDefinition::new("stock")
            .version(SchemaVersion::V2)
            .growth_type("interp")
            .interpolation("previous")
            .ref_date(date(2020, 1, 1))
            .ef_growth_factor(0.0)
    };
    let settings = SamplingSettings::new()
        .mean_only()
        .time_series(axis(date(2020, 1, 1), date(2021, 2, 1)))
        .grouped(["stock"], ["A", "B"]);
    let value = Parameter::new(def)
        .invoke(&settings, &mut StdRng::seed_from_u64(8))
        .unwrap()
        .clone();
    let series = value.as_series().unwrap();
    let a = series.group_values("A").unwrap();
    assert_eq!(a[0], 0.0);
    assert_eq!(a[11], 0.0);
    assert_eq!(a[12], 12.0);
    assert_eq!(a[13], 12.0);
    assert!(series.group_values("B").unwrap().iter().all(|v| *v == 5.0));
}

#[test]
fn test_mid_month_ref_date_constant_policy() {
    let p = Parameter::new(
        ParameterDefinition::new("tv")
            .distribution("numpy.random", "normal")
            .params(1.0, Some(0.0.into()), None)
            .cagr(0.1)
            .ref_date(date(2020, 1, 15)),
    );
    let settings = SamplingSettings::new()
        .mean_only()
        .time_series(axis(date(2020, 1, 1), date(2020, 6, 1)));

    let (series, warnings) = capture_warnings(|| {
        p.invoke(&settings, &mut StdRng::seed_from_u64(1))
            .unwrap()
            .as_series()
            .unwrap()
            .clone()
    });

    assert_eq!(series.len(), 6);
    for (t, v) in series.values().iter().enumerate() {
        assert!((v - 1.1f64.powf(t as f64 / 12.0)).abs() < 1e-12, "month {t}: {v}");
    }
    assert_eq!(
        warnings,
        vec!["ref date truncated to first of month for variable tv"]
    );
}

#[test]
fn test_mid_month_ref_date_mean_variance_policy() {
    let def = ParameterDefinition::new("laptop")
        .version(SchemaVersion::V2)
        .growth_type("exp")
        .ref_date(date(2020, 1, 15))
        .ref_value(2.0)
        .growth_factor(0.1)
        .ef_growth_factor(0.0);
    let settings = SamplingSettings::new()
        .mean_only()
        .time_series(axis(date(2020, 1, 1), date(2020, 6, 1)));

    let value = Parameter::new(def)
        .invoke(&settings, &mut StdRng::seed_from_u64(1))
        .unwrap()
        .clone();
    let series = value.as_series().unwrap();

    assert_eq!(series.len(), 6);
    for (t, v) in series.values().iter().enumerate() {
        assert!((v - 2.0 * 1.1f64.powf(t as f64 / 12.0)).abs() < 1e-12, "month {t}: {v}");
    }
}

#[test]
fn test_interp_band_scales_with_earliest_key_point() {
    let def = ParameterDefinition::new("share")
        .version(SchemaVersion::V2)
        .growth_type("interp")
        .ref_date(date(2020, 1, 1))
        .ref_value(r#"{"2020-01-01": 10, "2021-01-01": 20}"#)
        .ef_growth_factor(0.0)
        .variation(0.1);
    let times = axis(date(2020, 1, 1), date(2021, 1, 1));

    let mean_settings = SamplingSettings::new().mean_only().time_series(times.clone());
    let means = Parameter::new(def.clone())
        .invoke(&mean_settings, &mut StdRng::seed_from_u64(0))
        .unwrap()
        .clone();
    let means = means.as_series().unwrap();

    let settings = SamplingSettings::new().sample_size(30).time_series(times);
    let value = Parameter::new(def)
        .invoke(&settings, &mut StdRng::seed_from_u64(12))
        .unwrap()
        .clone();
    let series = value.as_series().unwrap();

    assert_eq!(series.len(), 13 * 30);
    let mut off_mean = false;
    for point in series.iter() {
        let t = series.times().iter().position(|d| *d == point.time).unwrap();
        let centre = means.get(t, 0, 0);
        assert!((point.value - centre).abs() <= 1.0 + 1e-12, "{point:?}");
        off_mean |= (point.value - centre).abs() > 1e-6;
    }
    assert!(off_mean);
}
