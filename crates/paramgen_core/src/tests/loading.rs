//! Definition rows through the repository to samples
//!
//! These tests verify that:
//! - Version 1 rows sample through the constant-uncertainty policy
//! - Version 2 rows with group cells sample per group
//! - Scenario rows inherit from the default row of the same load

use jiff::civil::date;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

use crate::loader::Row;
use crate::model::{SamplingSettings, SchemaVersion};
use crate::repository::ParameterRepository;
use crate::time_axis::TimeAxis;

fn rows(value: serde_json::Value) -> Vec<Row> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_v1_rows_to_series() {
    let mut repo = ParameterRepository::new();
    repo.load_rows(
        &rows(json!([
            {"variable": "energy_intensity", "scenario": null, "module": "numpy.random",
             "distribution": "triangular", "param 1": 1, "param 2": 2, "param 3": 3,
             "unit": "kWh/GB", "CAGR": -0.2, "ref date": "2015-01-01", "tags": "network"},
            {"variable": "energy_intensity", "scenario": "optimistic", "module": "numpy.random",
             "distribution": "triangular", "param 1": 0.5, "param 2": 1, "param 3": 1.5,
             "CAGR": -0.3}
        ])),
        SchemaVersion::V1,
    )
    .unwrap();

    let optimistic = repo.get("energy_intensity", "optimistic").unwrap();
    assert_eq!(optimistic.unit(), Some("kWh/GB"));
    assert_eq!(optimistic.tags(), Some("network"));

    let settings = SamplingSettings::new()
        .sample_size(4)
        .mean_only()
        .time_series(TimeAxis::monthly(date(2015, 1, 1), date(2016, 1, 1)).unwrap());
    let series = repo
        .get("energy_intensity", "default")
        .unwrap()
        .invoke(&settings, &mut StdRng::seed_from_u64(1))
        .unwrap()
        .as_series()
        .unwrap()
        .clone();
    assert_eq!(series.len(), 13 * 4);
    assert_eq!(series.first(), Some(2.0));
    assert!((series.last().unwrap() - 2.0 * 0.8).abs() < 1e-12);
}

#[test]
fn test_v2_group_rows_to_grouped_series() {
    let mut repo = ParameterRepository::new();
    repo.load_rows(
        &rows(json!([
            {"variable": "power_laptop", "type": "exp", "ref date": "2019-01-12",
             "ref value": "10", "mean growth": 0.0, "variability growth": 0.0,
             "initial_value_proportional_variation": 0.0, "unit": "W"},
            {"variable": "power_laptop", "group": "UK", "ref value": 12},
            {"variable": "power_laptop", "group": "DE", "ref value": null},
            {"variable": "share", "type": "interp", "param": "linear",
             "ref value": {"2019-01-01": 0.5, "2020-01-01": 0.5},
             "variability growth": 0.0, "ref date": "2019-01-01"}
        ])),
        SchemaVersion::V2,
    )
    .unwrap();
    assert_eq!(repo.parameter_names(), vec!["power_laptop", "share"]);

    let settings = SamplingSettings::new()
        .sample_size(2)
        .mean_only()
        .time_series(TimeAxis::monthly(date(2019, 1, 1), date(2019, 4, 1)).unwrap())
        .grouped(["power_laptop"], ["DE", "UK"]);
    let mut rng = StdRng::seed_from_u64(2);

    let power = repo
        .get("power_laptop", "default")
        .unwrap()
        .invoke(&settings, &mut rng)
        .unwrap()
        .as_series()
        .unwrap()
        .clone();
    assert_eq!(power.len(), 4 * 2 * 2);
    assert_eq!(power.group_values("DE").unwrap(), vec![10.0; 8]);
    assert_eq!(power.group_values("UK").unwrap(), vec![12.0; 8]);

    let share = repo
        .get("share", "default")
        .unwrap()
        .invoke(&settings, &mut rng)
        .unwrap()
        .as_series()
        .unwrap()
        .clone();
    assert_eq!(share.index_levels(), 2);
    assert!(share.values().iter().all(|v| (*v - 0.5).abs() < 1e-12));
}

#[test]
fn test_failed_load_registers_nothing() {
    let mut repo = ParameterRepository::new();
    let result = repo.load_rows(
        &rows(json!([
            {"variable": "a", "type": "exp"},
            {"variable": "b", "type": "sideways"}
        ])),
        SchemaVersion::V2,
    );
    assert!(result.is_err());
    assert!(repo.is_empty());
}
