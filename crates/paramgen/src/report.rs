//! Text and JSON rendering of sampled parameters

use std::collections::BTreeMap;
use std::fmt::Write;

use paramgen_core::{ParameterValue, SampleSeries, percentile};
use serde::Serialize;

/// One invoked parameter, ready for printing
#[derive(Debug, Serialize)]
pub struct SampledParameter<'a> {
    pub name: &'a str,
    pub scenario: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'a str>,
    pub value: &'a ParameterValue,
}

/// Per-time-step statistics for every parameter, one block each
#[must_use]
pub fn render_table(results: &[SampledParameter<'_>]) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let unit = result.unit.map(|u| format!(" [{u}]")).unwrap_or_default();
        let _ = writeln!(out, "{}{} (scenario {})", result.name, unit, result.scenario);
        match result.value {
            ParameterValue::Sample(values) => write_sample(&mut out, values),
            ParameterValue::Series(series) => write_series(&mut out, series),
        }
    }
    out
}

fn write_sample(out: &mut String, values: &[f64]) {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mean = sorted.iter().sum::<f64>() / sorted.len().max(1) as f64;
    let _ = writeln!(
        out,
        "{:>10} {:>12} {:>12} {:>12} {:>12}",
        "samples", "mean", "p5", "p50", "p95"
    );
    let _ = writeln!(
        out,
        "{:>10} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
        sorted.len(),
        mean,
        percentile(&sorted, 0.05),
        percentile(&sorted, 0.50),
        percentile(&sorted, 0.95)
    );
}

fn write_series(out: &mut String, series: &SampleSeries) {
    let grouped = series.groups().is_some();
    let _ = write!(out, "{:<10}", "time");
    if grouped {
        let _ = write!(out, " {:<12}", "group");
    }
    let _ = writeln!(out, " {:>12} {:>12} {:>12} {:>12}", "mean", "p5", "p50", "p95");

    for row in series.summarize() {
        let _ = write!(out, "{:<10}", row.time.to_string());
        if let Some(group) = &row.group {
            let _ = write!(out, " {group:<12}");
        }
        let _ = writeln!(
            out,
            " {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
            row.mean, row.p5, row.p50, row.p95
        );
    }
}

/// Every sampled value keyed by parameter name
pub fn render_json(results: &[SampledParameter<'_>]) -> serde_json::Result<String> {
    let by_name: BTreeMap<&str, &SampledParameter<'_>> =
        results.iter().map(|r| (r.name, r)).collect();
    serde_json::to_string_pretty(&by_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use serde_json::Value;

    fn series() -> ParameterValue {
        ParameterValue::Series(SampleSeries::new(
            "power",
            vec![date(2020, 1, 1), date(2020, 2, 1)],
            2,
            Some(vec!["DE".to_string(), "UK".to_string()]),
            vec![1.0, 10.0, 3.0, 30.0, 2.0, 20.0, 4.0, 40.0],
            None,
        ))
    }

    #[test]
    fn test_series_table_has_a_row_per_time_and_group() {
        let value = series();
        let table = render_table(&[SampledParameter {
            name: "power",
            scenario: "default",
            unit: Some("W"),
            value: &value,
        }]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "power [W] (scenario default)");
        assert!(lines[1].starts_with("time"));
        assert!(lines[1].contains("group"));
        assert_eq!(lines.len(), 2 + 4);
        assert!(lines[2].starts_with("2020-01-01 DE"));
        assert!(lines[2].contains("2.0000"));
        assert!(lines[5].starts_with("2020-02-01 UK"));
        assert!(lines[5].contains("30.0000"));
    }

    #[test]
    fn test_sample_table() {
        let value = ParameterValue::Sample(vec![4.0, 2.0, 3.0, 1.0, 5.0]);
        let table = render_table(&[SampledParameter {
            name: "a",
            scenario: "S1",
            unit: None,
            value: &value,
        }]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "a (scenario S1)");
        let stats: Vec<&str> = lines[2].split_whitespace().collect();
        assert_eq!(stats, vec!["5", "3.0000", "1.0000", "3.0000", "5.0000"]);
    }

    #[test]
    fn test_json_dump_is_keyed_by_name() {
        let sample = ParameterValue::Sample(vec![1.5]);
        let grouped = series();
        let json = render_json(&[
            SampledParameter {
                name: "b",
                scenario: "default",
                unit: None,
                value: &sample,
            },
            SampledParameter {
                name: "a",
                scenario: "default",
                unit: Some("W"),
                value: &grouped,
            },
        ])
        .unwrap();

        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["b"]["value"], serde_json::json!([1.5]));
        assert_eq!(parsed["a"]["unit"], "W");
        assert_eq!(parsed["a"]["value"]["values"].as_array().unwrap().len(), 8);
        assert!(parsed["b"].get("unit").is_none());
    }
}
