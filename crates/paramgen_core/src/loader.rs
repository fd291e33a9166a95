//! Normalization of raw definition rows.
//!
//! Table readers hand over one JSON object per spreadsheet row, keyed by the
//! column headers of schema version 1 or 2. Loading:
//!
//! 1. skips title rows without a `variable`
//! 2. folds inline group rows (rows with a `group` cell) into per-group cells
//! 3. renames headers to definition fields and coerces numeric cells
//! 4. truncates ref dates to the first of the month
//! 5. checks that every per-group cell carries the same group set
//! 6. validates version 2 growth fields
//!
//! Any failure aborts the whole load.

use jiff::civil::{Date, DateTime};
use serde_json::{Map, Value};

use crate::DEFAULT_SCENARIO;
use crate::date_math::truncate_to_month_start;
use crate::error::ConfigError;
use crate::interpolation::{InterpolationKind, KeyPoints};
use crate::model::{GroupValue, ParameterDefinition, RefValue, SchemaVersion};
use crate::parameter::Parameter;

/// One raw table row
pub type Row = Map<String, Value>;

/// Version 1 headers and the definition fields they fill
pub const V1_COLUMNS: [(&str, &str); 14] = [
    ("variable", "name"),
    ("scenario", "source_scenarios_string"),
    ("module", "module_name"),
    ("distribution", "distribution_name"),
    ("param 1", "param_a"),
    ("param 2", "param_b"),
    ("param 3", "param_c"),
    ("unit", "unit"),
    ("CAGR", "cagr"),
    ("ref date", "ref_date"),
    ("label", "label"),
    ("tags", "tags"),
    ("comment", "comment"),
    ("source", "source"),
];

/// Version 2 headers and the definition fields they fill
pub const V2_COLUMNS: [(&str, &str); 15] = [
    ("CAGR", "cagr"),
    ("comment", "comment"),
    ("label", "label"),
    ("mean growth", "growth_factor"),
    ("param", "param"),
    ("ref date", "ref_date"),
    ("ref value", "ref value"),
    ("scenario", "source_scenarios_string"),
    ("source", "source"),
    ("tags", "tags"),
    ("type", "type"),
    ("unit", "unit"),
    ("variability growth", "ef_growth_factor"),
    (
        "initial_value_proportional_variation",
        "initial_value_proportional_variation",
    ),
    ("variable", "name"),
];

/// Fields that may differ between the groups of a group variable
const GROUP_FIELDS: [&str; 4] = [
    "ref value",
    "growth_factor",
    "ef_growth_factor",
    "initial_value_proportional_variation",
];

/// Definition fields that must hold numbers, per schema version
const V1_NUMERIC: [&str; 1] = ["cagr"];
const V2_NUMERIC: [&str; 5] = [
    "ref value",
    "initial_value_proportional_variation",
    "growth_factor",
    "ef_growth_factor",
    "cagr",
];

fn columns(version: SchemaVersion) -> &'static [(&'static str, &'static str)] {
    match version {
        SchemaVersion::V1 => &V1_COLUMNS,
        SchemaVersion::V2 => &V2_COLUMNS,
    }
}

/// Definition field for a header; unknown headers (and field names) pass through
fn field_name(version: SchemaVersion, header: &str) -> &str {
    let header = header.trim();
    columns(version)
        .iter()
        .find(|(h, _)| *h == header)
        .map_or(header, |(_, field)| field)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Rename headers to field names and drop empty cells
fn normalize_headers(row: &Row, version: SchemaVersion) -> Row {
    row.iter()
        .filter(|(_, v)| !is_blank(v))
        .map(|(k, v)| (field_name(version, k).to_string(), v.clone()))
        .collect()
}

/// Rows of one (name, scenario) pair: at most one plain row plus group rows
#[derive(Default)]
struct Entry {
    name: String,
    scenario: String,
    base: Option<Row>,
    groups: Vec<(String, Row)>,
}

fn collect_entries(rows: &[Row], version: SchemaVersion) -> Result<Vec<Entry>, ConfigError> {
    let mut entries: Vec<Entry> = Vec::new();
    for (i, raw) in rows.iter().enumerate() {
        let row = normalize_headers(raw, version);
        let Some(name) = cell_text(row.get("name")) else {
            tracing::debug!("ignoring row {i}: {raw:?}");
            continue;
        };
        let scenario =
            cell_text(row.get("source_scenarios_string")).unwrap_or_else(|| DEFAULT_SCENARIO.to_string());
        let group = cell_text(row.get("group"));

        let position = entries
            .iter()
            .position(|e| e.name == name && e.scenario == scenario);
        let entry = match position {
            Some(p) => &mut entries[p],
            None => {
                entries.push(Entry {
                    name: name.clone(),
                    scenario: scenario.clone(),
                    ..Entry::default()
                });
                let last = entries.len() - 1;
                &mut entries[last]
            }
        };

        match group {
            Some(group) => {
                if entry.groups.iter().any(|(g, _)| *g == group) {
                    return Err(ConfigError::DuplicateGroup {
                        name,
                        scenario,
                        group,
                    });
                }
                entry.groups.push((group, row));
            }
            None => {
                if entry.base.is_some() {
                    return Err(ConfigError::DuplicateDefinition { name, scenario });
                }
                entry.base = Some(row);
            }
        }
    }
    Ok(entries)
}

/// Fold group rows into one row whose varying cells are `{group: value}` objects.
///
/// Cells a group row leaves empty take the plain row's value.
fn merge_groups(entry: Entry) -> Result<Row, ConfigError> {
    let Entry {
        name, base, groups, ..
    } = entry;
    if groups.is_empty() {
        return Ok(base.unwrap_or_default());
    }
    let base = base.unwrap_or_else(|| groups[0].1.clone());

    let mut keys: Vec<&String> = base.keys().collect();
    for (_, row) in &groups {
        keys.extend(row.keys());
    }
    keys.sort();
    keys.dedup();

    let mut merged = Row::new();
    for key in keys {
        if key == "group" {
            continue;
        }
        if key == "ref_date" {
            let dates: Vec<&Value> = groups
                .iter()
                .filter_map(|(_, row)| row.get(key).or_else(|| base.get(key)))
                .collect();
            if dates.windows(2).any(|pair| pair[0] != pair[1]) {
                return Err(ConfigError::InvalidDefinition {
                    name,
                    reason: "different groups have different ref dates".to_string(),
                });
            }
            if let Some(date) = dates.first() {
                merged.insert(key.clone(), (*date).clone());
            }
        } else if GROUP_FIELDS.contains(&key.as_str()) {
            let per_group: Map<String, Value> = groups
                .iter()
                .filter_map(|(group, row)| {
                    row.get(key)
                        .or_else(|| base.get(key))
                        .map(|v| (group.clone(), v.clone()))
                })
                .collect();
            merged.insert(key.clone(), Value::Object(per_group));
        } else if let Some(v) = base.get(key).or_else(|| groups[0].1.get(key)) {
            merged.insert(key.clone(), v.clone());
        }
    }
    Ok(merged)
}

/// Parse a ref date cell, truncating to the first of the month.
fn parse_ref_date(name: &str, value: &Value) -> Result<Date, ConfigError> {
    let invalid = || ConfigError::InvalidDate {
        name: name.to_string(),
        field: "ref date".to_string(),
        value: value.to_string(),
    };
    let Value::String(text) = value else {
        return Err(invalid());
    };
    let text = text.trim();
    let date = text
        .parse::<Date>()
        .ok()
        .or_else(|| Date::strptime("%d/%m/%Y", text).ok())
        .or_else(|| text.parse::<DateTime>().ok().map(|dt| dt.date()))
        .ok_or_else(invalid)?;

    let truncated = truncate_to_month_start(date);
    if truncated != date {
        tracing::warn!("ref date truncated to first of month for variable {name}");
    }
    Ok(truncated)
}

fn coerce_number(name: &str, field: &str, value: &mut Value) -> Result<(), ConfigError> {
    match value {
        Value::String(text) => {
            let parsed = text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .ok_or_else(|| ConfigError::NotANumber {
                    name: name.to_string(),
                    field: field.to_string(),
                    value: text.clone(),
                })?;
            *value = Value::Number(parsed);
            Ok(())
        }
        Value::Object(per_group) => {
            for v in per_group.values_mut() {
                coerce_number(name, field, v)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn is_interp(row: &Row) -> bool {
    matches!(row.get("type"), Some(Value::String(t)) if t.trim() == "interp")
}

fn is_key_points_object(value: &Value) -> bool {
    matches!(value, Value::Object(points)
        if !points.is_empty() && points.keys().all(|k| k.parse::<Date>().is_ok()))
}

/// Key points written as a JSON object rather than text become text, so they
/// are not mistaken for per-group values.
fn key_points_to_text(row: &mut Row) {
    if !is_interp(row) {
        return;
    }
    let Some(ref_value) = row.get_mut("ref value") else {
        return;
    };
    if is_key_points_object(ref_value) {
        *ref_value = Value::String(ref_value.to_string());
    } else if let Value::Object(per_group) = ref_value {
        for v in per_group.values_mut() {
            if is_key_points_object(v) {
                *v = Value::String(v.to_string());
            }
        }
    }
}

fn normalize_cells(name: &str, row: &mut Row, version: SchemaVersion) -> Result<(), ConfigError> {
    if version == SchemaVersion::V2 {
        key_points_to_text(row);
    }
    let interp = is_interp(row);
    let numeric: &[&str] = match version {
        SchemaVersion::V1 => &V1_NUMERIC,
        SchemaVersion::V2 => &V2_NUMERIC,
    };
    for field in numeric {
        if *field == "ref value" && interp {
            continue;
        }
        if let Some(value) = row.get_mut(*field) {
            coerce_number(name, field, value)?;
        }
    }
    if let Some(value) = row.get("ref_date") {
        let date = parse_ref_date(name, value)?;
        row.insert("ref_date".to_string(), Value::String(date.to_string()));
    }
    Ok(())
}

/// Every per-group cell across the load must name the same groups.
fn check_groups(rows: &[(String, Row)]) -> Result<(), ConfigError> {
    let mut expected: Option<Vec<String>> = None;
    for (name, row) in rows {
        for value in row.values() {
            let Value::Object(per_group) = value else {
                continue;
            };
            let found: Vec<String> = per_group.keys().cloned().collect();
            match &expected {
                Some(expected) if *expected != found => {
                    return Err(ConfigError::InconsistentGroups {
                        name: name.clone(),
                        expected: expected.clone(),
                        found,
                    });
                }
                Some(_) => {}
                None => expected = Some(found),
            }
        }
    }
    Ok(())
}

/// Check the growth fields of a version 2 definition.
pub fn validate(definition: &ParameterDefinition) -> Result<(), ConfigError> {
    let name = &definition.name;
    match definition.growth_type.as_deref().map(str::trim) {
        Some("exp") => {
            if definition.interpolation.is_some() {
                tracing::warn!("param not empty for non-interp variable {name}");
            }
        }
        Some("interp") => {
            InterpolationKind::parse(name, definition.interpolation.as_deref())?;
            if let Some(ref_value) = &definition.ref_value {
                let texts: Vec<_> = match ref_value {
                    GroupValue::Scalar(v) => vec![v],
                    GroupValue::PerGroup(values) => values.values().collect(),
                };
                for v in texts {
                    match v {
                        RefValue::Text(text) => {
                            KeyPoints::parse(name, text)?;
                        }
                        RefValue::Number(n) => {
                            return Err(ConfigError::InvalidKeyPoints {
                                name: name.clone(),
                                reason: format!("was {n}, must be valid json"),
                            });
                        }
                    }
                }
            }
        }
        other => {
            return Err(ConfigError::UnknownGrowthType {
                name: name.clone(),
                growth_type: other.unwrap_or_default().to_string(),
            });
        }
    }
    Ok(())
}

/// Turn raw rows into typed definitions.
pub fn load_definitions(
    rows: &[Row],
    version: SchemaVersion,
) -> Result<Vec<ParameterDefinition>, ConfigError> {
    let mut normalized = Vec::new();
    for entry in collect_entries(rows, version)? {
        let name = entry.name.clone();
        let mut row = merge_groups(entry)?;
        normalize_cells(&name, &mut row, version)?;
        normalized.push((name, row));
    }
    check_groups(&normalized)?;

    normalized
        .into_iter()
        .map(|(name, row)| {
            let mut definition: ParameterDefinition = serde_json::from_value(Value::Object(row))
                .map_err(|e| ConfigError::InvalidDefinition {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            definition.version = Some(version);
            if version == SchemaVersion::V2 {
                validate(&definition)?;
            }
            Ok(definition)
        })
        .collect()
}

/// Turn raw rows into parameters ready for registration.
pub fn load_parameters(rows: &[Row], version: SchemaVersion) -> Result<Vec<Parameter>, ConfigError> {
    Ok(load_definitions(rows, version)?
        .into_iter()
        .map(Parameter::new)
        .collect())
}
