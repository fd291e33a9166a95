//! Reading definition rows and sampling settings from disk

use std::fs;
use std::path::Path;

use color_eyre::eyre::{WrapErr, bail};
use jiff::civil::Date;
use paramgen_core::{Row, SamplingSettings, TimeAxis};

/// Definition rows from a JSON or YAML file, chosen by extension.
///
/// The document must be a sequence of mappings, one per spreadsheet row.
pub fn read_rows(path: &Path) -> color_eyre::Result<Vec<Row>> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read definitions from {}", path.display()))?;

    let rows = if is_yaml(path) {
        serde_saphyr::from_str(&content)
            .wrap_err_with(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .wrap_err_with(|| format!("Invalid JSON in {}", path.display()))?
    };
    Ok(rows)
}

/// Settings from a YAML file, or the defaults when no file is given
pub fn read_settings(path: Option<&Path>) -> color_eyre::Result<SamplingSettings> {
    let Some(path) = path else {
        return Ok(SamplingSettings::default());
    };
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read settings from {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(SamplingSettings::default());
    }
    serde_saphyr::from_str(&content)
        .wrap_err_with(|| format!("Invalid settings in {}", path.display()))
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Command-line switches that take precedence over the settings file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub samples: Option<usize>,
    pub mean_only: bool,
    pub seed: Option<u64>,
    pub start: Option<Date>,
    pub end: Option<Date>,
    pub units: bool,
}

impl Overrides {
    /// Apply the switches on top of `settings`.
    ///
    /// Giving `start` or `end` switches to time-series generation; a missing
    /// bound is taken from the file's axis.
    pub fn apply(&self, mut settings: SamplingSettings) -> color_eyre::Result<SamplingSettings> {
        if let Some(n) = self.samples {
            settings.sample_size = n;
        }
        if self.mean_only {
            settings.sample_mean_value = true;
        }
        if self.units {
            settings.with_units = true;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }

        if self.start.is_some() || self.end.is_some() {
            let current = settings.times.as_ref();
            let start = self.start.or_else(|| current.map(TimeAxis::start));
            let end = self.end.or_else(|| current.map(TimeAxis::end));
            let (Some(start), Some(end)) = (start, end) else {
                bail!("--start and --end must both be given when the settings have no time axis");
            };
            settings = settings.time_series(TimeAxis::monthly(start, end)?);
        }

        if settings.use_time_series && settings.times.is_none() {
            bail!("use_time_series is set but no time axis was given");
        }
        Ok(settings)
    }
}
