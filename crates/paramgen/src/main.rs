use clap::Parser;
use jiff::civil::Date;
use paramgen::{Overrides, Request, init_logging, run};
use paramgen_core::{DEFAULT_SCENARIO, SchemaVersion};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "paramgen")]
#[command(about = "Sample model parameters from spreadsheet-style definitions")]
struct Args {
    /// Definition rows (.json, .yaml or .yml)
    definitions: PathBuf,

    /// Sampling settings (YAML)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Definition schema version
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    version: u8,

    /// Scenario to sample; unknown scenarios fall back to the default
    #[arg(long, default_value = DEFAULT_SCENARIO)]
    scenario: String,

    /// Parameter to sample (repeatable, default: all)
    #[arg(short, long = "param")]
    params: Vec<String>,

    /// Draws per time step
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Use distribution means instead of random draws
    #[arg(long)]
    mean_only: bool,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// First month of the time axis (YYYY-MM-01)
    #[arg(long)]
    start: Option<Date>,

    /// Last month of the time axis (YYYY-MM-01)
    #[arg(long)]
    end: Option<Date>,

    /// Attach units to time series
    #[arg(long)]
    units: bool,

    /// Print every sampled value as JSON instead of a summary table
    #[arg(long)]
    json: bool,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn into_request(self) -> color_eyre::Result<Request> {
        Ok(Request {
            definitions: self.definitions,
            settings: self.settings,
            version: SchemaVersion::try_from(self.version)?,
            scenario: self.scenario,
            params: self.params,
            overrides: Overrides {
                samples: self.samples,
                mean_only: self.mean_only,
                seed: self.seed,
                start: self.start,
                end: self.end,
                units: self.units,
            },
            json: self.json,
        })
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    let output = run(&args.into_request()?)?;
    print!("{output}");

    tracing::info!("Done");
    Ok(())
}
