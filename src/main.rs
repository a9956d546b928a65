use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use carrier_scout::analysis::LogObserver;
use carrier_scout::data::loader::{self, ParsePolicy};
use carrier_scout::{render, AnalysisConfig, Annotator};

/// Score known frequencies in an rtl_power waterfall and discover the
/// strongest unclaimed carriers.
#[derive(Parser)]
#[command(name = "carrier-scout", version, about)]
struct Cli {
    /// Waterfall to analyse (.csv from rtl_power, or .json)
    #[arg(short, long)]
    grid: PathBuf,

    /// Known frequency list, one "<Hz> <#RRGGBB>" per line
    #[arg(short, long, default_value = "freq_list")]
    known: PathBuf,

    /// JSON file with analysis settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Signal/noise threshold in dB
    #[arg(long, allow_hyphen_values = true)]
    level: Option<f64>,

    /// Minimum sample-to-sample jump counted as a transition
    #[arg(long)]
    delta: Option<f64>,

    /// Peak-to-noise above which a known frequency is active
    #[arg(long)]
    active_threshold: Option<f64>,

    /// Discovery candidate spacing in Hz
    #[arg(long)]
    step_hz: Option<i64>,

    /// Minimum separation between reported carriers in Hz
    #[arg(long)]
    exclusion_hz: Option<i64>,

    /// Number of carrier slots (active known + discovered)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Reject malformed known-list lines instead of stopping at them
    #[arg(long)]
    strict: bool,

    /// Write the annotated waterfall as PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(v) = self.level {
            config.level = v;
        }
        if let Some(v) = self.delta {
            config.delta = v;
        }
        if let Some(v) = self.active_threshold {
            config.active_threshold = v;
        }
        if let Some(v) = self.step_hz {
            config.step_hz = v;
        }
        if let Some(v) = self.exclusion_hz {
            config.exclusion_hz = v;
        }
        if let Some(v) = self.jobs {
            config.target_count = v;
        }
        if self.strict {
            config.parse_policy = ParsePolicy::Strict;
        }
        config.validate().context("checking command-line overrides")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = cli.analysis_config()?;
    let grid = loader::load_grid(&cli.grid)?;
    let known = loader::load_known_frequencies(&cli.known, config.parse_policy, &config.colors.sentinel)?;

    let annotator = Annotator::new(config);
    let plan = annotator.annotate(&grid, &known, &LogObserver);

    for freq in plan.reported_frequencies() {
        println!("{freq}");
    }

    if let Some(path) = &cli.png {
        let mut img = render::waterfall_image(&grid);
        render::paint_directives(&mut img, &grid, &plan.directives, &annotator.config().colors);
        img.save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {}", path.display());
    }

    Ok(())
}
