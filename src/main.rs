//! Listen Stats - Main entry point
//!
//! Loads a streaming-history export and prints the listening report, or
//! writes the per-track CSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use listen_stats::analytics::get_full_song_stats;
use listen_stats::date_range::{self, DateRange};
use listen_stats::report::{write_report, Tee};
use listen_stats::{export, loader, Config, PlayEvent, Result};

#[derive(Parser)]
#[command(name = "listen-stats")]
#[command(author, version, about = "Listening statistics for streaming-history exports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the extracted Streaming_History*.json files
    #[arg(short, long, global = true, env = "LISTEN_STATS_DIR")]
    dir: Option<PathBuf>,
}

/// Which plays to include.
#[derive(Args, Clone, Default)]
struct PeriodArgs {
    /// Use the whole history
    #[arg(long)]
    all_time: bool,

    /// Only plays from this calendar year
    #[arg(long)]
    year: Option<i32>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    to: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the listening report
    Report {
        #[command(flatten)]
        period: PeriodArgs,

        /// Number of items to show in top lists
        #[arg(short, long)]
        limit: Option<usize>,

        /// Also write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write per-track statistics as CSV
    Export {
        #[command(flatten)]
        period: PeriodArgs,

        /// Destination file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or edit configuration
    Config {
        /// Print current configuration
        #[arg(long)]
        show: bool,

        /// Create default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn parse_day(value: &str) -> std::result::Result<NaiveDate, String> {
    date_range::parse_date(value).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load and validate configuration
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };
    config.validate()?;

    // Initialize logging; stdout is reserved for the report
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Some(dir) = cli.dir {
        config.history.dir = dir;
    }

    match cli.command {
        Some(Commands::Report {
            period,
            limit,
            output,
        }) => {
            if let Some(limit) = limit {
                config.report.limit = limit;
            }
            if output.is_some() {
                config.report.output = output;
            }
            config.validate()?;
            run_report(&config, &period)
        }

        Some(Commands::Export { period, output }) => {
            if let Some(output) = output {
                config.report.csv_path = output;
            }
            run_export(&config, &period)
        }

        Some(Commands::Config { show, init }) => {
            if init {
                let default_config = Config::default();
                default_config.save()?;
                println!(
                    "Created default configuration at {}",
                    Config::config_path()?.display()
                );
            } else if show {
                let contents = toml::to_string_pretty(&config)?;
                println!("{contents}");
            } else {
                println!("Configuration path: {}", Config::config_path()?.display());
            }
            Ok(())
        }

        None => {
            // Default: whole-history report
            run_report(&config, &PeriodArgs::default())
        }
    }
}

fn load_period(config: &Config, period: &PeriodArgs) -> Result<(Vec<PlayEvent>, DateRange)> {
    let range = date_range::from_cli_flags(period.all_time, period.year, period.from, period.to)?;
    let events = loader::load_history(&config.history_dir())?;
    let events = range.apply(events);
    info!("{} plays in {}", events.len(), range);
    Ok((events, range))
}

fn run_report(config: &Config, period: &PeriodArgs) -> Result<()> {
    let (events, range) = load_period(config, period)?;
    let stdout = io::stdout().lock();

    match config.report.output {
        Some(ref path) => {
            let path = config.resolve(path);
            let file = BufWriter::new(File::create(&path)?);
            let mut out = Tee::new(stdout, file);
            write_report(&mut out, &events, &range, config)?;
            out.flush()?;
            info!("Report written to {}", path.display());
        }
        None => {
            let mut out = stdout;
            write_report(&mut out, &events, &range, config)?;
        }
    }
    Ok(())
}

fn run_export(config: &Config, period: &PeriodArgs) -> Result<()> {
    let (events, _) = load_period(config, period)?;
    let path = config.resolve(&config.report.csv_path);
    export::export_song_stats(&path, &get_full_song_stats(&events))
}
