//! Command-line interface for the progress tracking demo tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{ProgressError, Result};
use crate::progress::{create_tracker, BarFacade, FacadeSink, Tracker, UiThread};
use crate::workload::{self, WorkScheduler};

/// Unit progress tool
///
/// Drives throttled progress bars from many producer threads, either with
/// synthetic work or by inverting an image row by row.
#[derive(Parser, Debug)]
#[command(name = "unitprog")]
#[command(author = "Imaging Tools Team")]
#[command(version = "0.1.0")]
#[command(about = "Coalesced progress reporting from parallel producers")]
#[command(long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run synthetic work units in parallel
    Simulate {
        /// Total number of work units (non-positive disables the bar)
        #[arg(short, long, default_value = "100000", allow_negative_numbers = true)]
        units: i64,

        /// Producer threads (overrides the configuration)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Busy time per unit in microseconds
        #[arg(long, default_value = "20")]
        unit_us: u64,

        /// Operation label shown on the bar
        #[arg(short, long, default_value = "Simulating")]
        name: String,
    },

    /// Invert an image, one work unit per row
    Invert {
        /// Input image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,

        /// Producer threads (overrides the configuration)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Print the effective configuration
    Config {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

/// Tracker type used by the CLI.
type CliTracker = Tracker<FacadeSink<BarFacade>>;

/// Run the CLI application.
pub fn run(cli: Cli) -> Result<()> {
    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else if !cli.quiet {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();
    }

    let config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Simulate {
            units,
            threads,
            unit_us,
            name,
        } => run_simulate(&config, units, threads, unit_us, &name, cli.quiet),
        Commands::Invert {
            input,
            output,
            threads,
        } => run_invert(&config, input, output, threads, cli.quiet),
        Commands::Config { json } => run_config(&config, json),
    }
}

/// Spawn the UI thread unless bars are disabled.
fn start_ui(config: &Config, quiet: bool) -> Result<Option<(UiThread, BarFacade)>> {
    if quiet || !config.ui.enabled {
        return Ok(None);
    }
    let ui = UiThread::spawn(&config.ui.thread_name)?;
    let facade = BarFacade::new(ui.dispatcher(), &config.ui.template)?;
    Ok(Some((ui, facade)))
}

fn make_tracker(ui: &Option<(UiThread, BarFacade)>, units: i64, name: &str) -> CliTracker {
    match ui {
        Some((_, facade)) => create_tracker(units, name, facade.clone()),
        None => Tracker::null(),
    }
}

fn stop_ui(ui: Option<(UiThread, BarFacade)>) -> Result<()> {
    match ui {
        Some((ui, _)) => ui.shutdown(),
        None => Ok(()),
    }
}

fn scheduler_for(config: &Config, threads: Option<usize>) -> WorkScheduler {
    WorkScheduler::new(threads.unwrap_or_else(|| config.workers.effective_threads()))
}

/// Run simulate command.
fn run_simulate(
    config: &Config,
    units: i64,
    threads: Option<usize>,
    unit_us: u64,
    name: &str,
    quiet: bool,
) -> Result<()> {
    let scheduler = scheduler_for(config, threads);
    let ui = start_ui(config, quiet)?;
    let tracker = make_tracker(&ui, units, name);

    let start = Instant::now();
    let ran = workload::simulate(
        &scheduler,
        units.max(0) as u64,
        Duration::from_micros(unit_us),
        &tracker,
    )?;
    let elapsed = start.elapsed();

    stop_ui(ui)?;

    if !quiet {
        println!("Simulation Result:");
        println!("  Operation: {}", name);
        println!("  Units: {}", ran);
        println!("  Threads: {}", scheduler.num_threads());
        println!("  Time: {} ms", elapsed.as_millis());
        if let Some(engine) = tracker.engine() {
            println!("  Final: {}% ({})", engine.last_reported(), engine.state());
        }
    }

    Ok(())
}

/// Run invert command.
fn run_invert(
    config: &Config,
    input: PathBuf,
    output: PathBuf,
    threads: Option<usize>,
    quiet: bool,
) -> Result<()> {
    if input == output {
        return Err(ProgressError::Config(
            "input and output must be different files".into(),
        ));
    }

    let scheduler = scheduler_for(config, threads);
    let ui = start_ui(config, quiet)?;
    let label = format!(
        "Inverting {}",
        input.file_name().unwrap_or_default().to_string_lossy()
    );

    let result = workload::invert_file(&input, &output, &scheduler, |rows| {
        make_tracker(&ui, rows, &label)
    });
    stop_ui(ui)?;
    let summary = result?;

    if !quiet {
        println!("Invert Result:");
        println!("  Input: {}", input.display());
        println!("  Output: {}", output.display());
        println!("  Size: {}x{}", summary.width, summary.height);
        println!("  Rows reported: {}", summary.height);
    }

    Ok(())
}

/// Run config command.
fn run_config(config: &Config, json: bool) -> Result<()> {
    let rendered = if json {
        serde_json::to_string_pretty(config).map_err(|e| ProgressError::Internal(e.to_string()))?
    } else {
        toml::to_string_pretty(config).map_err(|e| ProgressError::Internal(e.to_string()))?
    };
    println!("{}", rendered);
    Ok(())
}
