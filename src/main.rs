//! Unit Progress CLI Tool
//!
//! A command-line utility that drives throttled progress bars from parallel
//! producers.

use clap::Parser;
use std::process::ExitCode;
use unit_progress::cli::{run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
