// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # FaultPage CLI
//!
//! This is the main entry point for the FaultPage command-line interface.
//! It initializes the logger from the verbosity flag and runs the selected
//! subcommand.

use anyhow::Context;
use faultpage::cli;
use log::{debug, LevelFilter};

/// Maps `-v` occurrences to a log level; `RUST_LOG` still takes precedence.
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Parses the arguments and executes the command.
fn run() -> Result<(), anyhow::Error> {
    let matches = cli::build().get_matches();
    init_logger(matches.get_count("verbose"));
    debug!("FaultPage v{}", cli::VERSION);

    cli::run(&matches).context("FaultPage command failed")?;
    Ok(())
}

/// The main entry point for the FaultPage CLI.
fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
