// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use wirebench_config::ScenarioConfig;
use wirebench_core::{Harness, HarnessError};

mod vcd_trace;

const EXIT_PASS: u8 = 0;
const EXIT_MISMATCH: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "WireBench packet-core verification harness",
    long_about = None
)]
struct Cli {
    /// Path to a scenario YAML file (built-in defaults when omitted)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Override the scenario's tick budget
    #[arg(long)]
    tick_budget: Option<u64>,

    /// Enable debug logging and control-line trace capture
    #[arg(short, long)]
    trace: bool,

    /// Write the captured control-line trace as a VCD waveform
    #[arg(long)]
    vcd: Option<PathBuf>,

    /// Print a JSON snapshot of the device state after the run
    #[arg(long)]
    dump_state: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level based on --trace flag
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let mut config = if let Some(path) = &cli.scenario {
        match ScenarioConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{:#}", e);
                return ExitCode::from(EXIT_CONFIG_ERROR);
            }
        }
    } else {
        ScenarioConfig::default()
    };
    if let Some(budget) = cli.tick_budget {
        config.tick_budget = budget;
    }

    let mut harness = match Harness::from_config(&config) {
        Ok(harness) => harness,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    // The VCD dump reads from the same capture the --trace flag enables.
    if cli.trace || cli.vcd.is_some() {
        harness.enable_trace();
    }

    info!(
        "Starting WireBench harness: {} iterations, payload {} bytes, budget {} ticks",
        config.slot_pairs.len(),
        config.payload_len,
        config.tick_budget
    );
    let result = harness.run();

    // Dump the waveform even on failure; a hung handshake is exactly when
    // it is most useful.
    if let Some(path) = &cli.vcd {
        match harness.trace() {
            Some(trace) => {
                if let Err(e) = vcd_trace::write_vcd(trace, path) {
                    error!("Failed to write VCD {:?}: {:#}", path, e);
                } else {
                    info!("Wrote control-line trace to {:?}", path);
                }
            }
            None => error!("No trace captured; nothing to write to {:?}", path),
        }
    }

    if cli.dump_state {
        match serde_json::to_string_pretty(&harness.device().snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize device state: {}", e),
        }
    }

    match result {
        Ok(report) => {
            println!("Errors : {}", report.mismatches);
            if report.mismatches == 0 {
                ExitCode::from(EXIT_PASS)
            } else {
                ExitCode::from(EXIT_MISMATCH)
            }
        }
        Err(e @ HarnessError::InvalidScenario(_)) => {
            error!("{}", e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}
