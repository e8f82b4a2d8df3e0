// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use pulsebench_config::HarnessConfig;
use pulsebench_core::{ScenarioDriver, ScenarioKind, ScenarioReport, SpiPwmDevice, Testbench};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_SCENARIO_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

const RESULT_SCHEMA_VERSION: &str = "1.0";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "PulseBench Peripheral Verification Harness",
    long_about = None
)]
struct Cli {
    /// Path to the harness configuration (YAML). Defaults are used when
    /// omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario to run
    #[arg(short, long, value_enum, default_value_t = ScenarioArg::All)]
    scenario: ScenarioArg,

    /// Write a machine-readable result file (JSON)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Enable per-frame and per-measurement debug tracing
    #[arg(short, long)]
    trace: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ScenarioArg {
    All,
    Registers,
    Addressing,
    Frequency,
    Duty,
}

impl ScenarioArg {
    fn kinds(self) -> Vec<ScenarioKind> {
        match self {
            ScenarioArg::All => ScenarioKind::ALL.to_vec(),
            ScenarioArg::Registers => vec![ScenarioKind::RegisterFile],
            ScenarioArg::Addressing => vec![ScenarioKind::Addressing],
            ScenarioArg::Frequency => vec![ScenarioKind::PwmFrequency],
            ScenarioArg::Duty => vec![ScenarioKind::PwmDuty],
        }
    }
}

#[derive(Debug, Serialize)]
struct RunResult {
    result_schema_version: String,
    status: String,
    scenarios: Vec<ScenarioReport>,
    ticks_simulated: u64,
    config: HarnessConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let config = match &cli.config {
        Some(path) => match HarnessConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{:#}", e);
                return ExitCode::from(EXIT_CONFIG_ERROR);
            }
        },
        None => HarnessConfig::default(),
    };

    run(&cli, config)
}

fn run(cli: &Cli, config: HarnessConfig) -> ExitCode {
    info!("Starting PulseBench");

    let mut tb = Testbench::new(SpiPwmDevice::new(), config.timing.clock_period_ns);
    let reports = {
        let mut driver = ScenarioDriver::from_config(&mut tb, &config);
        driver.run_all(&cli.scenario.kinds())
    };

    let passed = reports.iter().all(|r| r.passed);
    let result = RunResult {
        result_schema_version: RESULT_SCHEMA_VERSION.to_string(),
        status: if passed { "pass" } else { "fail" }.to_string(),
        scenarios: reports,
        ticks_simulated: tb.ticks(),
        config,
    };

    if let Some(path) = &cli.json {
        if let Err(e) = write_result(path, &result) {
            error!("{:#}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    }

    if passed {
        info!(
            scenarios = result.scenarios.len(),
            ticks = result.ticks_simulated,
            "all scenarios passed"
        );
        ExitCode::from(EXIT_PASS)
    } else {
        let failed: Vec<&str> = result
            .scenarios
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.name.as_str())
            .collect();
        error!(?failed, "scenario failures");
        ExitCode::from(EXIT_SCENARIO_FAIL)
    }
}

fn write_result(path: &Path, result: &RunResult) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create result dir {:?}", parent))?;
        }
    }
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write result to {:?}", path))?;
    info!(?path, "result written");
    Ok(())
}
