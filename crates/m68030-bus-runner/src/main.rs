use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use m68030_bus_runner::{RunnerConfig, run, to_json};

#[derive(Parser, Debug)]
#[command(
    name = "m68030-bus-runner",
    about = "Run a stimulus list through the 68030 bus master and write a JSON cycle trace."
)]
struct Args {
    /// Stimulus file (R/B/W lines)
    #[arg(default_value = "io_list.txt")]
    io_list: PathBuf,

    /// Report output path
    #[arg(long, value_name = "PATH", default_value = "report.json")]
    report: PathBuf,

    /// JSON runner configuration (slave timing, memory, interrupts)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the bus clock frequency
    #[arg(long, value_name = "HZ")]
    clock_hz: Option<u64>,

    /// Skip the power-on reset sequence
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_reset: bool,

    /// Don't poll IPL between operations
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_interrupts: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(hz) = args.clock_hz {
        config.clock_hz = hz;
    }
    if args.no_reset {
        config.reset = false;
    }
    if args.no_interrupts {
        config.poll_interrupts = false;
    }

    let text = fs::read_to_string(&args.io_list)
        .with_context(|| format!("failed to read {}", args.io_list.display()))?;
    let list = format_io_list::parse(&text);
    tracing::info!(
        operations = list.len(),
        skipped = list.skipped.len(),
        "loaded {}",
        args.io_list.display()
    );

    let entries = run(&config, &list)?;
    let json = to_json(&entries).context("failed to serialize report")?;
    fs::write(&args.report, json)
        .with_context(|| format!("failed to write {}", args.report.display()))?;

    tracing::info!(entries = entries.len(), "wrote {}", args.report.display());
    Ok(())
}
