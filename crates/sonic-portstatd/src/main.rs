//! portstatd entry point.
//!
//! Replays recorded counter traces through the windowed delta engine and
//! prints one JSON snapshot per port and tick on stdout. Logs go to stderr.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use sonic_portstatd::{replay, PortStatConfig, ReplayTrace, DEFAULT_CONFIG_PATH};

/// SONiC port statistics engine
#[derive(Parser, Debug)]
#[command(name = "portstatd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded counter trace
    Replay {
        /// Trace file (JSON)
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Pretty-print each snapshot
        #[arg(long)]
        pretty: bool,
    },
    /// Print the effective configuration
    ShowConfig,
}

/// Initialize tracing with RUST_LOG taking precedence over `log_level`.
fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = PortStatConfig::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    match args.command {
        Command::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
        Command::Replay { input, pretty } => {
            let trace = ReplayTrace::from_path(&input)?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let stats = replay(&trace, &config, |record| {
                if pretty {
                    serde_json::to_writer_pretty(&mut out, &record)?;
                } else {
                    serde_json::to_writer(&mut out, &record)?;
                }
                writeln!(out)?;
                Ok(())
            })
            .with_context(|| format!("replaying {}", input.display()))?;
            out.flush()?;
            info!(
                datapath = %stats.get_switch_id(),
                ports = stats.len(),
                ticks_elapsed = stats.ticks_elapsed(),
                "Replay finished"
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("portstatd error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
