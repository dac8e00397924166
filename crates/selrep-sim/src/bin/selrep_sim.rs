//! Selective-Repeat channel simulator.
//!
//! Runs one seeded transfer from peer A to peer B and prints the report.
//! Flags given alongside `--config` override the file's values.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use selrep_sim::{SimConfigInput, Simulation};
use tracing_subscriber::EnvFilter;

/// Selective-Repeat simulation over a lossy, corrupting channel.
#[derive(Parser, Debug)]
#[command(name = "selrep-sim", about = "Selective-Repeat lossy channel simulator")]
struct Cli {
    /// TOML simulation config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Application messages to generate.
    #[arg(long)]
    messages: Option<u64>,

    /// Per-packet loss probability.
    #[arg(long)]
    loss: Option<f64>,

    /// Per-packet corruption probability.
    #[arg(long)]
    corrupt: Option<f64>,

    /// Mean message interarrival time in milliseconds.
    #[arg(long = "lambda-ms")]
    lambda_ms: Option<u64>,

    /// Send and receive window size.
    #[arg(long)]
    window: Option<usize>,

    /// RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Cli {
    /// Load `--config` if given, then apply the flag overrides.
    fn into_input(self) -> Result<SimConfigInput> {
        let mut input = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                SimConfigInput::from_toml_str(&text)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => SimConfigInput::default(),
        };

        if self.messages.is_some() {
            input.messages = self.messages;
        }
        if self.loss.is_some() {
            input.loss_prob = self.loss;
        }
        if self.corrupt.is_some() {
            input.corrupt_prob = self.corrupt;
        }
        if self.lambda_ms.is_some() {
            input.mean_interarrival_ms = self.lambda_ms;
        }
        if self.window.is_some() {
            input.protocol.window_size = self.window;
        }
        if self.seed.is_some() {
            input.seed = self.seed;
        }
        Ok(input)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .compact()
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let config = cli
        .into_input()?
        .resolve()
        .context("invalid simulation config")?;
    let report = Simulation::new(config).run();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        );
    } else {
        println!("{report}");
    }

    anyhow::ensure!(report.in_order, "receiver delivered out of order");
    Ok(())
}
