//! orderstats: reads the orders file, prints a sample of low and high spending
//! orders and the headline facts about them.

use anyhow::{Context, Result};
use clap::Parser;
use orderstats::{Args, Pipeline};
use std::io;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(args.verbose);

    let pipeline = Pipeline::new(args.to_config()?);
    info!("analysing {}", pipeline.config().input.display());

    let start_time = Instant::now();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = pipeline
        .run(&mut out)
        .with_context(|| format!("order analysis of {} failed", args.input))?;

    info!(
        "done in {:.2}s: threshold {:.2}, {} low / {} high",
        start_time.elapsed().as_secs_f64(),
        report.threshold,
        report.low_count,
        report.high_count
    );
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the level picked by `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
}
