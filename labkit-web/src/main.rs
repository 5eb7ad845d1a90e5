//! # Labkit Web - Server-Rendered Signal Demo
//!
//! Serves the harmonic-plus-noise demo as HTML with inline SVG charts. Every
//! form submission runs one mutate-recompute-render cycle on the single
//! shared session and redirects back to the page.

mod http;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use labkit_core::config::LabConfig;
use labkit_core::signal::{FilterDisplay, SignalDerivation, TimeAxis, signal_store};
use labkit_core::Session;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "labkit-web", version, about = "Server-rendered signal filtering demo")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5006
    #[arg(short, long)]
    bind: Option<String>,

    /// Samples on the time axis
    #[arg(long)]
    samples: Option<usize>,

    /// Fixed noise seed
    #[arg(long)]
    seed: Option<u64>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let mut config = LabConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.web.bind = bind;
    }
    config.signal.samples = cli.samples.unwrap_or(config.signal.samples);
    config.signal.seed = cli.seed.or(config.signal.seed);

    let axis = TimeAxis::new(config.signal.samples).context("Invalid sample count")?;
    // The filtered chart is always shown here; the filter toggle has no effect.
    let derivation = match config.signal.seed {
        Some(seed) => SignalDerivation::with_seed(axis, FilterDisplay::AlwaysShow, seed),
        None => SignalDerivation::new(axis, FilterDisplay::AlwaysShow),
    };
    let session = Session::new(derivation, signal_store()?);

    http::LabServer::new(session, config.web.bind)
        .run()
        .await
        .context("HTTP server failed")
}
