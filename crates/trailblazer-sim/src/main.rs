//! Reference host for the Trailblazer path engine.
//!
//! Wanders a crowd of agents over a grass grid and lets the path engine
//! wear trails into it.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Read settings from `TRAILBLAZER_CONFIG`, `TRAILBLAZER_TICKS` and
//!    `TRAILBLAZER_SEED`
//! 3. Load the rule configuration (writing `trailblazer-default.yaml` into
//!    the config directory when one is set)
//! 4. Run the simulation and log the final terrain

mod error;
mod grid;
mod sim;
mod walker;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::sim::SimSettings;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if settings or configuration are invalid.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("trailblazer-sim starting");

    let settings = SimSettings::from_env()?;
    let config = settings.load_config()?;
    let report = sim::run(&settings, &config)?;

    info!(
        ticks = report.ticks,
        transitions = report.transitions,
        terrain_types = report.terrain.len(),
        "trailblazer-sim finished"
    );
    Ok(())
}
