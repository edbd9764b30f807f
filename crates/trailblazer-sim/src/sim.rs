//! Simulation settings and the tick loop.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use trailblazer_core::{SharedEngine, StepDispatcher, TrailblazerConfig, TransitionEngine};
use trailblazer_types::Identifier;

use crate::error::SimError;
use crate::grid::{GridWorld, TickClock};
use crate::walker;

/// Environment variable naming the configuration directory.
pub const CONFIG_ENV: &str = "TRAILBLAZER_CONFIG";
/// Environment variable for the number of ticks to run.
pub const TICKS_ENV: &str = "TRAILBLAZER_TICKS";
/// Environment variable for the random seed.
pub const SEED_ENV: &str = "TRAILBLAZER_SEED";

/// Run parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimSettings {
    /// Directory holding `trailblazer.yaml`. `None` uses the embedded
    /// default without touching the filesystem.
    pub config_dir: Option<PathBuf>,
    /// Ticks to simulate.
    pub ticks: u64,
    /// Seed for agent placement and movement.
    pub seed: u64,
    /// Number of wandering agents.
    pub agents: usize,
    /// Grid extent along x.
    pub width: i32,
    /// Grid extent along z.
    pub depth: i32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            config_dir: None,
            ticks: 2_000,
            seed: 42,
            agents: 24,
            width: 32,
            depth: 32,
        }
    }
}

impl SimSettings {
    /// Read settings from the environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidSetting`] if a numeric variable does not
    /// parse.
    pub fn from_env() -> Result<Self, SimError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SimError> {
        let mut settings = Self::default();
        if let Some(dir) = lookup(CONFIG_ENV) {
            settings.config_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup(TICKS_ENV) {
            settings.ticks = parse_setting(TICKS_ENV, value)?;
        }
        if let Some(value) = lookup(SEED_ENV) {
            settings.seed = parse_setting(SEED_ENV, value)?;
        }
        Ok(settings)
    }

    /// Load the path engine configuration these settings point at.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the directory cannot be prepared or
    /// the configuration does not parse.
    pub fn load_config(&self) -> Result<TrailblazerConfig, SimError> {
        let Some(dir) = &self.config_dir else {
            info!("no config directory set, using embedded default");
            return Ok(TrailblazerConfig::embedded_default()?);
        };
        let (config, source) = TrailblazerConfig::load_effective(dir)?;
        info!(dir = %dir.display(), ?source, rules = config.rules.len(), "configuration loaded");
        Ok(config)
    }
}

fn parse_setting(name: &'static str, value: String) -> Result<u64, SimError> {
    value.trim().parse().map_err(|error: std::num::ParseIntError| SimError::InvalidSetting {
        name,
        reason: error.to_string(),
        value,
    })
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimReport {
    /// Ticks simulated.
    pub ticks: u64,
    /// Transitions issued by the engine.
    pub transitions: u64,
    /// Final cell count per terrain.
    pub terrain: BTreeMap<Identifier, usize>,
}

/// Run the simulation to completion.
///
/// # Errors
///
/// Returns [`SimError::Rule`] if the configuration contains an invalid
/// rule.
pub fn run(settings: &SimSettings, config: &TrailblazerConfig) -> Result<SimReport, SimError> {
    let engine = TransitionEngine::from_config(config)?;
    let mut world = GridWorld::new(
        settings.width,
        settings.depth,
        &Identifier::parse("minecraft:grass_block").map_err(invalid_builtin)?,
    );
    for rule in engine.rule_set().rules() {
        world.register_terrain(rule.source_id().clone());
        world.register_terrain(rule.target_id().clone());
    }
    // A strip of farmland along one edge for the livestock to trample.
    world.fill(
        (0, settings.width),
        (0, 2),
        &Identifier::parse("minecraft:farmland").map_err(invalid_builtin)?,
    );

    let dispatcher = StepDispatcher::new(Arc::new(SharedEngine::new(engine)));

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut walkers = walker::spawn_walkers(&mut rng, settings.agents, world.width(), world.depth())
        .map_err(invalid_builtin)?;
    let mut clock = TickClock::default();
    let mut transitions = 0_u64;

    info!(
        ticks = settings.ticks,
        seed = settings.seed,
        agents = walkers.len(),
        width = world.width(),
        depth = world.depth(),
        "simulation starting"
    );

    for _ in 0..settings.ticks {
        clock.advance();
        for walker in &mut walkers {
            walker.wander(&mut rng, world.width(), world.depth());
            if let Some(command) = dispatcher.agent_moved(&mut world, &*walker, &clock) {
                transitions = transitions.saturating_add(1);
                info!(
                    position = %command.position,
                    from = %command.from,
                    to = %command.to,
                    rule = %command.rule_name,
                    count = command.count,
                    "terrain changed"
                );
            }
        }
    }

    let terrain = world.summary();
    for (id, cells) in &terrain {
        info!(terrain = %id, cells, "final terrain");
    }
    Ok(SimReport {
        ticks: settings.ticks,
        transitions,
        terrain,
    })
}

fn invalid_builtin(error: trailblazer_types::IdentifierError) -> SimError {
    SimError::InvalidSetting {
        name: "builtin identifier",
        value: String::new(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn small() -> SimSettings {
        SimSettings {
            ticks: 400,
            agents: 12,
            width: 6,
            depth: 6,
            ..SimSettings::default()
        }
    }

    #[test]
    fn env_overrides_defaults() {
        let settings = SimSettings::from_lookup(|name| match name {
            TICKS_ENV => Some("10".to_owned()),
            SEED_ENV => Some(" 9 ".to_owned()),
            CONFIG_ENV => Some("/tmp/trailblazer".to_owned()),
            _ => None,
        })
        .unwrap();
        assert_eq!(settings.ticks, 10);
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.config_dir, Some(PathBuf::from("/tmp/trailblazer")));
    }

    #[test]
    fn bad_number_is_rejected() {
        let settings = SimSettings::from_lookup(|name| (name == TICKS_ENV).then(|| "many".to_owned()));
        assert!(matches!(
            settings,
            Err(SimError::InvalidSetting { name: TICKS_ENV, .. })
        ));
    }

    #[test]
    fn crowded_grid_forms_paths() {
        let config = TrailblazerConfig::embedded_default().unwrap();
        let report = run(&small(), &config).unwrap();

        assert!(report.transitions > 0);
        assert_eq!(report.terrain.values().sum::<usize>(), 36);
        let path = Identifier::parse("dirt_path").unwrap();
        assert!(report.terrain.contains_key(&path), "{:?}", report.terrain);
    }

    #[test]
    fn runs_are_reproducible() {
        let config = TrailblazerConfig::embedded_default().unwrap();
        let first = run(&small(), &config).unwrap();
        let second = run(&small(), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn no_rules_no_changes() {
        let report = run(&small(), &TrailblazerConfig::default()).unwrap();
        assert_eq!(report.transitions, 0);
        assert_eq!(report.terrain.len(), 2);
    }
}
