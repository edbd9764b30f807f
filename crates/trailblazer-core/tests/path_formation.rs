//! End-to-end path formation through the dispatcher and an in-memory world.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use trailblazer_core::{
    AgentView, Clock, HistoryCache, ProgressRecord, SharedEngine, StepDispatcher, StepEvent,
    TerrainAccess, TrailblazerConfig, TransitionEngine, WorldError,
};
use trailblazer_rules::{Rule, RuleSet, matcher};
use trailblazer_types::{AgentCategory, FootwearDescriptor, Identifier, Position};

fn id(raw: &str) -> Identifier {
    Identifier::parse(raw).unwrap()
}

fn ids(raw: &[&str]) -> BTreeSet<Identifier> {
    raw.iter().map(|r| id(r)).collect()
}

#[derive(Default)]
struct Flat {
    cells: HashMap<Position, Identifier>,
}

impl Flat {
    fn with(position: Position, terrain: &str) -> Self {
        let mut world = Self::default();
        world.cells.insert(position, id(terrain));
        world
    }
}

impl TerrainAccess for Flat {
    fn terrain_at(&self, position: Position) -> Option<Identifier> {
        self.cells.get(&position).cloned()
    }

    fn set_terrain(&mut self, position: Position, terrain: &Identifier) -> Result<(), WorldError> {
        self.cells.insert(position, terrain.clone());
        Ok(())
    }
}

struct Walker {
    id: Identifier,
    category: AgentCategory,
    footwear: FootwearDescriptor,
    feet: (f64, f64, f64),
}

impl Walker {
    fn new(agent: &str, category: AgentCategory) -> Self {
        Self {
            id: id(agent),
            category,
            footwear: FootwearDescriptor::barefoot(),
            // Standing on the cell at (0, 0, 0).
            feet: (0.5, 1.0, 0.5),
        }
    }
}

impl AgentView for Walker {
    fn agent_id(&self) -> &Identifier {
        &self.id
    }

    fn category(&self) -> AgentCategory {
        self.category
    }

    fn footwear(&self) -> &FootwearDescriptor {
        &self.footwear
    }

    fn feet_position(&self) -> (f64, f64, f64) {
        self.feet
    }
}

struct Tick(u64);

impl Clock for Tick {
    fn now(&self) -> u64 {
        self.0
    }
}

const ORIGIN: Position = Position { x: 0, y: 0, z: 0 };

fn dispatcher(rules: Vec<Rule>, capacity: usize) -> StepDispatcher {
    let engine = TransitionEngine::new(RuleSet::build(rules), capacity);
    StepDispatcher::new(Arc::new(SharedEngine::new(engine)))
}

fn grass_rule(threshold: u32, timeout: u64) -> Rule {
    Rule::builder(id("grass_block"), id("dirt_path"))
        .name("grass")
        .step_threshold(threshold)
        .timeout_ticks(timeout)
        .build()
        .unwrap()
}

fn recorded(dispatcher: &StepDispatcher, position: Position) -> Option<u32> {
    dispatcher
        .engine()
        .with_engine(|engine| engine.history().peek(&position).map(|r| r.count))
}

#[test]
fn untracked_agent_changes_nothing() {
    let dispatcher = dispatcher(vec![grass_rule(1, 0)], 8);
    let mut world = Flat::with(ORIGIN, "grass_block");
    let zombie = Walker::new("zombie", AgentCategory::Monster);

    for now in 0..10 {
        assert_eq!(dispatcher.agent_moved(&mut world, &zombie, &Tick(now)), None);
    }
    assert_eq!(world.terrain_at(ORIGIN), Some(id("grass_block")));
    assert!(dispatcher.engine().with_engine(|engine| engine.history().is_empty()));
}

#[test]
fn nth_traversal_fires_and_earlier_ones_do_not() {
    let dispatcher = dispatcher(vec![grass_rule(5, 0)], 8);
    let mut world = Flat::with(ORIGIN, "grass_block");
    let player = Walker::new("player", AgentCategory::Misc);

    for now in 0..4 {
        assert_eq!(dispatcher.agent_moved(&mut world, &player, &Tick(now)), None);
        assert_eq!(recorded(&dispatcher, ORIGIN), u32::try_from(now + 1).ok());
    }
    let command = dispatcher.agent_moved(&mut world, &player, &Tick(4)).unwrap();
    assert_eq!(command.count, 5);
    assert_eq!(command.from, id("grass_block"));
    assert_eq!(world.terrain_at(ORIGIN), Some(id("dirt_path")));
    assert_eq!(recorded(&dispatcher, ORIGIN), None);

    // The cell is now dirt_path, which no rule watches.
    assert_eq!(dispatcher.agent_moved(&mut world, &player, &Tick(5)), None);
}

#[test]
fn zero_threshold_fires_on_first_step() {
    let dispatcher = dispatcher(vec![grass_rule(0, 0)], 8);
    let mut world = Flat::with(ORIGIN, "grass_block");
    let player = Walker::new("player", AgentCategory::Misc);

    assert!(dispatcher.agent_moved(&mut world, &player, &Tick(0)).is_some());
    assert_eq!(world.terrain_at(ORIGIN), Some(id("dirt_path")));
}

#[test]
fn slow_traversals_restart_the_count() {
    let dispatcher = dispatcher(vec![grass_rule(3, 100)], 8);
    let mut world = Flat::with(ORIGIN, "grass_block");
    let player = Walker::new("player", AgentCategory::Misc);

    let mut counts = Vec::new();
    for now in [0, 10, 10_000] {
        assert_eq!(dispatcher.agent_moved(&mut world, &player, &Tick(now)), None);
        counts.push(recorded(&dispatcher, ORIGIN).unwrap());
    }
    assert_eq!(counts, vec![1, 2, 1]);
    assert_eq!(world.terrain_at(ORIGIN), Some(id("grass_block")));
}

#[test]
fn gap_equal_to_timeout_still_counts() {
    let dispatcher = dispatcher(vec![grass_rule(2, 100)], 8);
    let mut world = Flat::with(ORIGIN, "grass_block");
    let player = Walker::new("player", AgentCategory::Misc);

    assert_eq!(dispatcher.agent_moved(&mut world, &player, &Tick(0)), None);
    assert!(dispatcher.agent_moved(&mut world, &player, &Tick(100)).is_some());
}

#[test]
fn full_cache_evicts_least_recently_touched() {
    let rule = grass_rule(10, 0);
    let mut cache = HistoryCache::new(2);
    let p1 = Position::new(1, 0, 0);
    let p2 = Position::new(2, 0, 0);
    let p3 = Position::new(3, 0, 0);

    cache.advance(p1, &rule, 0);
    cache.advance(p2, &rule, 1);
    cache.advance(p1, &rule, 2);
    cache.advance(p3, &rule, 3);

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(&p2));
    assert_eq!(cache.peek(&p1).map(|r| r.count), Some(2));
    assert_eq!(cache.lru_order(), vec![p1, p3]);
}

#[test]
fn cache_never_exceeds_capacity() {
    let rule = grass_rule(10, 0);
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let mut cache = HistoryCache::new(3);
    {
        let evicted = Arc::clone(&evicted);
        cache.set_eviction_hook(move |position, record: ProgressRecord| {
            evicted.lock().expect("hook lock").push((position, record.count));
        });
    }

    for x in 0..20 {
        cache.advance(Position::new(x, 0, 0), &rule, 0);
        assert!(cache.len() <= 3);
    }
    let evicted = evicted.lock().expect("hook lock");
    assert_eq!(evicted.len(), 17);
    assert_eq!(evicted.first(), Some(&(Position::new(0, 0, 0), 1)));
    assert_eq!(cache.evictions(), 17);
}

#[test]
fn footwear_sets_are_conjunctions_in_a_disjunction() {
    let sets = vec![ids(&["a", "b"]), ids(&["c"])];
    let wearing = |item: &str, tags: &[&str]| FootwearDescriptor::new(id(item), tags.iter().map(|t| id(t)));

    assert!(matcher::matches_any(&wearing("a", &["b", "x"]), &sets));
    assert!(matcher::matches_any(&wearing("c", &[]), &sets));
    assert!(matcher::matches_any(&wearing("b", &["c"]), &sets));
    assert!(!matcher::matches_any(&wearing("a", &[]), &sets));
    assert!(!matcher::matches_any(&wearing("b", &[]), &sets));
}

#[test]
fn earlier_rule_wins_for_matching_footwear() {
    let booted = Rule::builder(id("grass_block"), id("coarse_dirt"))
        .name("booted")
        .only_if_footwear(vec![ids(&["iron_boots"])])
        .build()
        .unwrap();
    let dispatcher = dispatcher(vec![booted, grass_rule(1, 0)], 8);

    let mut world = Flat::with(ORIGIN, "grass_block");
    let mut player = Walker::new("player", AgentCategory::Misc);
    player.footwear = FootwearDescriptor::new(id("iron_boots"), []);
    let command = dispatcher.agent_moved(&mut world, &player, &Tick(0)).unwrap();
    assert_eq!(command.rule_name, "booted");
    assert_eq!(world.terrain_at(ORIGIN), Some(id("coarse_dirt")));

    let mut world = Flat::with(ORIGIN, "grass_block");
    let barefoot = Walker::new("player", AgentCategory::Misc);
    let command = dispatcher.agent_moved(&mut world, &barefoot, &Tick(0)).unwrap();
    assert_eq!(command.rule_name, "grass");
    assert_eq!(world.terrain_at(ORIGIN), Some(id("dirt_path")));
}

#[test]
fn default_configuration_turns_grass_into_path() {
    let config = TrailblazerConfig::embedded_default().unwrap();
    let dispatcher = StepDispatcher::new(Arc::new(SharedEngine::from_config(&config).unwrap()));
    let mut world = Flat::with(ORIGIN, "grass_block");
    let player = Walker::new("player", AgentCategory::Misc);

    let mut changes = Vec::new();
    for now in 0..40 {
        if let Some(command) = dispatcher.agent_moved(&mut world, &player, &Tick(now)) {
            changes.push(command.to.to_string());
        }
    }
    assert_eq!(changes, vec!["minecraft:dirt", "minecraft:dirt_path"]);
    assert_eq!(world.terrain_at(ORIGIN), Some(id("dirt_path")));
}

#[test]
fn category_rule_from_config_applies_to_creatures() {
    let config = TrailblazerConfig::embedded_default().unwrap();
    let shared = SharedEngine::from_config(&config).unwrap();
    let farmland = id("farmland");
    let cow = id("cow");
    let barefoot = FootwearDescriptor::barefoot();

    let fired: Vec<bool> = (0..3)
        .map(|now| {
            shared
                .on_step(&StepEvent {
                    agent_id: &cow,
                    category: AgentCategory::Creature,
                    position: ORIGIN,
                    terrain_id: &farmland,
                    footwear: &barefoot,
                    now,
                })
                .is_some()
        })
        .collect();
    assert_eq!(fired, vec![false, false, true]);
}

#[test]
fn reconfigure_discards_progress() {
    let dispatcher = dispatcher(vec![grass_rule(3, 0)], 8);
    let mut world = Flat::with(ORIGIN, "grass_block");
    let player = Walker::new("player", AgentCategory::Misc);

    dispatcher.agent_moved(&mut world, &player, &Tick(0));
    dispatcher.agent_moved(&mut world, &player, &Tick(1));
    dispatcher
        .engine()
        .configure(RuleSet::build(vec![grass_rule(3, 0)]), 8);

    assert_eq!(recorded(&dispatcher, ORIGIN), None);
    assert_eq!(dispatcher.agent_moved(&mut world, &player, &Tick(2)), None);
    assert_eq!(recorded(&dispatcher, ORIGIN), Some(1));
}
