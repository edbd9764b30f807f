//! Host-facing seams: terrain access, agent view, clock, and the movement
//! dispatcher that ties them to a [`SharedEngine`].
//!
//! The engine itself is pure: it turns a [`StepEvent`] into an optional
//! [`TransitionCommand`]. [`StepDispatcher`] is the glue a host calls from
//! its movement hook. It decides whether the agent is standing on solid
//! ground, reads the cell underneath, runs the engine, and applies the
//! command. Applying is fire-and-forget: a failed write is logged and the
//! cleared history is not restored.

use std::sync::Arc;

use trailblazer_types::{AgentCategory, FootwearDescriptor, Identifier, Position};

use crate::engine::{StepEvent, TransitionCommand};
use crate::shared::SharedEngine;

/// Errors a host world may report when asked to change terrain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The world does not know the requested terrain.
    #[error("unknown terrain: {0}")]
    UnknownTerrain(Identifier),

    /// The position lies outside the loaded world.
    #[error("position out of bounds: {0}")]
    OutOfBounds(Position),
}

/// Read and write access to terrain cells.
pub trait TerrainAccess {
    /// The terrain at `position`, or `None` if the cell is not loaded.
    fn terrain_at(&self, position: Position) -> Option<Identifier>;

    /// Replace the terrain at `position`.
    ///
    /// # Errors
    ///
    /// Returns a [`WorldError`] if the terrain is unknown or the position
    /// cannot be written.
    fn set_terrain(&mut self, position: Position, terrain: &Identifier) -> Result<(), WorldError>;
}

/// What the engine needs to know about a moving agent.
pub trait AgentView {
    /// The agent's type identifier.
    fn agent_id(&self) -> &Identifier;

    /// The agent's coarse category.
    fn category(&self) -> AgentCategory;

    /// What the agent has on its feet.
    fn footwear(&self) -> &FootwearDescriptor;

    /// Exact position of the agent's feet.
    fn feet_position(&self) -> (f64, f64, f64);
}

/// Source of the current tick.
pub trait Clock {
    /// Current tick. Expected to be non-decreasing.
    fn now(&self) -> u64;
}

/// Feeds agent movement into a [`SharedEngine`] and applies the result.
#[derive(Debug, Clone)]
pub struct StepDispatcher {
    engine: Arc<SharedEngine>,
}

impl StepDispatcher {
    /// Create a dispatcher over a shared engine.
    pub const fn new(engine: Arc<SharedEngine>) -> Self {
        Self { engine }
    }

    /// The engine this dispatcher feeds.
    pub const fn engine(&self) -> &Arc<SharedEngine> {
        &self.engine
    }

    /// Handle one movement of `agent`.
    ///
    /// Returns the command that was issued, if any, whether or not the
    /// world accepted it.
    pub fn agent_moved<W, A, C>(&self, world: &mut W, agent: &A, clock: &C) -> Option<TransitionCommand>
    where
        W: TerrainAccess + ?Sized,
        A: AgentView + ?Sized,
        C: Clock + ?Sized,
    {
        if !self.engine.is_tracked(agent.agent_id(), agent.category()) {
            return None;
        }

        // Only an agent whose feet rest exactly on a block boundary is
        // standing on the block below; jumping or falling agents are not.
        let (x, y, z) = agent.feet_position();
        #[allow(clippy::float_cmp)]
        let grounded = y.floor() == y;
        if !grounded {
            return None;
        }

        let position = Position::containing(x, y, z).below();
        let terrain = world.terrain_at(position)?;
        let command = self.engine.on_step(&StepEvent {
            agent_id: agent.agent_id(),
            category: agent.category(),
            position,
            terrain_id: &terrain,
            footwear: agent.footwear(),
            now: clock.now(),
        })?;

        if let Err(error) = world.set_terrain(command.position, &command.to) {
            tracing::warn!(
                position = %command.position,
                to = %command.to,
                rule = %command.rule_name,
                %error,
                "terrain transition failed"
            );
        }
        Some(command)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use trailblazer_rules::{Rule, RuleSet};

    use super::*;
    use crate::engine::TransitionEngine;

    fn id(raw: &str) -> Identifier {
        Identifier::parse(raw).unwrap()
    }

    #[derive(Default)]
    struct Cells {
        cells: HashMap<Position, Identifier>,
        read_only: bool,
    }

    impl TerrainAccess for Cells {
        fn terrain_at(&self, position: Position) -> Option<Identifier> {
            self.cells.get(&position).cloned()
        }

        fn set_terrain(&mut self, position: Position, terrain: &Identifier) -> Result<(), WorldError> {
            if self.read_only {
                return Err(WorldError::OutOfBounds(position));
            }
            self.cells.insert(position, terrain.clone());
            Ok(())
        }
    }

    struct Player {
        id: Identifier,
        footwear: FootwearDescriptor,
        at: (f64, f64, f64),
    }

    impl AgentView for Player {
        fn agent_id(&self) -> &Identifier {
            &self.id
        }

        fn category(&self) -> AgentCategory {
            AgentCategory::Misc
        }

        fn footwear(&self) -> &FootwearDescriptor {
            &self.footwear
        }

        fn feet_position(&self) -> (f64, f64, f64) {
            self.at
        }
    }

    struct Tick(u64);

    impl Clock for Tick {
        fn now(&self) -> u64 {
            self.0
        }
    }

    fn dispatcher() -> StepDispatcher {
        let rule = Rule::builder(id("grass_block"), id("dirt_path"))
            .step_threshold(2)
            .build()
            .unwrap();
        let engine = TransitionEngine::new(RuleSet::build(vec![rule]), 8);
        StepDispatcher::new(Arc::new(SharedEngine::new(engine)))
    }

    fn player(at: (f64, f64, f64)) -> Player {
        Player {
            id: id("player"),
            footwear: FootwearDescriptor::barefoot(),
            at,
        }
    }

    #[test]
    fn grounded_agent_wears_down_block_below() {
        let dispatcher = dispatcher();
        let mut world = Cells::default();
        let below = Position::new(3, 63, -1);
        world.cells.insert(below, id("grass_block"));
        let walker = player((3.4, 64.0, -0.2));

        assert_eq!(dispatcher.agent_moved(&mut world, &walker, &Tick(0)), None);
        let command = dispatcher.agent_moved(&mut world, &walker, &Tick(5)).unwrap();
        assert_eq!(command.position, below);
        assert_eq!(world.cells.get(&below), Some(&id("dirt_path")));
    }

    #[test]
    fn airborne_agent_is_ignored() {
        let dispatcher = dispatcher();
        let mut world = Cells::default();
        world.cells.insert(Position::new(0, 63, 0), id("grass_block"));
        let jumper = player((0.5, 64.25, 0.5));
        for now in 0..4 {
            assert_eq!(dispatcher.agent_moved(&mut world, &jumper, &Tick(now)), None);
        }
        assert!(dispatcher.engine().with_engine(|engine| engine.history().is_empty()));
    }

    #[test]
    fn unloaded_cell_is_ignored() {
        let dispatcher = dispatcher();
        let mut world = Cells::default();
        assert_eq!(dispatcher.agent_moved(&mut world, &player((0.0, 1.0, 0.0)), &Tick(0)), None);
    }

    #[test]
    fn failed_write_still_clears_history() {
        let dispatcher = dispatcher();
        let below = Position::new(0, 0, 0);
        let mut world = Cells {
            read_only: true,
            ..Cells::default()
        };
        world.cells.insert(below, id("grass_block"));
        let walker = player((0.5, 1.0, 0.5));

        dispatcher.agent_moved(&mut world, &walker, &Tick(0));
        assert!(dispatcher.agent_moved(&mut world, &walker, &Tick(1)).is_some());
        assert_eq!(world.cells.get(&below), Some(&id("grass_block")));
        assert!(dispatcher.engine().with_engine(|engine| engine.history().is_empty()));
    }
}
