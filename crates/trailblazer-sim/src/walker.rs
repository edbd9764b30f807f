//! Wandering agents.
//!
//! Each walker takes one random step per tick to a neighbouring cell,
//! staying inside the grid. Now and then a walker jumps; while airborne
//! its feet are not on a block boundary and the step leaves no trace.

use rand::Rng;
use trailblazer_core::AgentView;
use trailblazer_types::{AgentCategory, FootwearDescriptor, Identifier, IdentifierError};

use crate::grid::GROUND_Y;

/// Chance per tick that a walker is mid-jump.
const JUMP_CHANCE: f64 = 0.1;

/// A simulated agent.
#[derive(Debug, Clone)]
pub struct Walker {
    id: Identifier,
    category: AgentCategory,
    footwear: FootwearDescriptor,
    x: i32,
    z: i32,
    airborne: bool,
}

impl Walker {
    /// Create a walker standing on cell `(x, z)`.
    pub const fn new(
        id: Identifier,
        category: AgentCategory,
        footwear: FootwearDescriptor,
        x: i32,
        z: i32,
    ) -> Self {
        Self {
            id,
            category,
            footwear,
            x,
            z,
            airborne: false,
        }
    }

    /// Take one random step, staying within `0..width` by `0..depth`.
    pub fn wander(&mut self, rng: &mut impl Rng, width: i32, depth: i32) {
        let (dx, dz) = match rng.random_range(0..4_u8) {
            0 => (1, 0),
            1 => (-1, 0),
            2 => (0, 1),
            _ => (0, -1),
        };
        self.x = self.x.saturating_add(dx).clamp(0, width.saturating_sub(1).max(0));
        self.z = self.z.saturating_add(dz).clamp(0, depth.saturating_sub(1).max(0));
        self.airborne = rng.random_bool(JUMP_CHANCE);
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
        let feet = f64::from(GROUND_Y) + if self.airborne { 1.42 } else { 1.0 };
        (f64::from(self.x) + 0.5, feet, f64::from(self.z) + 0.5)
    }
}

/// The kinds of walker the simulation spawns, in rotation.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Barefoot,
    SoftBoots,
    IronBoots,
    Cow,
    Zombie,
}

const ROTATION: [Kind; 8] = [
    Kind::Barefoot,
    Kind::Barefoot,
    Kind::SoftBoots,
    Kind::IronBoots,
    Kind::Barefoot,
    Kind::Cow,
    Kind::Cow,
    Kind::Zombie,
];

/// Spawn `count` walkers at random cells.
///
/// Mostly players, some in boots, plus cows and zombies.
///
/// # Errors
///
/// Returns an [`IdentifierError`] only if a built-in identifier is malformed.
pub fn spawn_walkers(
    rng: &mut impl Rng,
    count: usize,
    width: i32,
    depth: i32,
) -> Result<Vec<Walker>, IdentifierError> {
    let player = Identifier::parse("minecraft:player")?;
    let soft_boots = FootwearDescriptor::new(
        Identifier::parse("minecraft:leather_boots")?,
        [Identifier::parse("minecraft:feather_falling")?],
    );
    let iron_boots = FootwearDescriptor::new(Identifier::parse("minecraft:iron_boots")?, []);
    let cow = Identifier::parse("minecraft:cow")?;
    let zombie = Identifier::parse("minecraft:zombie")?;

    let walkers = ROTATION
        .iter()
        .cycle()
        .take(count)
        .map(|kind| {
            let (id, category, footwear) = match kind {
                Kind::Barefoot => (player.clone(), AgentCategory::Misc, FootwearDescriptor::barefoot()),
                Kind::SoftBoots => (player.clone(), AgentCategory::Misc, soft_boots.clone()),
                Kind::IronBoots => (player.clone(), AgentCategory::Misc, iron_boots.clone()),
                Kind::Cow => (cow.clone(), AgentCategory::Creature, FootwearDescriptor::barefoot()),
                Kind::Zombie => (zombie.clone(), AgentCategory::Monster, FootwearDescriptor::barefoot()),
            };
            let x = rng.random_range(0..width.max(1));
            let z = rng.random_range(0..depth.max(1));
            Walker::new(id, category, footwear, x, z)
        })
        .collect();
    Ok(walkers)
}
