//! A flat rectangular terrain grid and the tick clock that drives it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use trailblazer_core::{Clock, TerrainAccess, WorldError};
use trailblazer_types::{Identifier, Position};

/// Y coordinate of the terrain layer. Agents stand one cell above it.
pub const GROUND_Y: i32 = 63;

/// Single-layer terrain grid spanning `0..width` by `0..depth`.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: i32,
    depth: i32,
    cells: HashMap<Position, Identifier>,
    palette: BTreeSet<Identifier>,
}

impl GridWorld {
    /// Create a grid covered in `base` terrain.
    pub fn new(width: i32, depth: i32, base: &Identifier) -> Self {
        let cells = (0..width)
            .flat_map(|x| (0..depth).map(move |z| Position::new(x, GROUND_Y, z)))
            .map(|position| (position, base.clone()))
            .collect();
        Self {
            width,
            depth,
            cells,
            palette: BTreeSet::from([base.clone()]),
        }
    }

    /// Allow `terrain` to be placed on the grid.
    pub fn register_terrain(&mut self, terrain: Identifier) {
        self.palette.insert(terrain);
    }

    /// Cover the rectangle `[x0, x1) x [z0, z1)` with `terrain`.
    pub fn fill(&mut self, (x0, x1): (i32, i32), (z0, z1): (i32, i32), terrain: &Identifier) {
        self.register_terrain(terrain.clone());
        for x in x0.max(0)..x1.min(self.width) {
            for z in z0.max(0)..z1.min(self.depth) {
                self.cells.insert(Position::new(x, GROUND_Y, z), terrain.clone());
            }
        }
    }

    /// Grid extent along x.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid extent along z.
    pub const fn depth(&self) -> i32 {
        self.depth
    }

    /// Number of cells per terrain type.
    pub fn summary(&self) -> BTreeMap<Identifier, usize> {
        let mut counts = BTreeMap::new();
        for terrain in self.cells.values() {
            let count: &mut usize = counts.entry(terrain.clone()).or_default();
            *count = count.saturating_add(1);
        }
        counts
    }
}

impl TerrainAccess for GridWorld {
    fn terrain_at(&self, position: Position) -> Option<Identifier> {
        self.cells.get(&position).cloned()
    }

    fn set_terrain(&mut self, position: Position, terrain: &Identifier) -> Result<(), WorldError> {
        if !self.palette.contains(terrain) {
            return Err(WorldError::UnknownTerrain(terrain.clone()));
        }
        let Some(cell) = self.cells.get_mut(&position) else {
            return Err(WorldError::OutOfBounds(position));
        };
        *cell = terrain.clone();
        Ok(())
    }
}

/// Monotonic tick counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickClock {
    tick: u64,
}

impl TickClock {
    /// Move to the next tick.
    pub const fn advance(&mut self) {
        self.tick = self.tick.saturating_add(1);
    }
}

impl Clock for TickClock {
    fn now(&self) -> u64 {
        self.tick
    }
}
