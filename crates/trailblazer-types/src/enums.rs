//! Enumeration types shared across the Trailblazer workspace.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse classification of an agent type.
///
/// Mirrors the host's spawn groups. Rules may target a whole category
/// instead of listing individual agent identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentCategory {
    /// Hostile mobs.
    Monster,
    /// Passive land animals.
    Creature,
    /// Ambient fliers such as bats.
    Ambient,
    /// Axolotls.
    Axolotls,
    /// Creatures that live in underground water.
    UndergroundWaterCreature,
    /// Aquatic creatures such as squid and dolphins.
    WaterCreature,
    /// Ambient aquatic life such as fish.
    WaterAmbient,
    /// Everything else, including players.
    Misc,
}

impl AgentCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Monster,
        Self::Creature,
        Self::Ambient,
        Self::Axolotls,
        Self::UndergroundWaterCreature,
        Self::WaterCreature,
        Self::WaterAmbient,
        Self::Misc,
    ];

    /// The configuration spelling of this category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monster => "MONSTER",
            Self::Creature => "CREATURE",
            Self::Ambient => "AMBIENT",
            Self::Axolotls => "AXOLOTLS",
            Self::UndergroundWaterCreature => "UNDERGROUND_WATER_CREATURE",
            Self::WaterCreature => "WATER_CREATURE",
            Self::WaterAmbient => "WATER_AMBIENT",
            Self::Misc => "MISC",
        }
    }
}

impl fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name an [`AgentCategory`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agent category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for AgentCategory {
    type Err = UnknownCategory;

    /// Case-insensitive parse of the configuration spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}
