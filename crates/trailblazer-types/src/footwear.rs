//! Footwear descriptors.
//!
//! A [`FootwearDescriptor`] is everything a rule can know about what an
//! agent has on its feet: the item's own identifier plus one identifier per
//! enchantment-like tag attached to it. Bare feet are the single sentinel
//! [`Identifier::none`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::Identifier;

/// The set of identifiers describing an agent's current footwear.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FootwearDescriptor {
    ids: BTreeSet<Identifier>,
}

impl FootwearDescriptor {
    /// Describe an agent with nothing on its feet.
    pub fn barefoot() -> Self {
        Self {
            ids: BTreeSet::from([Identifier::none()]),
        }
    }

    /// Describe a footwear item and its attached tags.
    pub fn new(item: Identifier, tags: impl IntoIterator<Item = Identifier>) -> Self {
        let mut ids: BTreeSet<Identifier> = tags.into_iter().collect();
        ids.insert(item);
        Self { ids }
    }

    /// Whether this describes bare feet.
    pub fn is_barefoot(&self) -> bool {
        self.ids.len() == 1 && self.ids.contains(&Identifier::none())
    }

    /// Whether this descriptor carries the given identifier.
    pub fn contains(&self, id: &Identifier) -> bool {
        self.ids.contains(id)
    }

    /// Superset test: every identifier in `required` is present here.
    ///
    /// An empty `required` set is trivially satisfied.
    pub fn contains_all(&self, required: &BTreeSet<Identifier>) -> bool {
        required.iter().all(|id| self.ids.contains(id))
    }

    /// Iterate over the identifiers in this descriptor.
    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.ids.iter()
    }
}

impl Default for FootwearDescriptor {
    fn default() -> Self {
        Self::barefoot()
    }
}
