//! The immutable, pre-indexed rule table.
//!
//! A [`RuleSet`] is built once from configuration and then only read. It
//! keeps the rules in configuration order and three indexes over them:
//!
//! - by terrain: `HashMap<Identifier, Vec<RuleIndex>>`, each bucket in
//!   configuration order because the first matching rule wins;
//! - by agent identity: `HashMap<Identifier, HashSet<RuleIndex>>`;
//! - by agent category: `HashMap<AgentCategory, HashSet<RuleIndex>>`.
//!
//! The agent indexes are unordered and serve only as fast-reject filters.
//! Only non-empty buckets are ever stored, so a successful lookup always
//! yields at least one rule.

use std::collections::{HashMap, HashSet};

use trailblazer_types::{AgentCategory, Identifier};

use crate::error::RuleError;
use crate::rule::{Rule, RuleSpec};

/// Position of a rule within its [`RuleSet`], i.e. its configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleIndex(usize);

impl RuleIndex {
    /// The zero-based configuration position.
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Immutable rule table with terrain, agent, and category indexes.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    by_terrain: HashMap<Identifier, Vec<RuleIndex>>,
    by_agent: HashMap<Identifier, HashSet<RuleIndex>>,
    by_category: HashMap<AgentCategory, HashSet<RuleIndex>>,
}

impl RuleSet {
    /// Index an ordered sequence of already-validated rules.
    pub fn build(rules: Vec<Rule>) -> Self {
        let mut by_terrain: HashMap<Identifier, Vec<RuleIndex>> = HashMap::new();
        let mut by_agent: HashMap<Identifier, HashSet<RuleIndex>> = HashMap::new();
        let mut by_category: HashMap<AgentCategory, HashSet<RuleIndex>> = HashMap::new();

        for (position, rule) in rules.iter().enumerate() {
            let index = RuleIndex(position);
            by_terrain
                .entry(rule.source_id().clone())
                .or_default()
                .push(index);
            for agent_id in rule.agent_ids() {
                by_agent.entry(agent_id.clone()).or_default().insert(index);
            }
            for &category in rule.agent_categories() {
                by_category.entry(category).or_default().insert(index);
            }
        }

        tracing::debug!(
            rules = rules.len(),
            terrains = by_terrain.len(),
            agents = by_agent.len(),
            categories = by_category.len(),
            "rule set indexed"
        );

        Self {
            rules,
            by_terrain,
            by_agent,
            by_category,
        }
    }

    /// Resolve and index raw configuration entries.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] encountered, in configuration order.
    pub fn from_specs(specs: Vec<RuleSpec>) -> Result<Self, RuleError> {
        let rules = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Rule::from_spec(index, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::build(rules))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules in configuration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule by index.
    pub fn get(&self, index: RuleIndex) -> Option<&Rule> {
        self.rules.get(index.0)
    }

    /// Whether any rule targets an agent category.
    pub fn has_category_rules(&self) -> bool {
        !self.by_category.is_empty()
    }

    /// Rules watching `terrain_id`, in configuration order.
    ///
    /// A single map lookup; terrain nobody watches yields an empty iterator.
    pub fn candidates_for_terrain<'a>(
        &'a self,
        terrain_id: &Identifier,
    ) -> impl Iterator<Item = (RuleIndex, &'a Rule)> + 'a {
        let bucket: &'a [RuleIndex] = self
            .by_terrain
            .get(terrain_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        bucket
            .iter()
            .filter_map(move |&index| self.get(index).map(|rule| (index, rule)))
    }

    /// Whether any rule watches `terrain_id`.
    pub fn watches_terrain(&self, terrain_id: &Identifier) -> bool {
        self.by_terrain.contains_key(terrain_id)
    }

    /// Rules that apply to an agent, by identity or by category.
    ///
    /// The category index is consulted only when at least one rule uses
    /// categories, so deployments without category rules pay nothing for
    /// them. The returned view borrows the index buckets; nothing is
    /// allocated.
    pub fn rules_for_agent(&self, agent_id: &Identifier, category: AgentCategory) -> AgentRules<'_> {
        let by_category = if self.by_category.is_empty() {
            None
        } else {
            self.by_category.get(&category)
        };
        AgentRules {
            by_id: self.by_agent.get(agent_id),
            by_category,
        }
    }
}

/// Borrowed union of the identity and category buckets for one agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentRules<'a> {
    by_id: Option<&'a HashSet<RuleIndex>>,
    by_category: Option<&'a HashSet<RuleIndex>>,
}

impl AgentRules<'_> {
    /// Whether no rule applies to the agent at all.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_none_or(HashSet::is_empty) && self.by_category.is_none_or(HashSet::is_empty)
    }

    /// Whether the rule at `index` applies to the agent.
    pub fn contains(&self, index: RuleIndex) -> bool {
        self.by_id.is_some_and(|set| set.contains(&index))
            || self.by_category.is_some_and(|set| set.contains(&index))
    }

    /// Iterate the applicable rule indexes without duplicates, in no
    /// particular order.
    pub fn iter(&self) -> impl Iterator<Item = RuleIndex> + '_ {
        let by_id = self.by_id.into_iter().flatten().copied();
        let by_category = self
            .by_category
            .into_iter()
            .flatten()
            .copied()
            .filter(|index| !self.by_id.is_some_and(|set| set.contains(index)));
        by_id.chain(by_category)
    }
}
