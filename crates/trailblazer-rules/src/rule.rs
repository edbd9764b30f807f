//! Path-formation rule definitions.
//!
//! A [`Rule`] says: when an agent of a given identity or category steps on
//! terrain `source_id` often enough, turn that cell into `target_id`. Rules
//! are immutable once constructed. All optional configuration is resolved
//! to concrete defaults in exactly one place, [`Rule::from_spec`], so the
//! per-step code never has to deal with absent values.
//!
//! # Defaults
//!
//! | Field           | Default              |
//! |-----------------|----------------------|
//! | `name`          | `rule-{index}`       |
//! | `step_count`    | [`DEFAULT_STEP_COUNT`] |
//! | `timeout_ticks` | [`DEFAULT_TIMEOUT_TICKS`] |
//! | `entity_ids`    | [`DEFAULT_AGENT_ID`] |

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use trailblazer_types::{AgentCategory, Identifier};

use crate::error::RuleError;

/// Traversals needed before transition when a rule does not say.
///
/// Counting starts at 1, so 0 fires on the first step just like 1 does.
pub const DEFAULT_STEP_COUNT: u32 = 0;

/// Progress timeout when a rule does not say: one hour at 20 ticks/second.
pub const DEFAULT_TIMEOUT_TICKS: u64 = 72_000;

/// Agent type a rule applies to when it lists none.
pub const DEFAULT_AGENT_ID: &str = "minecraft:player";

/// Raw rule shape as written in configuration.
///
/// Every field is optional here; [`Rule::from_spec`] resolves defaults and
/// validates. Both `snake_case` and the host's `camelCase` keys are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Diagnostic label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Terrain the rule watches.
    #[serde(default, alias = "blockId", skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,

    /// Terrain to transition into.
    #[serde(default, alias = "nextBlockId", skip_serializing_if = "Option::is_none")]
    pub next_block_id: Option<String>,

    /// Qualifying traversals required before transition.
    #[serde(default, alias = "stepCount", skip_serializing_if = "Option::is_none")]
    pub step_count: Option<u32>,

    /// Maximum gap between traversals before progress resets (0 = never).
    #[serde(default, alias = "timeoutTicks", skip_serializing_if = "Option::is_none")]
    pub timeout_ticks: Option<u64>,

    /// Agent types the rule applies to.
    #[serde(default, alias = "entityIds", skip_serializing_if = "Option::is_none")]
    pub entity_ids: Option<Vec<String>>,

    /// Agent categories the rule applies to.
    #[serde(default, alias = "spawnGroups", skip_serializing_if = "Option::is_none")]
    pub spawn_groups: Option<Vec<String>>,

    /// Footwear sets that suppress the rule.
    #[serde(default, alias = "skipIfBoots", skip_serializing_if = "Option::is_none")]
    pub skip_if_boots: Option<Vec<Vec<String>>>,

    /// Footwear sets required for the rule.
    #[serde(default, alias = "onlyIfBoots", skip_serializing_if = "Option::is_none")]
    pub only_if_boots: Option<Vec<Vec<String>>>,
}

/// A fully resolved, validated path-formation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    source_id: Identifier,
    target_id: Identifier,
    step_threshold: u32,
    timeout_ticks: u64,
    agent_ids: BTreeSet<Identifier>,
    agent_categories: BTreeSet<AgentCategory>,
    skip_if_footwear: Vec<BTreeSet<Identifier>>,
    only_if_footwear: Vec<BTreeSet<Identifier>>,
}

impl Rule {
    /// Start building a rule in code, with every optional field at its
    /// default.
    pub fn builder(source_id: Identifier, target_id: Identifier) -> RuleBuilder {
        RuleBuilder::new(source_id, target_id)
    }

    /// Resolve a configuration entry into a rule.
    ///
    /// `index` is the entry's position in the configuration and only feeds
    /// the default name.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if the source or target id is missing, any
    /// identifier or category fails to parse, or both footwear lists are
    /// populated.
    pub fn from_spec(index: usize, spec: RuleSpec) -> Result<Self, RuleError> {
        let name = spec.name.unwrap_or_else(|| format!("rule-{index}"));

        let Some(raw_source) = spec.block_id else {
            return Err(RuleError::MissingSourceId { rule: name });
        };
        let Some(raw_target) = spec.next_block_id else {
            return Err(RuleError::MissingTargetId { rule: name });
        };
        let source_id = parse_id(&name, "block_id", &raw_source)?;
        let target_id = parse_id(&name, "next_block_id", &raw_target)?;

        let mut builder = RuleBuilder::new(source_id, target_id).name(name.clone());
        if let Some(step_count) = spec.step_count {
            builder = builder.step_threshold(step_count);
        }
        if let Some(timeout_ticks) = spec.timeout_ticks {
            builder = builder.timeout_ticks(timeout_ticks);
        }
        if let Some(raw_ids) = spec.entity_ids {
            builder = builder.agent_ids(parse_id_set(&name, "entity_ids", &raw_ids)?);
        }
        if let Some(raw_groups) = spec.spawn_groups {
            let categories = raw_groups
                .iter()
                .map(|raw| {
                    raw.parse::<AgentCategory>()
                        .map_err(|source| RuleError::UnknownCategory {
                            rule: name.clone(),
                            source,
                        })
                })
                .collect::<Result<BTreeSet<_>, _>>()?;
            builder = builder.agent_categories(categories);
        }
        if let Some(raw_sets) = spec.skip_if_boots {
            builder = builder.skip_if_footwear(parse_id_set_list(&name, "skip_if_boots", &raw_sets)?);
        }
        if let Some(raw_sets) = spec.only_if_boots {
            builder = builder.only_if_footwear(parse_id_set_list(&name, "only_if_boots", &raw_sets)?);
        }
        builder.build()
    }

    /// Diagnostic label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Terrain this rule watches.
    pub const fn source_id(&self) -> &Identifier {
        &self.source_id
    }

    /// Terrain this rule transitions into.
    pub const fn target_id(&self) -> &Identifier {
        &self.target_id
    }

    /// Qualifying traversals required; checked as `count >= threshold`.
    pub const fn step_threshold(&self) -> u32 {
        self.step_threshold
    }

    /// Maximum tick gap between traversals; 0 means never.
    pub const fn timeout_ticks(&self) -> u64 {
        self.timeout_ticks
    }

    /// Specific agent types this rule applies to.
    pub const fn agent_ids(&self) -> &BTreeSet<Identifier> {
        &self.agent_ids
    }

    /// Agent categories this rule applies to.
    pub const fn agent_categories(&self) -> &BTreeSet<AgentCategory> {
        &self.agent_categories
    }

    /// Footwear sets (disjunction of conjunctions) that suppress this rule.
    pub fn skip_if_footwear(&self) -> &[BTreeSet<Identifier>] {
        &self.skip_if_footwear
    }

    /// Footwear sets (disjunction of conjunctions) this rule requires.
    pub fn only_if_footwear(&self) -> &[BTreeSet<Identifier>] {
        &self.only_if_footwear
    }
}

/// Incremental constructor for [`Rule`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    name: Option<String>,
    source_id: Identifier,
    target_id: Identifier,
    step_threshold: u32,
    timeout_ticks: u64,
    agent_ids: Option<BTreeSet<Identifier>>,
    agent_categories: BTreeSet<AgentCategory>,
    skip_if_footwear: Vec<BTreeSet<Identifier>>,
    only_if_footwear: Vec<BTreeSet<Identifier>>,
}

impl RuleBuilder {
    fn new(source_id: Identifier, target_id: Identifier) -> Self {
        Self {
            name: None,
            source_id,
            target_id,
            step_threshold: DEFAULT_STEP_COUNT,
            timeout_ticks: DEFAULT_TIMEOUT_TICKS,
            agent_ids: None,
            agent_categories: BTreeSet::new(),
            skip_if_footwear: Vec::new(),
            only_if_footwear: Vec::new(),
        }
    }

    /// Set the diagnostic label.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the number of traversals required.
    #[must_use]
    pub const fn step_threshold(mut self, step_threshold: u32) -> Self {
        self.step_threshold = step_threshold;
        self
    }

    /// Set the progress timeout in ticks (0 disables it).
    #[must_use]
    pub const fn timeout_ticks(mut self, timeout_ticks: u64) -> Self {
        self.timeout_ticks = timeout_ticks;
        self
    }

    /// Replace the agent type set.
    #[must_use]
    pub fn agent_ids(mut self, ids: impl IntoIterator<Item = Identifier>) -> Self {
        self.agent_ids = Some(ids.into_iter().collect());
        self
    }

    /// Replace the agent category set.
    #[must_use]
    pub fn agent_categories(mut self, categories: impl IntoIterator<Item = AgentCategory>) -> Self {
        self.agent_categories = categories.into_iter().collect();
        self
    }

    /// Replace the suppressing footwear sets.
    #[must_use]
    pub fn skip_if_footwear(mut self, sets: Vec<BTreeSet<Identifier>>) -> Self {
        self.skip_if_footwear = sets;
        self
    }

    /// Replace the required footwear sets.
    #[must_use]
    pub fn only_if_footwear(mut self, sets: Vec<BTreeSet<Identifier>>) -> Self {
        self.only_if_footwear = sets;
        self
    }

    /// Validate and produce the rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::ConflictingFootwear`] if both footwear lists are
    /// non-empty.
    pub fn build(self) -> Result<Rule, RuleError> {
        let name = self.name.unwrap_or_else(|| "unnamed".to_owned());
        if !self.skip_if_footwear.is_empty() && !self.only_if_footwear.is_empty() {
            return Err(RuleError::ConflictingFootwear { rule: name });
        }
        let agent_ids = match self.agent_ids {
            Some(ids) => ids,
            None => BTreeSet::from([default_agent_id()]),
        };
        Ok(Rule {
            name,
            source_id: self.source_id,
            target_id: self.target_id,
            step_threshold: self.step_threshold,
            timeout_ticks: self.timeout_ticks,
            agent_ids,
            agent_categories: self.agent_categories,
            skip_if_footwear: self.skip_if_footwear,
            only_if_footwear: self.only_if_footwear,
        })
    }
}

fn default_agent_id() -> Identifier {
    Identifier::parse(DEFAULT_AGENT_ID).unwrap_or_else(|_| Identifier::none())
}

fn parse_id(rule: &str, field: &'static str, raw: &str) -> Result<Identifier, RuleError> {
    Identifier::parse(raw).map_err(|source| RuleError::InvalidIdentifier {
        rule: rule.to_owned(),
        field,
        source,
    })
}

fn parse_id_set(
    rule: &str,
    field: &'static str,
    raw: &[String],
) -> Result<BTreeSet<Identifier>, RuleError> {
    raw.iter().map(|id| parse_id(rule, field, id)).collect()
}

fn parse_id_set_list(
    rule: &str,
    field: &'static str,
    raw: &[Vec<String>],
) -> Result<Vec<BTreeSet<Identifier>>, RuleError> {
    raw.iter().map(|set| parse_id_set(rule, field, set)).collect()
}
