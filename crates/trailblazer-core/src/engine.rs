//! The per-step transition engine.
//!
//! [`TransitionEngine::on_step`] runs once per movement event:
//!
//! 1. Fast reject: no rule applies to this agent at all. This is the common
//!    case and costs one or two hash probes, with no allocation or logging.
//! 2. Look up the rules watching the terrain under the agent. Terrain no
//!    rule watches is rejected here too.
//! 3. Take the first of those, in configuration order, that applies to the
//!    agent and whose footwear constraints admit what it is wearing.
//! 4. Advance the position's history under that rule.
//! 5. If the threshold was crossed, return a [`TransitionCommand`].
//!
//! The engine never touches the world itself. The returned command is the
//! only externally visible effect.

use trailblazer_rules::{RuleError, RuleSet, matcher};
use trailblazer_types::{AgentCategory, FootwearDescriptor, Identifier, Position};

use crate::config::TrailblazerConfig;
use crate::history::{AdvanceOutcome, HistoryCache};

/// One movement event, as delivered by the host.
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'a> {
    /// The agent's type identifier.
    pub agent_id: &'a Identifier,
    /// The agent's coarse category.
    pub category: AgentCategory,
    /// The cell the agent is standing on.
    pub position: Position,
    /// The terrain currently at `position`.
    pub terrain_id: &'a Identifier,
    /// What the agent has on its feet.
    pub footwear: &'a FootwearDescriptor,
    /// Host tick at which the step happened.
    pub now: u64,
}

/// Instruction to the host to change one cell's terrain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCommand {
    /// Cell to change.
    pub position: Position,
    /// Name of the rule that fired.
    pub rule_name: String,
    /// Terrain the cell had when the rule fired.
    pub from: Identifier,
    /// Terrain to set.
    pub to: Identifier,
    /// Traversal count that crossed the threshold.
    pub count: u32,
}

/// Rule table plus step history, evaluated once per movement event.
#[derive(Debug)]
pub struct TransitionEngine {
    rules: RuleSet,
    history: HistoryCache,
}

impl TransitionEngine {
    /// Create an engine with an empty history of the given capacity.
    pub fn new(rules: RuleSet, capacity: usize) -> Self {
        Self {
            rules,
            history: HistoryCache::new(capacity),
        }
    }

    /// Build an engine from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid rule's [`RuleError`].
    pub fn from_config(config: &TrailblazerConfig) -> Result<Self, RuleError> {
        let engine = Self::new(config.rule_set()?, config.step_cache_size);
        engine.log_configured();
        Ok(engine)
    }

    /// Replace the rule table and discard all history.
    ///
    /// Progress counted under the old rules means nothing under the new
    /// ones, so both halves are replaced together. An installed eviction
    /// hook carries over to the new history.
    pub fn configure(&mut self, rules: RuleSet, capacity: usize) {
        let mut history = HistoryCache::new(capacity);
        history.replace_eviction_hook(self.history.replace_eviction_hook(None));
        self.rules = rules;
        self.history = history;
        self.log_configured();
    }

    fn log_configured(&self) {
        tracing::info!(
            rules = self.rules.len(),
            capacity = self.history.capacity(),
            category_rules = self.rules.has_category_rules(),
            "path engine configured"
        );
    }

    /// The active rule table.
    pub const fn rule_set(&self) -> &RuleSet {
        &self.rules
    }

    /// The step history.
    pub const fn history(&self) -> &HistoryCache {
        &self.history
    }

    /// Mutable access to the step history, e.g. to install an eviction hook.
    pub const fn history_mut(&mut self) -> &mut HistoryCache {
        &mut self.history
    }

    /// Whether any rule could apply to this kind of agent.
    pub fn is_tracked(&self, agent_id: &Identifier, category: AgentCategory) -> bool {
        !self.rules.rules_for_agent(agent_id, category).is_empty()
    }

    /// Evaluate one movement event.
    ///
    /// Returns a command only when a rule's threshold was crossed at this
    /// step. A step that matches no rule leaves the history untouched.
    pub fn on_step(&mut self, event: &StepEvent<'_>) -> Option<TransitionCommand> {
        let agent_rules = self.rules.rules_for_agent(event.agent_id, event.category);
        if agent_rules.is_empty() {
            return None;
        }

        if !self.rules.watches_terrain(event.terrain_id) {
            return None;
        }
        tracing::debug!(
            terrain = %event.terrain_id,
            agent = %event.agent_id,
            position = %event.position,
            "checking terrain rules"
        );

        let (_, rule) = self
            .rules
            .candidates_for_terrain(event.terrain_id)
            .find(|&(index, rule)| {
                rule.source_id() == event.terrain_id
                    && agent_rules.contains(index)
                    && matcher::matches(rule, event.footwear)
            })?;

        tracing::debug!(
            terrain = %event.terrain_id,
            agent = %event.agent_id,
            position = %event.position,
            rule = rule.name(),
            "rule matched"
        );

        match self.history.advance(event.position, rule, event.now) {
            AdvanceOutcome::Progress(_) => None,
            AdvanceOutcome::Transition(count) => {
                tracing::debug!(
                    position = %event.position,
                    from = %event.terrain_id,
                    to = %rule.target_id(),
                    rule = rule.name(),
                    count,
                    "terrain transition"
                );
                Some(TransitionCommand {
                    position: event.position,
                    rule_name: rule.name().to_owned(),
                    from: event.terrain_id.clone(),
                    to: rule.target_id().clone(),
                    count,
                })
            }
        }
    }
}
