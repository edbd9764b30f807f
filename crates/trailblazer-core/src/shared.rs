//! Thread-safe handle around a [`TransitionEngine`].
//!
//! Movement events may arrive from several threads. A single mutex guards
//! the whole engine: `on_step` holds it for the entire lookup-and-update,
//! and `configure` swaps rules and history together under the same lock,
//! so a caller sees either the old configuration or the new one.

use std::sync::{Mutex, MutexGuard, PoisonError};

use trailblazer_rules::{RuleError, RuleSet};
use trailblazer_types::{AgentCategory, Identifier};

use crate::config::TrailblazerConfig;
use crate::engine::{StepEvent, TransitionCommand, TransitionEngine};

/// A [`TransitionEngine`] behind a mutex.
#[derive(Debug)]
pub struct SharedEngine {
    inner: Mutex<TransitionEngine>,
}

impl SharedEngine {
    /// Wrap an engine.
    pub const fn new(engine: TransitionEngine) -> Self {
        Self {
            inner: Mutex::new(engine),
        }
    }

    /// Build a shared engine from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid rule's [`RuleError`].
    pub fn from_config(config: &TrailblazerConfig) -> Result<Self, RuleError> {
        TransitionEngine::from_config(config).map(Self::new)
    }

    /// Evaluate one movement event under the lock.
    pub fn on_step(&self, event: &StepEvent<'_>) -> Option<TransitionCommand> {
        self.lock().on_step(event)
    }

    /// Whether any rule could apply to this kind of agent.
    pub fn is_tracked(&self, agent_id: &Identifier, category: AgentCategory) -> bool {
        self.lock().is_tracked(agent_id, category)
    }

    /// Replace rules and history in one step.
    pub fn configure(&self, rules: RuleSet, capacity: usize) {
        self.lock().configure(rules, capacity);
    }

    /// Validate `config` and apply it.
    ///
    /// The rule set is built before the lock is taken; on error the active
    /// configuration is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the first invalid rule's [`RuleError`].
    pub fn try_configure(&self, config: &TrailblazerConfig) -> Result<(), RuleError> {
        let rules = config.rule_set()?;
        self.configure(rules, config.step_cache_size);
        Ok(())
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut TransitionEngine) -> R) -> R {
        f(&mut self.lock())
    }

    // A panic inside the lock can only happen between whole operations on
    // the cache, so a poisoned engine is still consistent.
    fn lock(&self) -> MutexGuard<'_, TransitionEngine> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
