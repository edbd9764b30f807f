//! Rule table and footwear matcher for the Trailblazer path engine.
//!
//! Rules are resolved from configuration once, indexed once, and then only
//! read. Every per-step lookup here is a hash-map probe; nothing scans the
//! full rule list.
//!
//! # Modules
//!
//! - [`error`] -- [`RuleError`], the configuration-time failure type.
//! - [`matcher`] -- Superset-based footwear matching.
//! - [`rule`] -- [`Rule`], its [`RuleBuilder`], and the raw [`RuleSpec`]
//!   configuration shape with default resolution.
//! - [`rule_set`] -- [`RuleSet`] with terrain, agent, and category indexes.

pub mod error;
pub mod matcher;
pub mod rule;
pub mod rule_set;

// Re-export primary types at crate root.
pub use error::RuleError;
pub use rule::{
    DEFAULT_AGENT_ID, DEFAULT_STEP_COUNT, DEFAULT_TIMEOUT_TICKS, Rule, RuleBuilder, RuleSpec,
};
pub use rule_set::{AgentRules, RuleIndex, RuleSet};
