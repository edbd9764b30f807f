//! Error types for the `trailblazer-rules` crate.
//!
//! Every variant is a configuration-time failure. Nothing in the per-step
//! lookup path can fail; a missing index entry is an ordinary empty result.

use trailblazer_types::{IdentifierError, UnknownCategory};

/// A rule definition that cannot be installed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The rule does not name the terrain it watches.
    #[error("rule {rule}: missing source terrain id (block_id)")]
    MissingSourceId {
        /// Name of the offending rule.
        rule: String,
    },

    /// The rule does not name the terrain to transition into.
    #[error("rule {rule}: missing target terrain id (next_block_id)")]
    MissingTargetId {
        /// Name of the offending rule.
        rule: String,
    },

    /// Both `skip_if_boots` and `only_if_boots` were configured.
    #[error("rule {rule}: rules can't set both skip_if_boots and only_if_boots")]
    ConflictingFootwear {
        /// Name of the offending rule.
        rule: String,
    },

    /// One of the rule's identifiers failed to parse.
    #[error("rule {rule}: invalid identifier in {field}: {source}")]
    InvalidIdentifier {
        /// Name of the offending rule.
        rule: String,
        /// Configuration field that held the identifier.
        field: &'static str,
        /// The underlying parse error.
        source: IdentifierError,
    },

    /// A spawn group name did not match any agent category.
    #[error("rule {rule}: {source}")]
    UnknownCategory {
        /// Name of the offending rule.
        rule: String,
        /// The underlying parse error.
        source: UnknownCategory,
    },
}

impl RuleError {
    /// Name of the rule this error refers to.
    pub fn rule_name(&self) -> &str {
        match self {
            Self::MissingSourceId { rule }
            | Self::MissingTargetId { rule }
            | Self::ConflictingFootwear { rule }
            | Self::InvalidIdentifier { rule, .. }
            | Self::UnknownCategory { rule, .. } => rule,
        }
    }
}
