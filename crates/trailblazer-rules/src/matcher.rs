//! Footwear matching for rules.
//!
//! Pure functions, no state. Footwear lists are a disjunction of
//! conjunctions: the outer list matches if any inner set matches, and an
//! inner set matches if the agent's [`FootwearDescriptor`] contains every
//! identifier in it. Matching is superset-based, so a rule asking for
//! `{iron_boots}` also matches enchanted iron boots.
//!
//! Evaluation order:
//! 1. `only_if_footwear` non-empty and no set matches: reject.
//! 2. `skip_if_footwear` non-empty and some set matches: reject.
//! 3. Otherwise accept.

use std::collections::BTreeSet;

use trailblazer_types::{FootwearDescriptor, Identifier};

use crate::rule::Rule;

/// Whether `rule`'s footwear constraints admit `footwear`.
pub fn matches(rule: &Rule, footwear: &FootwearDescriptor) -> bool {
    let only = rule.only_if_footwear();
    if !only.is_empty() && !matches_any(footwear, only) {
        return false;
    }
    let skip = rule.skip_if_footwear();
    if !skip.is_empty() && matches_any(footwear, skip) {
        return false;
    }
    true
}

/// Whether `footwear` is a superset of at least one of `sets`.
pub fn matches_any(footwear: &FootwearDescriptor, sets: &[BTreeSet<Identifier>]) -> bool {
    sets.iter().any(|set| footwear.contains_all(set))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(raw: &str) -> Identifier {
        Identifier::parse(raw).unwrap()
    }

    fn set(raw: &[&str]) -> BTreeSet<Identifier> {
        raw.iter().map(|r| id(r)).collect()
    }

    fn wearing(item: &str, tags: &[&str]) -> FootwearDescriptor {
        FootwearDescriptor::new(id(item), tags.iter().map(|t| id(t)))
    }

    fn base() -> crate::rule::RuleBuilder {
        Rule::builder(id("grass_block"), id("dirt_path"))
    }

    #[test]
    fn unconstrained_rule_matches_everything() {
        let rule = base().build().unwrap();
        assert!(matches(&rule, &FootwearDescriptor::barefoot()));
        assert!(matches(&rule, &wearing("iron_boots", &["frost_walker"])));
    }

    #[test]
    fn only_if_is_disjunction_of_conjunctions() {
        let rule = base()
            .only_if_footwear(vec![set(&["a", "b"]), set(&["c"])])
            .build()
            .unwrap();
        assert!(matches(&rule, &wearing("a", &["b", "x"])));
        assert!(matches(&rule, &wearing("c", &[])));
        assert!(matches(&rule, &wearing("b", &["c"])));
        assert!(!matches(&rule, &wearing("a", &[])));
        assert!(!matches(&rule, &wearing("b", &[])));
    }

    #[test]
    fn skip_if_rejects_on_any_match() {
        let rule = base()
            .skip_if_footwear(vec![set(&["iron_boots"]), set(&["feather_falling"])])
            .build()
            .unwrap();
        assert!(!matches(&rule, &wearing("iron_boots", &[])));
        assert!(!matches(&rule, &wearing("leather_boots", &["feather_falling"])));
        assert!(matches(&rule, &wearing("leather_boots", &[])));
        assert!(matches(&rule, &FootwearDescriptor::barefoot()));
    }

    #[test]
    fn barefoot_sentinel_can_be_required() {
        let rule = base().only_if_footwear(vec![set(&["none"])]).build().unwrap();
        assert!(matches(&rule, &FootwearDescriptor::barefoot()));
        assert!(!matches(&rule, &wearing("leather_boots", &[])));
    }

    #[test]
    fn empty_inner_set_matches_anything() {
        assert!(matches_any(&FootwearDescriptor::barefoot(), &[BTreeSet::new()]));
        assert!(!matches_any(&FootwearDescriptor::barefoot(), &[]));
    }
}
