//! Shared type definitions for the Trailblazer path engine.
//!
//! This crate holds the vocabulary every other crate in the workspace
//! speaks: how terrain, agents and footwear are named, and how grid cells
//! are addressed.
//!
//! # Modules
//!
//! - [`ids`] -- Namespaced [`Identifier`] with default-namespace parsing
//! - [`enums`] -- [`AgentCategory`] spawn-group classification
//! - [`footwear`] -- [`FootwearDescriptor`] with superset matching
//! - [`position`] -- Integer grid [`Position`]

pub mod enums;
pub mod footwear;
pub mod ids;
pub mod position;

// Re-export all public types at crate root for convenience.
pub use enums::{AgentCategory, UnknownCategory};
pub use footwear::FootwearDescriptor;
pub use ids::{DEFAULT_NAMESPACE, Identifier, IdentifierError};
pub use position::Position;
