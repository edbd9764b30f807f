//! Step history and transition engine for the Trailblazer path engine.
//!
//! Agents walking over terrain wear it down: after enough traversals of a
//! cell within a time window, the cell's terrain is replaced (grass becomes
//! dirt, dirt becomes a path). This crate owns the part that runs on every
//! movement event.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `trailblazer.yaml` (or the
//!   host's commented JSON) and the default-file bootstrap.
//! - [`engine`] -- [`TransitionEngine`], the per-step rule lookup and
//!   history update.
//! - [`history`] -- [`HistoryCache`], the bounded LRU of in-progress
//!   traversal counts.
//! - [`shared`] -- [`SharedEngine`], the mutex-guarded handle hosts share
//!   across threads.
//! - [`world`] -- Host seams ([`TerrainAccess`], [`AgentView`], [`Clock`])
//!   and the [`StepDispatcher`] that connects them to the engine.
//!
//! [`TransitionEngine`]: engine::TransitionEngine
//! [`HistoryCache`]: history::HistoryCache
//! [`SharedEngine`]: shared::SharedEngine
//! [`TerrainAccess`]: world::TerrainAccess
//! [`AgentView`]: world::AgentView
//! [`Clock`]: world::Clock
//! [`StepDispatcher`]: world::StepDispatcher

pub mod config;
pub mod engine;
pub mod history;
pub mod shared;
pub mod world;

pub use config::{ConfigError, ConfigSource, TrailblazerConfig};
pub use engine::{StepEvent, TransitionCommand, TransitionEngine};
pub use history::{AdvanceOutcome, EvictionHook, HistoryCache, ProgressRecord};
pub use shared::SharedEngine;
pub use world::{AgentView, Clock, StepDispatcher, TerrainAccess, WorldError};
