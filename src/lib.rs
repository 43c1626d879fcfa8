//! need - priority-tier context for Taskwarrior
//!
//! This library backs the `need` CLI and the Taskwarrior hooks that keep a
//! `need` context pointed at the most urgent level with outstanding work.
//!
//! # Core Concepts
//!
//! - **Priority levels**: 1 (most urgent) to 6, modeled on a needs hierarchy
//! - **Auto-assignment rules**: `priority.<N>.auto` predicates that pick a
//!   level for new tasks
//! - **Context filter**: a priority window plus a due/scheduled window around
//!   today
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: `need.rc` key/value store, settings and file locations
//! - `context`: The `need` saved view
//! - `error`: Error types and result aliases
//! - `filter`: Context filter construction
//! - `hooks`: on-add / on-exit hook logic
//! - `lock`: File locking and atomic writes
//! - `logging`: Tracing setup
//! - `migrate`: H/M/L to numeric priority migration
//! - `output`: Human and JSON output
//! - `priority`: Priority levels and the pending-work resolver
//! - `rules`: Auto-assignment rule matching
//! - `task`: Task records
//! - `tracker`: Taskwarrior command adapter

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod hooks;
pub mod lock;
pub mod logging;
pub mod migrate;
pub mod output;
pub mod priority;
pub mod rules;
pub mod task;
pub mod tracker;

pub use error::{Error, Result};
