//! Stagehand Core
//!
//! Shared utilities for the Stagehand view runtime: hash collections,
//! logging setup and profiling scopes.

pub mod alloc;
pub mod logging;
pub mod profiling;
