//! Startup self-check runner
//!
//! Runs a fixed list of named diagnostic checks in sequence and reports a
//! joined status line plus an error log.

/// Build-time information (timestamp, target, rustc)
pub mod build_info;

/// Profile-based configuration
pub mod config;

/// Checks, runner, and reporting
pub mod health;

/// Tracing subscriber setup
pub mod logging;

pub use crate::config::SelfCheckConfig;
