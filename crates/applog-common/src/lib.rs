//! ---
//! applog_section: "01-core-functionality"
//! applog_subsection: "module"
//! applog_type: "source"
//! applog_scope: "code"
//! applog_description: "Shared primitives and utilities for the service runtime."
//! applog_version: "v0.0.0-prealpha"
//! applog_owner: "tbd"
//! ---
//! Shared primitives for the applog workspace.
//! This crate exposes environment-variable configuration resolution and the
//! tracing bootstrap consumed by the daemon and the test suites.

pub mod config;
pub mod logging;

pub use config::AppConfig;
pub use logging::init_tracing;
