//! ---
//! applog_section: "03-persistence-logging"
//! applog_subsection: "module"
//! applog_type: "source"
//! applog_scope: "code"
//! applog_description: "Append-only storage for accepted log messages."
//! applog_version: "v0.0.0-prealpha"
//! applog_owner: "tbd"
//! ---
#![warn(missing_docs)]

/// Result alias used throughout the store crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error type for the log store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Wrapper for IO errors encountered while opening, writing, or reading
    /// the log file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub mod store;

pub use store::LogStore;
