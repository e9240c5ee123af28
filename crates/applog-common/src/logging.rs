//! ---
//! applog_section: "01-core-functionality"
//! applog_subsection: "module"
//! applog_type: "source"
//! applog_scope: "code"
//! applog_description: "Tracing subscriber bootstrap."
//! applog_version: "v0.0.0-prealpha"
//! applog_owner: "tbd"
//! ---
use tracing::info;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;

/// Initialize the tracing subscriber for the service.
///
/// The standard `RUST_LOG` variable is honoured first; when unset, the
/// configured `LOG_LEVEL` value is lower-cased into a filter directive.
/// A directive that fails to parse falls back to `info` rather than
/// aborting startup.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = config.log_level.to_ascii_lowercase();
        EnvFilter::try_new(&directive).unwrap_or_else(|err| {
            eprintln!("invalid LOG_LEVEL directive {directive:?} ({err}); defaulting to info");
            EnvFilter::new("info")
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .ok();

    info!(level = %config.log_level, "tracing initialised");
}
