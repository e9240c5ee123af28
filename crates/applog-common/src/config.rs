//! ---
//! applog_section: "01-core-functionality"
//! applog_subsection: "module"
//! applog_type: "source"
//! applog_scope: "code"
//! applog_description: "Environment-based configuration resolution."
//! applog_version: "v0.0.0-prealpha"
//! applog_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

fn default_port() -> String {
    "8080".to_owned()
}

fn default_welcome_message() -> String {
    "Welcome to the custom app".to_owned()
}

fn default_log_level() -> String {
    "INFO".to_owned()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("/app/logs/app.log")
}

/// Primary configuration object for the applog runtime.
///
/// Resolved once at process start and immutable afterwards; there is no
/// reload mechanism. Values are taken verbatim from the environment, so an
/// unusable `APP_PORT` only surfaces when the listener address is assembled.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port the HTTP listener binds, kept as the raw string.
    pub port: String,
    /// Text served by `GET /`.
    pub welcome_message: String,
    /// Diagnostic log level directive for the tracing subscriber.
    pub log_level: String,
    /// Path of the append-only log file.
    pub log_file: PathBuf,
}

impl AppConfig {
    /// Environment variable overriding the listen port.
    pub const ENV_PORT: &'static str = "APP_PORT";
    /// Environment variable overriding the welcome text.
    pub const ENV_WELCOME_MESSAGE: &'static str = "WELCOME_MESSAGE";
    /// Environment variable overriding the diagnostic log level.
    pub const ENV_LOG_LEVEL: &'static str = "LOG_LEVEL";
    /// Environment variable overriding the log file path.
    pub const ENV_LOG_FILE: &'static str = "APP_LOG_FILE";

    /// Resolve the configuration from the process environment, falling back
    /// to the documented defaults for every unset variable.
    pub fn from_env() -> Self {
        Self {
            port: env_or(Self::ENV_PORT, default_port),
            welcome_message: env_or(Self::ENV_WELCOME_MESSAGE, default_welcome_message),
            log_level: env_or(Self::ENV_LOG_LEVEL, default_log_level),
            log_file: PathBuf::from(env_or(Self::ENV_LOG_FILE, || {
                default_log_file().display().to_string()
            })),
        }
    }

    /// Assemble the wildcard listen address from the configured port.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("0.0.0.0:{}", self.port)
            .parse()
            .with_context(|| format!("invalid listen port {:?}", self.port))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            welcome_message: default_welcome_message(),
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }
}

fn env_or(key: &str, default: impl FnOnce() -> String) -> String {
    std::env::var(key).unwrap_or_else(|_| default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_addr_uses_configured_port() {
        let config = AppConfig {
            port: "9090".to_owned(),
            ..AppConfig::default()
        };
        let addr = config.listen_addr().unwrap();
        assert_eq!(addr.port(), 9090);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn listen_addr_rejects_non_numeric_port() {
        let config = AppConfig {
            port: "not-a-port".to_owned(),
            ..AppConfig::default()
        };
        assert!(config.listen_addr().is_err());
    }

    // Environment mutation shares process state, so the override and default
    // paths are exercised inside a single test.
    #[test]
    fn from_env_overrides_and_defaults() {
        std::env::set_var(AppConfig::ENV_PORT, "7777");
        std::env::set_var(AppConfig::ENV_WELCOME_MESSAGE, "hello there");
        std::env::set_var(AppConfig::ENV_LOG_LEVEL, "DEBUG");
        std::env::set_var(AppConfig::ENV_LOG_FILE, "/tmp/applog-test/app.log");

        let config = AppConfig::from_env();
        assert_eq!(config.port, "7777");
        assert_eq!(config.welcome_message, "hello there");
        assert_eq!(config.log_level, "DEBUG");
        assert_eq!(config.log_file, PathBuf::from("/tmp/applog-test/app.log"));

        std::env::remove_var(AppConfig::ENV_PORT);
        std::env::remove_var(AppConfig::ENV_WELCOME_MESSAGE);
        std::env::remove_var(AppConfig::ENV_LOG_LEVEL);
        std::env::remove_var(AppConfig::ENV_LOG_FILE);

        let config = AppConfig::from_env();
        assert_eq!(config.port, "8080");
        assert_eq!(config.welcome_message, "Welcome to the custom app");
        assert_eq!(config.log_level, "INFO");
        assert_eq!(config.log_file, PathBuf::from("/app/logs/app.log"));
    }
}
