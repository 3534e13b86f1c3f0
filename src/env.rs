//! Environment variable names used by this crate for convenient
//! configuration of the layer from services.
//!
//! These are purely helpers; the layout itself never reads the
//! environment.

/// Overrides the resolved `host` field value.
pub const LOGSTASH_LAYOUT_HOST_ENV: &str = "LOGSTASH_LAYOUT_HOST";

/// Most verbose level forwarded by the layer, e.g. `info` or `debug`.
pub const LOGSTASH_LAYOUT_LEVEL_ENV: &str = "LOGSTASH_LAYOUT_LEVEL";

/// String escaping mode: `json` (default) or `verbatim`.
pub const LOGSTASH_LAYOUT_ESCAPING_ENV: &str = "LOGSTASH_LAYOUT_ESCAPING";

/// Error type returned when configuration values cannot be parsed.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unknown string escaping mode: {0:?}")]
    UnknownEscaping(String),

    #[error("invalid log level: {0:?}")]
    InvalidLevel(String),

    #[error("failed to install global subscriber: {0}")]
    SetGlobalDefault(String),
}

/// Read an environment variable, treating unset and empty the same.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
