//! Environment configuration
//!
//! The resolver itself has nothing to configure at runtime; backend choice is
//! made by Cargo features. What is read from the environment is logging:
//!
//! - `RTLOCAL_LOG_LEVEL` - `off`, `error`, `warn`, `info`, `debug`, `trace` or `0..5`
//! - `RTLOCAL_FLUSH_EPRINT` - `1`, `true`, `yes`, `on` to flush stderr after each line

use crate::kprint::LogLevel;

/// Environment variable holding the log level
pub const ENV_LOG_LEVEL: &str = "RTLOCAL_LOG_LEVEL";

/// Environment variable enabling stderr flush per line
pub const ENV_FLUSH_EPRINT: &str = "RTLOCAL_FLUSH_EPRINT";

/// Logging settings resolved from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LogLevel,
    pub flush: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: LogLevel::Warn,
            flush: false,
        }
    }
}

impl LogConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset or
    /// unparseable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LogConfig::default();
        LogConfig {
            level: lookup(ENV_LOG_LEVEL)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.level),
            flush: lookup(ENV_FLUSH_EPRINT)
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.flush),
        }
    }
}

/// Truthy flag values: "1", "true", "yes", "on" (case-insensitive)
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
