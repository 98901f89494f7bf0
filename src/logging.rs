// src/logging.rs

//! Logging setup for `storyjobs` using `tracing` + `tracing-subscriber`.
//!
//! Filter selection, first match wins:
//! 1. `--log-level` CLI flag
//! 2. `STORYJOBS_LOG`, either a bare level ("debug") or full directives
//!    ("storyjobs::engine=trace,info")
//! 3. `info`
//!
//! Logs go to STDERR; STDOUT carries job output only.

use anyhow::{Result, anyhow};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "STORYJOBS_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(LevelFilter::from(level).to_string());
    }

    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("ignoring invalid {LOG_ENV}={directives:?}: {e}");
            EnvFilter::new("info")
        }),
        None => EnvFilter::new("info"),
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_wins_over_env() {
        let filter = build_filter(Some(LogLevel::Warn), Some("trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn env_accepts_directives() {
        let filter = build_filter(None, Some("storyjobs::engine=trace,info"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn blank_env_means_info() {
        let filter = build_filter(None, Some("  "));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
