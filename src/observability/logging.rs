//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once, at process start
//! - Pick the filter from flags and environment
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Precedence: `--log-level`, then `--verbose`, then `RUST_LOG`, then `dts_cli=info`
//! - Logs go to stderr so command output on stdout stays parseable

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

pub const DEFAULT_FILTER: &str = "dts_cli=info";

/// Accepted level names, lowest first.
pub const LEVEL_NAMES: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Parse a level by name only; numeric verbosity is not accepted.
pub fn parse_level(raw: &str) -> Option<Level> {
    let name = raw.trim().to_ascii_lowercase();
    if !LEVEL_NAMES.contains(&name.as_str()) {
        return None;
    }
    Level::from_str(&name).ok()
}

/// Build the filter directive for the given flags.
pub fn filter_directive(log_level: Option<&str>, verbose: bool) -> Result<Option<String>> {
    if let Some(raw) = log_level {
        let level = parse_level(raw).ok_or_else(|| Error::InvalidLogLevel(raw.to_string()))?;
        return Ok(Some(format!("dts_cli={}", level.to_string().to_ascii_lowercase())));
    }
    if verbose {
        return Ok(Some("dts_cli=debug".to_string()));
    }
    Ok(None)
}

/// Install the global subscriber.
pub fn init(log_level: Option<&str>, verbose: bool) -> Result<()> {
    let filter = match filter_directive(log_level, verbose)? {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    Ok(())
}
