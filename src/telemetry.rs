//! Log subscriber initialization
//!
//! Installs a `tracing` subscriber with an `EnvFilter` built from the
//! configured level and either human-readable or JSON structured output.

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive
    #[error("cannot set log level to {level:?}: {reason}")]
    InvalidLevel {
        /// Level as configured
        level: String,
        /// Parser error
        reason: String,
    },

    /// Failed to install the tracing subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Configuration for logging initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level or `EnvFilter` directive (e.g. `info`, `debug,hyper=warn`)
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            json: false,
        }
    }
}

/// Build the filter for the configured level
///
/// A bare word must name a level; only values containing `=` or `,` are
/// parsed as full `EnvFilter` directives.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter, TelemetryError> {
    let level = config.level.trim();
    let invalid = |reason: String| TelemetryError::InvalidLevel {
        level: config.level.clone(),
        reason,
    };

    if level.contains(['=', ',']) {
        return EnvFilter::try_new(level).map_err(|e| invalid(e.to_string()));
    }

    let filter = parse_level(level).map_err(invalid)?;
    Ok(EnvFilter::builder()
        .with_default_directive(filter.into())
        .parse_lossy(""))
}

/// Parse a single level name, accepting aliases such as `warning`
fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.to_ascii_lowercase().as_str() {
        "warning" => Ok(LevelFilter::WARN),
        "fatal" | "panic" => Ok(LevelFilter::ERROR),
        other => other.parse::<LevelFilter>().map_err(|e| e.to_string()),
    }
}

/// Install the global tracing subscriber
pub fn init_logging(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    let fmt_layer = if config.json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}
