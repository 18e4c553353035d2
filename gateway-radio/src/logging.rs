//! Logging setup for gateway-radio
//!
//! Library code only emits `tracing` events; applications pick how they are
//! rendered by calling one of the initializers here once at startup.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No output
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose diagnostics with source locations
    Debug,
}

impl std::str::FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            other => Err(LoggingError::InvalidMode(other.to_string())),
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Unknown logging mode: {0}")]
    InvalidMode(String),
}

/// Initialize logging with the specified mode
///
/// # Environment Variables
///
/// - `GATEWAY_RADIO_LOG_LEVEL`: filter directive (e.g. `debug`,
///   `gateway_radio=debug,miio_client=trace`), falling back to `RUST_LOG`
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact())
                .with(create_env_filter("info"));

            subscriber.try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true))
                .with(create_env_filter("debug"));

            subscriber.try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from `GATEWAY_RADIO_LOG_MODE` (silent, development, debug).
///
/// Defaults to Silent when unset or unrecognized.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var("GATEWAY_RADIO_LOG_MODE")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(LoggingMode::Silent);

    init_logging(mode)
}

fn create_env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("GATEWAY_RADIO_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}
