//! Logging with automatic PII redaction for WardLine HMS
//!
//! Installs the global `tracing` subscriber. Every formatted line passes
//! through [`PiiRedactor`] before it is written, so patient emails, phone
//! numbers, SSNs, card numbers, IP addresses and medical record numbers never
//! reach the log sink in clear text.
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{LoggerConfig, LogFormat};
//!
//! let config = LoggerConfig::default()
//!     .with_level("debug")
//!     .with_format(LogFormat::Json);
//! logger_redacted::init(&config).expect("logging");
//!
//! tracing::info!("Patient jane@hospital.org checked in");
//! // {"fields":{"message":"Patient EMAIL[q2Vd...] checked in"},...}
//! ```

pub mod config;
pub mod redactor;
pub mod writer;

pub use config::*;
pub use redactor::*;
pub use writer::*;

use error_common::{HmsError, Result};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.filter` when set.
pub fn init(config: &LoggerConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| HmsError::LoggingError(format!("invalid log filter: {e}")))?;

    let writer = RedactingMakeWriter::new(
        std::io::stdout,
        PiiRedactor::new(RedactionConfig::from(config)),
    );

    let installed = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.ansi)
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
    };

    installed.map_err(|e| HmsError::LoggingError(e.to_string()))
}
