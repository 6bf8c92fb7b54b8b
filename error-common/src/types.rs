use thiserror::Error;

/// Process-level error enum for WardLine binaries
#[derive(Error, Debug)]
pub enum HmsError {
    /// Network communication errors (bind, accept)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// HTTP server runtime errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Database bootstrap and migration errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Logging/tracing initialisation errors
    #[error("Logging error: {0}")]
    LoggingError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HmsError {
    /// Short machine-readable category, used as a structured log field
    pub fn category(&self) -> &'static str {
        match self {
            HmsError::NetworkError(_) => "network",
            HmsError::ServerError(_) => "server",
            HmsError::DatabaseError(_) => "database",
            HmsError::LoggingError(_) => "logging",
            HmsError::ConfigError(_) => "config",
            HmsError::InternalError(_) => "internal",
            HmsError::Other(_) => "other",
        }
    }
}

/// Result type alias for WardLine operations
pub type Result<T> = std::result::Result<T, HmsError>;

/// Log an error with its category and the context it occurred in
pub fn log_error(context: &str, error: &HmsError) {
    tracing::error!(
        context = context,
        category = error.category(),
        error = %error,
        "WardLine error occurred"
    );
}
