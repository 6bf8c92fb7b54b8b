// Logger configuration
use serde::{Deserialize, Serialize};

/// Output format of the log stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, one event per line
    #[default]
    Pretty,
    /// Structured JSON, one object per line
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Mask emails, phones, SSNs, card numbers, IPs and MRNs in every line
    pub redaction_enabled: bool,
    /// Hash redacted values so repeated occurrences can be correlated
    pub hash_for_correlation: bool,
    /// Mask IP addresses (disable when debugging network setup)
    pub redact_ip_addresses: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
    pub format: LogFormat,
    pub ansi: bool,
}

impl LoggerConfig {
    /// Default filter for the server binary at the given level
    pub fn with_level(mut self, level: &str) -> Self {
        self.filter = format!(
            "hms_server={level},database_layer={level},tower_http=info,sqlx=warn,hyper=info"
        );
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            redaction_enabled: true,
            hash_for_correlation: true,
            redact_ip_addresses: true,
            filter: "info".to_string(),
            format: LogFormat::Pretty,
            ansi: false,
        }
    }
}
