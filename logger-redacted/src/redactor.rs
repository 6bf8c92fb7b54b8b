use regex::Regex;
use sha2::{Sha256, Digest};
use base64::{Engine as _, engine::general_purpose};

use crate::config::LoggerConfig;

mod patterns {
    #![allow(clippy::expect_used)]
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref EMAIL: Regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern");
        pub static ref PHONE: Regex = Regex::new(r"(?:\+1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b").expect("phone pattern");
        pub static ref SSN: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("ssn pattern");
        pub static ref CREDIT_CARD: Regex = Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").expect("card pattern");
        pub static ref IP: Regex = Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").expect("ip pattern");
        pub static ref MRN: Regex = Regex::new(r"\bMRN-\d{8}-[0-9A-Fa-f]{6}\b").expect("mrn pattern");
    }
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_ssn: bool,
    pub redact_credit_cards: bool,
    pub redact_ip_addresses: bool,
    pub redact_mrns: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl RedactionConfig {
    /// Pass-through configuration
    pub fn disabled() -> Self {
        Self {
            redact_emails: false,
            redact_phones: false,
            redact_ssn: false,
            redact_credit_cards: false,
            redact_ip_addresses: false,
            redact_mrns: false,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_ssn: true,
            redact_credit_cards: true,
            redact_ip_addresses: true,
            redact_mrns: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

impl From<&LoggerConfig> for RedactionConfig {
    fn from(config: &LoggerConfig) -> Self {
        if !config.redaction_enabled {
            return Self::disabled();
        }
        Self {
            redact_ip_addresses: config.redact_ip_addresses,
            hash_for_correlation: config.hash_for_correlation,
            ..Self::default()
        }
    }
}

/// PII redactor for log messages
#[derive(Debug, Clone)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        // Card numbers and SSNs before phones so the phone pattern does not
        // swallow part of a longer digit group.
        if self.config.redact_credit_cards {
            result = self.replace(&patterns::CREDIT_CARD, &result, "CC", |_| "****-****-****-****".to_string());
        }

        if self.config.redact_ssn {
            result = self.replace(&patterns::SSN, &result, "SSN", |_| "***-**-****".to_string());
        }

        if self.config.redact_emails {
            result = self.replace(&patterns::EMAIL, &result, "EMAIL", mask_email);
        }

        if self.config.redact_mrns {
            result = self.replace(&patterns::MRN, &result, "MRN", |_| "MRN-********-******".to_string());
        }

        if self.config.redact_phones {
            result = self.replace(&patterns::PHONE, &result, "PHONE", |_| "(***) ***-****".to_string());
        }

        if self.config.redact_ip_addresses {
            result = self.replace(&patterns::IP, &result, "IP", mask_ip);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn replace(&self, pattern: &Regex, text: &str, label: &str, mask: impl Fn(&str) -> String) -> String {
        pattern.replace_all(text, |caps: &regex::Captures| {
            let matched = caps.get(0).map_or("", |m| m.as_str());
            if self.config.hash_for_correlation {
                format!("{}[{}]", label, hash_value(matched))
            } else {
                mask(matched)
            }
        }).to_string()
    }
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let l = local.chars().next().map(String::from).unwrap_or_default();
            let d = domain.chars().next().map(String::from).unwrap_or_default();
            format!("{l}***@{d}***")
        }
        None => "***@***".to_string(),
    }
}

fn mask_ip(ip: &str) -> String {
    let parts: Vec<&str> = ip.split('.').collect();
    match (parts.first(), parts.last()) {
        (Some(first), Some(last)) if parts.len() == 4 => format!("{first}.***.***.{last}"),
        _ => "***.***.***.***".to_string(),
    }
}

fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    general_purpose::STANDARD.encode(digest.get(..8).unwrap_or_default())
}
