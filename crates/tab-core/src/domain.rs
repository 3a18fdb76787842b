use std::{fmt, str::FromStr};

use crate::errors::Error;

/// Alert severity. The set is closed: every mapping below is an exhaustive match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Log,
}

impl Severity {
    /// Uppercase label shown in the message header.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Log => "LOG",
        }
    }

    /// Lowercase token used as the `#hashtag`.
    pub fn hashtag(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Log => "log",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Severity::Error => "🚨",
            Severity::Warning => "⚠️",
            Severity::Log => "ℹ️",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "log" | "info" => Ok(Severity::Log),
            other => Err(Error::Config(format!("unknown severity: {other:?}"))),
        }
    }
}

/// Free-form structured context attached to an alert.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A single alert to format and dispatch. Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertRequest {
    pub severity: Severity,
    pub message: String,
    pub metadata: Option<Metadata>,
}

impl AlertRequest {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
