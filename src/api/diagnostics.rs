//! Application-level error detection
//!
//! The backend reports provider misconfiguration (missing or rejected API
//! keys, exhausted quota, local model down) inside an otherwise successful
//! chat reply. A structured `error_code` is honored when present; replies
//! without one are matched against known sentinel phrases.

use std::fmt;

use regex::Regex;

use crate::error::Result;

/// Category of backend misconfiguration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationErrorKind {
    /// Provider credentials are not configured on the backend
    MissingCredentials,
    /// Provider rejected the configured credentials
    InvalidCredentials,
    /// Provider quota is exhausted
    QuotaExceeded,
    /// The backend's model runtime is not reachable
    ModelUnavailable,
}

impl ApplicationErrorKind {
    /// Parse a structured error code sent by the backend
    ///
    /// # Examples
    ///
    /// ```
    /// use nitro::api::diagnostics::ApplicationErrorKind;
    ///
    /// assert_eq!(
    ///     ApplicationErrorKind::from_code("invalid_api_key"),
    ///     Some(ApplicationErrorKind::InvalidCredentials)
    /// );
    /// assert_eq!(ApplicationErrorKind::from_code("something_else"), None);
    /// ```
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "provider_not_configured" | "missing_api_key" => Some(Self::MissingCredentials),
            "invalid_api_key" => Some(Self::InvalidCredentials),
            "quota_exceeded" => Some(Self::QuotaExceeded),
            "model_unavailable" => Some(Self::ModelUnavailable),
            _ => None,
        }
    }
}

/// A successful reply that actually reports a backend misconfiguration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationError {
    /// What went wrong
    pub kind: ApplicationErrorKind,
    /// Raw text reported by the backend
    pub detail: String,
}

impl ApplicationError {
    /// Create an application error
    pub fn new(kind: ApplicationErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// What the operator should do about it
    pub fn instruction(&self) -> &'static str {
        match self.kind {
            ApplicationErrorKind::MissingCredentials => {
                "The backend has no provider API key. Set GEMINI_API_KEY in the backend .env file and restart the server."
            }
            ApplicationErrorKind::InvalidCredentials => {
                "The provider rejected the backend's API key. Check GEMINI_API_KEY in the backend .env file."
            }
            ApplicationErrorKind::QuotaExceeded => {
                "The provider quota is exhausted. Try again later or switch the backend to a local model."
            }
            ApplicationErrorKind::ModelUnavailable => {
                "The backend cannot reach its local model. Start Ollama on the server (`ollama serve`) and retry."
            }
        }
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.instruction(), self.detail)
    }
}

/// Classifies chat replies into normal answers and application errors
#[derive(Debug, Clone)]
pub struct ResponseInspector {
    rules: Vec<(ApplicationErrorKind, Regex)>,
}

impl ResponseInspector {
    /// Build an inspector with the built-in sentinel patterns
    ///
    /// # Errors
    ///
    /// Returns error if a pattern fails to compile
    pub fn new() -> Result<Self> {
        let patterns = [
            (
                ApplicationErrorKind::MissingCredentials,
                r"(?i)\b[A-Z_]*API_KEY\b not configured|api key (is )?(missing|not (set|configured))",
            ),
            (
                ApplicationErrorKind::InvalidCredentials,
                r"(?i)invalid api key",
            ),
            (
                ApplicationErrorKind::QuotaExceeded,
                r"(?i)quota (exceeded|exhausted)",
            ),
            (
                ApplicationErrorKind::ModelUnavailable,
                r"(?i)ollama (is )?not running|cannot connect to ollama",
            ),
        ];

        let mut rules = Vec::with_capacity(patterns.len());
        for (kind, pattern) in patterns {
            rules.push((kind, Regex::new(pattern)?));
        }
        Ok(Self { rules })
    }

    /// Inspect a reply
    ///
    /// A recognized `error_code` takes precedence; otherwise `text` is
    /// matched against the sentinel patterns in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use nitro::api::diagnostics::{ApplicationErrorKind, ResponseInspector};
    ///
    /// let inspector = ResponseInspector::new().unwrap();
    /// let found = inspector
    ///     .inspect("Gemini error: GEMINI_API_KEY not configured in .env", None)
    ///     .unwrap();
    /// assert_eq!(found.kind, ApplicationErrorKind::MissingCredentials);
    /// assert!(inspector.inspect("Here is your answer", None).is_none());
    /// ```
    pub fn inspect(&self, text: &str, error_code: Option<&str>) -> Option<ApplicationError> {
        if let Some(kind) = error_code.and_then(ApplicationErrorKind::from_code) {
            return Some(ApplicationError::new(kind, text));
        }

        self.rules
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(kind, _)| ApplicationError::new(*kind, text))
    }
}
