//! Core error types for formwright.
//!
//! This module provides the [`FormError`] enum that covers renderer lookup
//! failures, configuration errors, wrapper lookups, and settings loading
//! failures. Every fallible operation in the workspace returns
//! [`FormResult`].

use std::fmt;

use thiserror::Error;

/// Details of a failed renderer lookup.
///
/// Carries the semantic type that could not be resolved together with every
/// namespace that was searched, in search order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    /// The semantic type that had no renderer.
    pub input_type: String,
    /// The conventional renderer name that was searched for.
    pub candidate: String,
    /// Namespaces attempted, in order.
    pub namespaces: Vec<String>,
}

impl LookupFailure {
    /// Creates a new `LookupFailure`.
    pub fn new(
        input_type: impl Into<String>,
        candidate: impl Into<String>,
        namespaces: Vec<String>,
    ) -> Self {
        Self {
            input_type: input_type.into(),
            candidate: candidate.into(),
            namespaces,
        }
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no input found for '{}' (looked for {} in: {})",
            self.input_type,
            self.candidate,
            self.namespaces.join(", ")
        )
    }
}

/// The primary error type for formwright.
///
/// None of these errors are retried: field resolution is a deterministic
/// chain over data that is already available, so every failure is fatal
/// for the field being rendered.
#[derive(Error, Debug)]
pub enum FormError {
    // ── Resolution ───────────────────────────────────────────────────

    /// No renderer exists for a resolved semantic type.
    #[error("Lookup error: {0}")]
    LookupError(LookupFailure),

    /// A wrapper was requested by name but is not registered.
    #[error("Wrapper not found: {0}")]
    WrapperNotFound(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid, or a helper was used
    /// in a context it does not support.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormError {
    /// Builds a [`FormError::LookupError`].
    pub fn lookup(
        input_type: impl Into<String>,
        candidate: impl Into<String>,
        namespaces: Vec<String>,
    ) -> Self {
        Self::LookupError(LookupFailure::new(input_type, candidate, namespaces))
    }

    /// Returns `true` for errors caused by configuration or caller misuse
    /// rather than by a missing renderer.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError(_) | Self::WrapperNotFound(_))
    }
}

/// A convenience type alias for `Result<T, FormError>`.
pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_display() {
        let err = FormError::lookup(
            "currency",
            "CurrencyInput",
            vec!["app::inputs".into(), "formwright::inputs".into()],
        );
        let msg = err.to_string();
        assert!(msg.contains("'currency'"));
        assert!(msg.contains("CurrencyInput"));
        assert!(msg.contains("app::inputs, formwright::inputs"));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = FormError::ConfigurationError("association :author not found".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: association :author not found"
        );
    }

    #[test]
    fn test_is_configuration() {
        assert!(FormError::ConfigurationError("x".into()).is_configuration());
        assert!(FormError::WrapperNotFound("x".into()).is_configuration());
        assert!(!FormError::lookup("x", "XInput", vec![]).is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
