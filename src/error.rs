use crate::message::ValidationError;
use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "builder.app_id", "token.body")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., HTTP status, decoder message)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_builder", "token_manager")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the push client.
///
/// Provider-level delivery failures (a non-success `code` in the response
/// envelope) are *not* represented here; they come back as data in
/// [`crate::PushResponse`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Message validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("refresh token failed{}", format_context(.context))]
    Authentication { context: ErrorContext },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Decode error: {message}{}", format_context(.context))]
    Decode {
        message: String,
        context: ErrorContext,
    },

    #[error("Operation timed out after {timeout_ms}ms{}", format_context(.context))]
    Timeout {
        timeout_ms: u64,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new authentication (token refresh) error with structured context
    pub fn authentication_with_context(context: ErrorContext) -> Self {
        Error::Authentication { context }
    }

    /// Create a new decode error with structured context
    pub fn decode_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Decode {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Authentication { context }
            | Error::Decode { context, .. }
            | Error::Timeout { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Whether the error was raised by the token refresh path.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_rendered_in_display() {
        let err = Error::configuration_with_context(
            "app id can't be empty",
            ErrorContext::new()
                .with_field_path("builder.app_id")
                .with_source("client_builder"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: app id can't be empty (field: builder.app_id, source: client_builder)"
        );
    }

    #[test]
    fn test_authentication_display_without_context() {
        let err = Error::authentication_with_context(ErrorContext::new());
        assert_eq!(err.to_string(), "refresh token failed");
        assert!(err.is_authentication());
        assert!(err.context().is_some());
    }

    #[test]
    fn test_validation_error_converts() {
        let err: Error = ValidationError::InvalidTargetSelection.into();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidTargetSelection)));
        assert!(err.context().is_none());
    }
}
