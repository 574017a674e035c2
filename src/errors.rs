//! Typed error hierarchy for pipegen.
//!
//! Three enums cover the three layers:
//! - `IntakeError`: what the intake form reports to its observer
//! - `ClientError`: failures talking to the pipeline service
//! - `GenerationError`: failures inside the service while calling the model

use thiserror::Error;

/// Errors surfaced by the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    /// Raised locally before any request is made.
    #[error("{0}")]
    Validation(String),

    /// Transport failure or non-2xx response, with the message already resolved.
    #[error("{0}")]
    Request(String),
}

impl IntakeError {
    pub fn message(&self) -> &str {
        match self {
            IntakeError::Validation(msg) | IntakeError::Request(msg) => msg,
        }
    }
}

/// Errors from the pipeline service client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-2xx status. `detail` holds the
    /// `detail` string of the JSON error body when there was one.
    #[error("Request failed with status code {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// The server-provided error detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Resolve the message shown to the user: server detail, then the
    /// transport message, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(detail) = self.detail().filter(|d| !d.trim().is_empty()) {
            return detail.to_string();
        }
        let transport = self.to_string();
        if !transport.trim().is_empty() {
            return transport;
        }
        fallback.to_string()
    }
}

/// Errors raised by the service while producing a pipeline or an analysis.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Language model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Language model returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Language model returned no content")]
    EmptyCompletion,

    /// The completion was not JSON at all.
    #[error("{0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The completion was JSON but did not match the expected shape.
    #[error("{0}")]
    Schema(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_error_message_is_the_display_text() {
        let err = IntakeError::Validation("Please provide input".into());
        assert_eq!(err.message(), "Please provide input");
        assert_eq!(err.to_string(), "Please provide input");
    }

    #[test]
    fn client_error_prefers_server_detail() {
        let err = ClientError::Status {
            status: 404,
            detail: Some("Not Found".into()),
        };
        assert_eq!(err.detail(), Some("Not Found"));
        assert_eq!(err.user_message("Failed to analyze repository"), "Not Found");
    }

    #[test]
    fn client_error_without_detail_uses_transport_message() {
        let err = ClientError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(
            err.user_message("Failed to generate pipeline"),
            "Request failed with status code 500"
        );
    }

    #[test]
    fn client_error_blank_detail_is_ignored() {
        let err = ClientError::Status {
            status: 502,
            detail: Some("   ".into()),
        };
        assert_eq!(
            err.user_message("Failed to generate pipeline"),
            "Request failed with status code 502"
        );
    }

    #[test]
    fn client_error_decode_failure_uses_its_own_message() {
        let err = ClientError::Decode(String::new());
        assert!(err.user_message("fallback").starts_with("Failed to decode"));
    }

    #[test]
    fn generation_error_provider_carries_status() {
        let err = GenerationError::Provider {
            status: 429,
            message: "rate limited".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&IntakeError::Request("x".into()));
        assert_std_error(&ClientError::Decode("x".into()));
        assert_std_error(&GenerationError::MissingApiKey);
    }
}
