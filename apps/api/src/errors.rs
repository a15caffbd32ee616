use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::chat::normalizer::NormalizeError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Rendered as `{ "error": <kind>, "details"?: <detail> }`, the envelope the
/// chat widget already understands.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("No message provided")]
    MissingMessage,

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("OpenAI API key missing")]
    MissingApiKey,

    #[error("Upstream error (status {status})")]
    Upstream { status: u16, details: Value },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::EmptyConversation => AppError::MissingMessage,
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => AppError::MissingApiKey,
            LlmError::Api { status, details } => AppError::Upstream { status, details },
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed", None)
            }
            AppError::MissingMessage => (StatusCode::BAD_REQUEST, "No message provided", None),
            AppError::InvalidBody(msg) => (
                StatusCode::BAD_REQUEST,
                "Invalid JSON body",
                Some(Value::String(msg)),
            ),
            AppError::MissingApiKey => {
                tracing::error!("Chat request rejected: OPENAI_API_KEY is not set");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "OpenAI API key missing",
                    None,
                )
            }
            AppError::Upstream { status, details } => {
                tracing::error!("Completion API error (status {status}): {details}");
                (upstream_status(status), "OpenAI error", Some(details))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(Value::String(e.to_string())),
                )
            }
        };

        let body = match details {
            Some(details) => json!({ "error": error, "details": details }),
            None => json!({ "error": error }),
        };

        (status, Json(body)).into_response()
    }
}

/// Upstream failures keep their status when it is an error status; anything else is a 500.
fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_passthrough() {
        assert_eq!(upstream_status(429), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(upstream_status(401), StatusCode::UNAUTHORIZED);
        assert_eq!(upstream_status(503), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_upstream_status_non_error_becomes_500() {
        assert_eq!(upstream_status(200), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(upstream_status(302), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(upstream_status(0), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::MethodNotAllowed.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::MissingMessage.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MissingApiKey.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_llm_error_mapping() {
        assert!(matches!(
            AppError::from(LlmError::MissingApiKey),
            AppError::MissingApiKey
        ));
        assert!(matches!(
            AppError::from(LlmError::Api {
                status: 429,
                details: json!({ "error": { "message": "slow down" } })
            }),
            AppError::Upstream { status: 429, .. }
        ));
    }
}
