//! Axum route handlers for the chat relay.

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::chat::models::ChatPayload;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/v1/chat
///
/// Accepts `{ message?, messages?, page?, source? }`, forwards the normalized
/// conversation to the completion API and returns the augmented reply.
pub async fn handle_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    if !state.completer.is_configured() {
        return Err(AppError::MissingApiKey);
    }

    let payload = ChatPayload::from(parse_body(&body)?);
    let prepared = state.pipeline.prepare(&payload)?;

    info!(
        "Chat request: turns={} (of {}), intents={:?}",
        prepared.conversation.len(),
        prepared.history.len(),
        prepared.intent.matched()
    );

    let completion = state
        .completer
        .complete(&prepared.system_prompt, &prepared.conversation)
        .await?;

    if completion.is_none() {
        debug!("Completion was empty; using fallback reply");
    }

    let reply = state.pipeline.finish(&prepared, completion);
    Ok(Json(ChatResponse { reply }))
}

/// Any other method on the chat paths.
pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// An empty body reads as `{}` so it surfaces as a missing message.
fn parse_body(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| AppError::InvalidBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body_empty_is_empty_object() {
        assert_eq!(parse_body(b"").unwrap(), json!({}));
        assert_eq!(parse_body(b"  \n").unwrap(), json!({}));
    }

    #[test]
    fn test_parse_body_invalid_json() {
        assert!(matches!(
            parse_body(b"{not json"),
            Err(AppError::InvalidBody(_))
        ));
    }

    #[test]
    fn test_parse_body_valid_json() {
        assert_eq!(
            parse_body(br#"{"message":"hi"}"#).unwrap(),
            json!({ "message": "hi" })
        );
    }
}
