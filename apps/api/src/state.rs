use std::sync::Arc;

use crate::chat::pipeline::ChatPipeline;
use crate::llm_client::ChatCompleter;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; every request rebuilds its own conversation.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
    /// Pluggable completion backend. Default: `OpenAiClient`.
    pub completer: Arc<dyn ChatCompleter>,
}
