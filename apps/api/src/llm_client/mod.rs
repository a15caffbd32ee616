/// LLM client — the only place that talks to the chat-completion API.
///
/// Handlers depend on the `ChatCompleter` trait, carried in `AppState` as
/// `Arc<dyn ChatCompleter>`; `OpenAiClient` is the production implementation.
/// Calls are made once: a failed completion is reported to the caller, never retried.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::chat::models::Conversation;

pub mod prompts;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.6;
pub const DEFAULT_MAX_TOKENS: u32 = 450;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenAI API key missing")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {details}")]
    Api { status: u16, details: Value },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Generates the assistant's next turn for a conversation.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// False when the backend lacks credentials; checked before any request work.
    fn is_configured(&self) -> bool;

    /// Returns the trimmed reply text, or `None` when the model produced nothing usable.
    async fn complete(
        &self,
        system: &str,
        conversation: &Conversation,
    ) -> Result<Option<String>, LlmError>;
}

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<CompletionMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Some compatible backends omit either count.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl CompletionResponse {
    /// Trimmed text of the first choice, if non-empty.
    fn reply_text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }
}

/// OpenAI chat-completions backend.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    settings: CompletionSettings,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, settings: CompletionSettings) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn build_request<'a>(
        &'a self,
        system: &'a str,
        conversation: &'a Conversation,
    ) -> CompletionRequest<'a> {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(CompletionMessage {
            role: "system",
            content: system,
        });
        messages.extend(conversation.turns().iter().map(|t| CompletionMessage {
            role: t.role.as_str(),
            content: &t.content,
        }));

        CompletionRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            messages,
        }
    }
}

#[async_trait]
impl ChatCompleter for OpenAiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(
        &self,
        system: &str,
        conversation: &Conversation,
    ) -> Result<Option<String>, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let request_body = self.build_request(system, conversation);

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Completion API returned {}: {}", status, body);
            let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
            return Err(LlmError::Api {
                status: status.as_u16(),
                details,
            });
        }

        let completion: CompletionResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(completion.reply_text())
    }
}
