//! Message normalizer — turns a loosely-shaped request body into a sanitized,
//! bounded `Conversation`.
//!
//! A structured `messages` list always wins over a single `message` string;
//! the two are never merged. Entries that cannot be trusted (non-objects,
//! roles other than `user`/`assistant`, non-string or blank content) are
//! dropped silently. A client-supplied `system` turn is one of those.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::chat::models::{ChatPayload, ChatTurn, Conversation, Role};

/// Default number of most recent turns forwarded to the completion step.
pub const DEFAULT_MAX_TURNS: usize = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("No message provided")]
    EmptyConversation,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    max_turns: Option<usize>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            max_turns: Some(DEFAULT_MAX_TURNS),
        }
    }
}

impl Normalizer {
    /// `None` keeps the whole history. A bound of zero counts as no bound.
    pub fn new(max_turns: Option<usize>) -> Self {
        Self {
            max_turns: max_turns.filter(|&max| max > 0),
        }
    }

    /// Sanitized and bounded in one step.
    #[allow(dead_code)]
    pub fn normalize(&self, payload: &ChatPayload) -> Result<Conversation, NormalizeError> {
        let history = self.sanitize(payload)?;
        Ok(self.bound(&history))
    }

    /// Every trustworthy turn of the thread, unbounded.
    pub fn sanitize(&self, payload: &ChatPayload) -> Result<Conversation, NormalizeError> {
        let turns = match payload.messages.as_array() {
            Some(entries) if !entries.is_empty() => sanitize_entries(entries),
            _ => payload
                .message
                .as_str()
                .filter(|m| !m.trim().is_empty())
                .map(|m| vec![ChatTurn::user(m)])
                .unwrap_or_default(),
        };

        if turns.is_empty() {
            return Err(NormalizeError::EmptyConversation);
        }
        Ok(Conversation::new(turns))
    }

    /// Most recent suffix of `history` that fits the bound.
    pub fn bound(&self, history: &Conversation) -> Conversation {
        let turns = history.turns();
        match self.max_turns {
            Some(max) if turns.len() > max => {
                debug!("Truncating conversation from {} to {} turns", turns.len(), max);
                Conversation::new(turns[turns.len() - max..].to_vec())
            }
            _ => history.clone(),
        }
    }
}

fn sanitize_entries(entries: &[Value]) -> Vec<ChatTurn> {
    let turns: Vec<ChatTurn> = entries.iter().filter_map(sanitize_entry).collect();
    if turns.len() < entries.len() {
        debug!(
            "Dropped {} malformed turn(s) from request history",
            entries.len() - turns.len()
        );
    }
    turns
}

fn sanitize_entry(entry: &Value) -> Option<ChatTurn> {
    let record = entry.as_object()?;
    let role = record.get("role").and_then(coerce_text)?;
    let role = Role::parse(&role)?;
    let content = record.get("content")?.as_str()?;
    if content.trim().is_empty() {
        return None;
    }
    Some(ChatTurn {
        role,
        content: content.to_string(),
    })
}

/// Scalar values coerce to their display form; anything structured has no text.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
