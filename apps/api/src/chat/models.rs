#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a chat turn. Client input can only ever produce these two;
/// the system role is reserved for the server-side prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Strict parse: anything other than exactly `user` / `assistant` is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chronologically ordered turns rebuilt from the request on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new(turns: Vec<ChatTurn>) -> Self {
        Self { turns }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Content of the most recent visitor turn, if any.
    pub fn last_user_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    TravelQuote,
    Business,
}

/// Intent categories matched in the latest visitor turn. Both may be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntentFlags {
    pub travel_quote: bool,
    pub business: bool,
}

impl IntentFlags {
    pub fn contains(&self, category: IntentCategory) -> bool {
        match category {
            IntentCategory::TravelQuote => self.travel_quote,
            IntentCategory::Business => self.business,
        }
    }

    pub fn matched(&self) -> Vec<IntentCategory> {
        [IntentCategory::TravelQuote, IntentCategory::Business]
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !self.travel_quote && !self.business
    }
}

/// A fixed link offered to the visitor at most once per thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallToAction {
    pub category: IntentCategory,
    pub url: String,
    pub label: String,
    /// Transition sentence printed ahead of the link.
    pub lead_in: String,
}

/// Raw request body. Fields stay untyped JSON so that a malformed field is
/// filtered by the normalizer instead of failing the whole request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatPayload {
    pub message: Value,
    pub messages: Value,
    pub page: Value,
    pub source: Value,
}

impl From<Value> for ChatPayload {
    fn from(body: Value) -> Self {
        match body {
            Value::Object(mut map) => Self {
                message: map.remove("message").unwrap_or(Value::Null),
                messages: map.remove("messages").unwrap_or(Value::Null),
                page: map.remove("page").unwrap_or(Value::Null),
                source: map.remove("source").unwrap_or(Value::Null),
            },
            _ => Self::default(),
        }
    }
}

impl ChatPayload {
    pub fn page(&self) -> Option<&str> {
        non_blank_str(&self.page)
    }

    pub fn source(&self) -> Option<&str> {
        non_blank_str(&self.source)
    }
}

fn non_blank_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}
