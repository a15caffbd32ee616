//! Chat pipeline — composes the pure stages around the completion call.
//!
//! `prepare` runs before the model is called (normalize, classify, build the
//! system prompt); `finish` runs after (fallback reply, augmentation). Only
//! the completion call sees the bounded history; the link check sees all of
//! it. Built once at startup from `Config` and shared read-only across requests.

use crate::chat::augmenter::{default_catalog, ReplyAugmenter};
use crate::chat::intent::KeywordIntentClassifier;
use crate::chat::models::{ChatPayload, Conversation, IntentFlags};
use crate::chat::normalizer::{NormalizeError, Normalizer};
use crate::config::Config;
use crate::llm_client::prompts::context_block;

/// Everything the completion step and the augmenter need for one request.
#[derive(Debug, Clone)]
pub struct PreparedChat {
    /// The whole sanitized thread. Used to tell whether a link was already shared.
    pub history: Conversation,
    /// Bounded suffix of `history` sent to the completion API.
    pub conversation: Conversation,
    pub intent: IntentFlags,
    pub system_prompt: String,
}

#[derive(Debug, Clone)]
pub struct ChatPipeline {
    normalizer: Normalizer,
    classifier: KeywordIntentClassifier,
    augmenter: ReplyAugmenter,
    system_prompt: String,
    fallback_reply: String,
}

impl ChatPipeline {
    pub fn new(
        normalizer: Normalizer,
        classifier: KeywordIntentClassifier,
        augmenter: ReplyAugmenter,
        system_prompt: impl Into<String>,
        fallback_reply: impl Into<String>,
    ) -> Self {
        Self {
            normalizer,
            classifier,
            augmenter,
            system_prompt: system_prompt.into(),
            fallback_reply: fallback_reply.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let catalog = default_catalog(&config.business_form_url, &config.travel_quote_form_url);
        Self::new(
            Normalizer::new(config.max_history_turns),
            KeywordIntentClassifier::default(),
            ReplyAugmenter::new(catalog, config.cta_format, config.strip_markdown_links),
            config.system_prompt.clone(),
            config.fallback_reply.clone(),
        )
    }

    pub fn prepare(&self, payload: &ChatPayload) -> Result<PreparedChat, NormalizeError> {
        let history = self.normalizer.sanitize(payload)?;
        let conversation = self.normalizer.bound(&history);
        let intent = self.classifier.classify(conversation.last_user_text());
        let system_prompt = format!(
            "{}{}",
            self.system_prompt,
            context_block(payload.page(), payload.source())
        );

        Ok(PreparedChat {
            history,
            conversation,
            intent,
            system_prompt,
        })
    }

    pub fn finish(&self, prepared: &PreparedChat, completion: Option<String>) -> String {
        let reply = completion.unwrap_or_else(|| self.fallback_reply.clone());
        self.augmenter
            .augment(&reply, &prepared.intent, &prepared.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::link_guard::already_shared;
    use crate::chat::models::{ChatTurn, IntentCategory};
    use serde_json::json;

    const BUSINESS: &str = "https://business.example/";
    const QUOTE: &str = "https://quotes.example/";

    fn pipeline() -> ChatPipeline {
        let config = Config {
            business_form_url: BUSINESS.to_string(),
            travel_quote_form_url: QUOTE.to_string(),
            system_prompt: "SYSTEM".to_string(),
            ..Config::default()
        };
        ChatPipeline::from_config(&config)
    }

    #[test]
    fn test_cruise_cost_scenario() {
        let pipeline = pipeline();
        let payload = ChatPayload::from(json!({ "message": "What's the cost for a 7-night cruise?" }));
        let prepared = pipeline.prepare(&payload).unwrap();

        assert_eq!(
            prepared.conversation.turns(),
            &[ChatTurn::user("What's the cost for a 7-night cruise?")]
        );
        assert_eq!(prepared.intent.matched(), vec![IntentCategory::TravelQuote]);

        let reply = pipeline.finish(&prepared, Some("Prices depend on the ship.".to_string()));
        assert!(reply.starts_with("Prices depend on the ship."));
        assert!(reply.contains(&format!("<a href=\"{QUOTE}\"")));
        assert!(!reply.contains(BUSINESS));
    }

    #[test]
    fn test_business_link_already_shared_scenario() {
        let pipeline = pipeline();
        let payload = ChatPayload::from(json!({
            "messages": [
                { "role": "user", "content": "I want to join the business" },
                { "role": "assistant", "content": format!("... <a href=\"{BUSINESS}\">...</a>") }
            ]
        }));
        let prepared = pipeline.prepare(&payload).unwrap();

        assert!(prepared.intent.business);
        assert!(already_shared(&prepared.conversation, BUSINESS));

        let reply = pipeline.finish(&prepared, Some("Glad you're interested.".to_string()));
        assert_eq!(reply, "Glad you're interested.");
    }

    #[test]
    fn test_link_shared_beyond_history_bound_is_not_offered_again() {
        let pipeline = pipeline();
        let mut messages = vec![
            json!({ "role": "user", "content": "I want to join the business" }),
            json!({ "role": "assistant", "content": format!("Here: <a href=\"{BUSINESS}\">form</a>") }),
        ];
        for i in 0..18 {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            messages.push(json!({ "role": role, "content": format!("small talk {i}") }));
        }
        messages.push(json!({ "role": "user", "content": "tell me more about the business" }));

        let prepared = pipeline
            .prepare(&ChatPayload::from(json!({ "messages": messages })))
            .unwrap();
        assert_eq!(prepared.history.len(), 21);
        assert_eq!(prepared.conversation.len(), 18);
        assert!(!already_shared(&prepared.conversation, BUSINESS));
        assert!(prepared.intent.business);

        let reply = pipeline.finish(&prepared, Some("Sure.".to_string()));
        assert_eq!(reply, "Sure.");
    }

    #[test]
    fn test_intent_uses_latest_user_turn_only() {
        let payload = ChatPayload::from(json!({
            "messages": [
                { "role": "user", "content": "how much is a cruise?" },
                { "role": "assistant", "content": "It depends." },
                { "role": "user", "content": "thanks!" }
            ]
        }));
        let prepared = pipeline().prepare(&payload).unwrap();
        assert!(prepared.intent.is_empty());
    }

    #[test]
    fn test_context_appended_to_system_prompt() {
        let payload = ChatPayload::from(json!({
            "message": "hi",
            "page": "/memories",
            "source": "facebook"
        }));
        let prepared = pipeline().prepare(&payload).unwrap();
        assert_eq!(
            prepared.system_prompt,
            "SYSTEM\n\nContext:\nPage: /memories\nSource: facebook\n"
        );
    }

    #[test]
    fn test_missing_completion_uses_fallback_then_augments() {
        let pipeline = pipeline();
        let prepared = pipeline
            .prepare(&ChatPayload::from(json!({ "message": "tell me more" })))
            .unwrap();
        let reply = pipeline.finish(&prepared, None);
        assert!(reply.starts_with("Thanks for your message. How can I help you today?"));
        assert!(reply.contains(BUSINESS));
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        let result = pipeline().prepare(&ChatPayload::default());
        assert_eq!(result.unwrap_err(), NormalizeError::EmptyConversation);
    }
}
