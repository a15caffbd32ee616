//! Intent classification — keyword substring matching over the visitor's latest turn.
//!
//! Matching is deliberately naive: lower-case the text, then a category matches
//! if any of its keywords appears anywhere in it. No word boundaries, no
//! negation handling, no weighting. Precedence between categories is decided
//! by the reply augmenter, not here.

use crate::chat::models::IntentFlags;

/// Keywords that signal interest in a travel quote.
pub const TRAVEL_QUOTE_KEYWORDS: &[&str] = &[
    "quote", "price", "cost", "book", "booking", "cruise", "resort", "vacation", "trip", "travel",
];

/// Keywords that signal interest in the business opportunity.
pub const BUSINESS_KEYWORDS: &[&str] = &[
    "get started",
    "how do i start",
    "join",
    "partner",
    "business",
    "opportunity",
    "commission",
    "residual",
    "tell me more",
];

#[derive(Debug, Clone)]
pub struct KeywordIntentClassifier {
    travel_keywords: Vec<String>,
    business_keywords: Vec<String>,
}

impl Default for KeywordIntentClassifier {
    fn default() -> Self {
        Self::new(TRAVEL_QUOTE_KEYWORDS, BUSINESS_KEYWORDS)
    }
}

impl KeywordIntentClassifier {
    pub fn new<S: AsRef<str>>(travel_keywords: &[S], business_keywords: &[S]) -> Self {
        Self {
            travel_keywords: lowercase_all(travel_keywords),
            business_keywords: lowercase_all(business_keywords),
        }
    }

    pub fn classify(&self, text: Option<&str>) -> IntentFlags {
        let text = match text {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return IntentFlags::default(),
        };

        IntentFlags {
            travel_quote: contains_any(&text, &self.travel_keywords),
            business: contains_any(&text, &self.business_keywords),
        }
    }
}

fn lowercase_all<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}
