//! Reply augmentation — appends at most one call-to-action block to a generated reply.
//!
//! Rules:
//! 1. Markdown links the model emitted anyway are flattened to their label.
//! 2. If the reply still carries a hyperlink, nothing is appended.
//! 3. Business interest outranks travel-quote interest.
//! 4. A call-to-action whose URL already appears in the thread is skipped.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::chat::link_guard::already_shared;
use crate::chat::models::{CallToAction, Conversation, IntentCategory, IntentFlags};

pub const DEFAULT_BUSINESS_FORM_URL: &str = "https://raythetravelpreneur.netlify.app/";
pub const DEFAULT_TRAVEL_QUOTE_FORM_URL: &str =
    "https://formoretravelstationquoteform.netlify.app/";

/// Order in which matched intents compete for the single call-to-action slot.
const PRECEDENCE: [IntentCategory; 2] = [IntentCategory::Business, IntentCategory::TravelQuote];

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]\n]*)\]\(([^)\s]*)\)").unwrap());

static HTML_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a\s[^>]*href\s*=").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CtaFormat {
    #[default]
    Html,
    Plain,
}

impl FromStr for CtaFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(CtaFormat::Html),
            "plain" => Ok(CtaFormat::Plain),
            other => Err(format!("unknown call-to-action format '{other}'")),
        }
    }
}

/// The two stock offers: the business page and the travel quote form.
pub fn default_catalog(business_url: &str, travel_quote_url: &str) -> Vec<CallToAction> {
    vec![
        CallToAction {
            category: IntentCategory::Business,
            url: business_url.to_string(),
            label: "Continue the conversation here".to_string(),
            lead_in: "The easiest next step is a quick form so Ray can follow up personally \
                      and walk you through how it works."
                .to_string(),
        },
        CallToAction {
            category: IntentCategory::TravelQuote,
            url: travel_quote_url.to_string(),
            label: "Request a travel quote".to_string(),
            lead_in: "If you would like a personalized quote, the easiest next step is a \
                      quick request form."
                .to_string(),
        },
    ]
}

#[derive(Debug, Clone)]
pub struct ReplyAugmenter {
    catalog: Vec<CallToAction>,
    format: CtaFormat,
    strip_markdown_links: bool,
}

impl ReplyAugmenter {
    pub fn new(catalog: Vec<CallToAction>, format: CtaFormat, strip_markdown_links: bool) -> Self {
        Self {
            catalog,
            format,
            strip_markdown_links,
        }
    }

    /// Picks the one call-to-action worth offering, if any.
    pub fn select_offer(
        &self,
        flags: &IntentFlags,
        conversation: &Conversation,
    ) -> Option<&CallToAction> {
        PRECEDENCE
            .iter()
            .filter(|category| flags.contains(**category))
            .filter_map(|category| self.catalog.iter().find(|c| c.category == *category))
            .find(|cta| !already_shared(conversation, &cta.url))
    }

    pub fn augment(&self, reply: &str, flags: &IntentFlags, conversation: &Conversation) -> String {
        let reply = if self.strip_markdown_links {
            strip_markdown_links(reply)
        } else {
            reply.to_string()
        };

        if has_hyperlink(&reply) {
            debug!("Reply already contains a hyperlink; skipping call-to-action");
            return reply;
        }

        match self.select_offer(flags, conversation) {
            Some(cta) => {
                debug!("Appending {:?} call-to-action", cta.category);
                format!("{reply}{}", render_block(cta, self.format))
            }
            None => reply,
        }
    }
}

/// Replaces `[label](url)` (and image syntax) with just the label.
pub fn strip_markdown_links(text: &str) -> String {
    MARKDOWN_LINK.replace_all(text, "${1}").into_owned()
}

/// Whether the text contains an HTML anchor with an href or a markdown link.
pub fn has_hyperlink(text: &str) -> bool {
    HTML_ANCHOR.is_match(text) || MARKDOWN_LINK.is_match(text)
}

fn render_block(cta: &CallToAction, format: CtaFormat) -> String {
    match format {
        CtaFormat::Html => format!(
            "\n<br><br>\n{}\n<br><br>\n<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">\n{}\n</a>\n",
            cta.lead_in, cta.url, cta.label
        ),
        CtaFormat::Plain => format!("\n\n{}\n\n{}: {}", cta.lead_in, cta.label, cta.url),
    }
}
