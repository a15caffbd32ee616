use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::chat::augmenter::{CtaFormat, DEFAULT_BUSINESS_FORM_URL, DEFAULT_TRAVEL_QUOTE_FORM_URL};
use crate::chat::normalizer::DEFAULT_MAX_TURNS;
use crate::llm_client::prompts::DEFAULT_SYSTEM_PROMPT;
use crate::llm_client::{
    CompletionSettings, DEFAULT_API_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};

pub const DEFAULT_FALLBACK_REPLY: &str = "Thanks for your message. How can I help you today?";

/// Application configuration loaded from environment variables.
///
/// Everything has a default except the API key. A missing key does not stop
/// startup; chat requests answer 500 until one is provided.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
    pub system_prompt: String,
    pub fallback_reply: String,
    pub business_form_url: String,
    pub travel_quote_form_url: String,
    /// `None` keeps the whole history.
    pub max_history_turns: Option<usize>,
    pub cta_format: CtaFormat,
    pub strip_markdown_links: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai_api_key: None,
            openai_api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: 60,
            port: 8080,
            rust_log: "info".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
            business_form_url: DEFAULT_BUSINESS_FORM_URL.to_string(),
            travel_quote_form_url: DEFAULT_TRAVEL_QUOTE_FORM_URL.to_string(),
            max_history_turns: Some(DEFAULT_MAX_TURNS),
            cta_format: CtaFormat::Html,
            strip_markdown_links: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        let system_prompt = match optional_env("SYSTEM_PROMPT_FILE") {
            Some(path) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read system prompt from '{path}'"))?,
            None => defaults.system_prompt,
        };

        let max_history_turns = match parse_env::<usize>("MAX_HISTORY_TURNS")? {
            Some(0) => None,
            Some(n) => Some(n),
            None => defaults.max_history_turns,
        };

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_api_url: optional_env("OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
            model: optional_env("OPENAI_MODEL").unwrap_or(defaults.model),
            temperature: parse_env("OPENAI_TEMPERATURE")?.unwrap_or(defaults.temperature),
            max_tokens: parse_env("OPENAI_MAX_TOKENS")?.unwrap_or(defaults.max_tokens),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            port: parse_env("PORT")?.unwrap_or(defaults.port),
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            system_prompt,
            fallback_reply: optional_env("FALLBACK_REPLY").unwrap_or(defaults.fallback_reply),
            business_form_url: optional_env("BUSINESS_FORM_URL")
                .unwrap_or(defaults.business_form_url),
            travel_quote_form_url: optional_env("TRAVEL_QUOTE_FORM_URL")
                .unwrap_or(defaults.travel_quote_form_url),
            max_history_turns,
            cta_format: parse_env("CTA_FORMAT")?.unwrap_or(defaults.cta_format),
            strip_markdown_links: parse_env("STRIP_MARKDOWN_LINKS")?
                .unwrap_or(defaults.strip_markdown_links),
        })
    }

    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            api_url: self.openai_api_url.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Unset and blank variables are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)
        .map(|raw| parse_value(key, &raw))
        .transpose()
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("Environment variable '{key}' has invalid value '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_valid_numbers() {
        assert_eq!(parse_value::<u16>("PORT", " 9000 ").unwrap(), 9000);
        assert!((parse_value::<f32>("OPENAI_TEMPERATURE", "0.7").unwrap() - 0.7).abs() < 1e-6);
        assert!(parse_value::<bool>("STRIP_MARKDOWN_LINKS", "false").is_ok());
    }

    #[test]
    fn test_parse_value_names_the_variable() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(err.to_string().contains("eighty"));
    }

    #[test]
    fn test_parse_value_cta_format() {
        assert_eq!(
            parse_value::<CtaFormat>("CTA_FORMAT", "plain").unwrap(),
            CtaFormat::Plain
        );
        assert!(parse_value::<CtaFormat>("CTA_FORMAT", "rich").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 450);
        assert_eq!(config.max_history_turns, Some(18));
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.completion_settings().timeout, Duration::from_secs(60));
    }
}
