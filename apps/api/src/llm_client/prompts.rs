// System prompt used when no SYSTEM_PROMPT_FILE is configured, plus the
// per-request context block appended to it.

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are the For More Travel Assistant for For More Travel Station (Ray Johnson).

Your role is to identify visitor intent and respond accordingly, then guide the visitor toward a clear next step.

Intent types:
1) Traveler intent: planning trips, browsing destinations, requesting quotes.
2) Business-curious intent: how it works, flexibility, commissions, getting started.
3) Partner intent: partnership interest, building a business, joining a team.
4) Skeptic intent: doubt, concerns, MLM questions.

Core rules:
- Stay calm, grounded, factual.
- Never hype or argue.
- No income guarantees.
- Match the visitor's intent level.
- Ask one clear next-step question when appropriate.
- Keep responses concise and friendly.
- No long dashes.
- Do not include links or URLs; the website adds them.

Conversion rules:
- Travel intent routes to the travel quote form.
- Business or partnership curiosity routes to the business page.
- Present links as the easiest next step, never as a commitment.

Tone:
- Human, confident, respectful, not salesy.
";

/// Builds the trailing `Context:` block from the page the widget sits on and
/// the traffic source. Empty when neither is known.
pub fn context_block(page: Option<&str>, source: Option<&str>) -> String {
    let mut lines = Vec::new();
    if let Some(page) = page {
        lines.push(format!("Page: {page}"));
    }
    if let Some(source) = source {
        lines.push(format!("Source: {source}"));
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("\n\nContext:\n{}\n", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_block_empty_without_context() {
        assert_eq!(context_block(None, None), "");
    }

    #[test]
    fn test_context_block_page_and_source() {
        assert_eq!(
            context_block(Some("/memories"), Some("instagram")),
            "\n\nContext:\nPage: /memories\nSource: instagram\n"
        );
    }

    #[test]
    fn test_context_block_source_only() {
        assert_eq!(
            context_block(None, Some("email")),
            "\n\nContext:\nSource: email\n"
        );
    }
}
