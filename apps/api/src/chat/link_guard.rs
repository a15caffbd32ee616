use crate::chat::models::Conversation;

/// Whether `url` already appears anywhere in the replayed thread.
///
/// There is no server-side session, so "already offered" is re-derived from
/// the history the client sends back on every request.
pub fn already_shared(conversation: &Conversation, url: &str) -> bool {
    if url.is_empty() || conversation.is_empty() {
        return false;
    }

    let joined = conversation
        .turns()
        .iter()
        .map(|t| t.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    joined.contains(&url.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::ChatTurn;

    const URL: &str = "https://business.example/";

    #[test]
    fn test_empty_conversation_never_shared() {
        assert!(!already_shared(&Conversation::default(), URL));
    }

    #[test]
    fn test_url_in_assistant_anchor_is_shared() {
        let conv = Conversation::new(vec![
            ChatTurn::user("I want to join the business"),
            ChatTurn::assistant(format!("Sure! <a href=\"{URL}\">Continue</a>")),
        ]);
        assert!(already_shared(&conv, URL));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let conv = Conversation::new(vec![ChatTurn::assistant(
            "See HTTPS://BUSINESS.EXAMPLE/ for details",
        )]);
        assert!(already_shared(&conv, URL));
        assert!(already_shared(&conv, "https://Business.Example/"));
    }

    #[test]
    fn test_url_in_user_turn_also_counts() {
        let conv = Conversation::new(vec![ChatTurn::user(format!("I saw {URL} already"))]);
        assert!(already_shared(&conv, URL));
    }

    #[test]
    fn test_other_url_not_shared() {
        let conv = Conversation::new(vec![ChatTurn::assistant(
            "<a href=\"https://quotes.example/\">Quote</a>",
        )]);
        assert!(!already_shared(&conv, URL));
    }

    #[test]
    fn test_prefix_without_trailing_slash_not_shared() {
        let conv = Conversation::new(vec![ChatTurn::assistant("visit https://business.example")]);
        assert!(!already_shared(&conv, URL));
    }

    #[test]
    fn test_equivalent_to_joined_substring() {
        let conv = Conversation::new(vec![
            ChatTurn::user("https://busi"),
            ChatTurn::assistant("ness.example/"),
        ]);
        // Turns are joined with a space, so a URL split across turns never matches.
        assert!(!already_shared(&conv, URL));
        assert!(already_shared(&conv, "busi ness"));
    }

    #[test]
    fn test_empty_url_never_shared() {
        let conv = Conversation::new(vec![ChatTurn::user("hello")]);
        assert!(!already_shared(&conv, ""));
    }
}
