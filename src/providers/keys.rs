// API key format checks
//
// A sanity check on the shape of a credential before any outbound call.
// Passing here does not mean the vendor will accept the key.

use super::Provider;

/// Prefix every key for `provider` must start with (case-sensitive)
pub fn required_prefix(provider: Provider) -> &'static str {
    match provider {
        Provider::Groq => "gsk_",
        Provider::Gemini => "AIzaSy",
        Provider::OpenAI => "sk-",
        Provider::Claude => "sk-ant-",
    }
}

/// Check a key against the provider's format rule
///
/// Keys carrying whitespace or control characters are rejected too; they
/// cannot be sent as a header value.
pub fn is_valid(key: Option<&str>, provider: Provider) -> bool {
    match key {
        Some(key) if !key.is_empty() => {
            !key.chars().any(|c| c.is_whitespace() || c.is_control())
                && key.starts_with(required_prefix(provider))
        }
        _ => false,
    }
}

/// Where a user can issue a key for this provider
pub fn key_issuance_url(provider: Provider) -> &'static str {
    match provider {
        Provider::Groq => "https://console.groq.com/keys",
        Provider::Gemini => "https://aistudio.google.com/app/apikey",
        Provider::OpenAI => "https://platform.openai.com/api-keys",
        Provider::Claude => "https://console.anthropic.com/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_rules() {
        assert!(is_valid(Some("gsk_abc123"), Provider::Groq));
        assert!(!is_valid(Some("sk-abc"), Provider::Groq));
        assert!(is_valid(Some("AIzaSyD-example"), Provider::Gemini));
        assert!(is_valid(Some("sk-proj-123"), Provider::OpenAI));
        assert!(is_valid(Some("sk-ant-api03-xyz"), Provider::Claude));
        assert!(!is_valid(Some("sk-proj-123"), Provider::Claude));
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert!(!is_valid(Some("GSK_abc"), Provider::Groq));
        assert!(!is_valid(Some("aizasy123"), Provider::Gemini));
    }

    #[test]
    fn test_empty_and_missing_keys() {
        assert!(!is_valid(Some(""), Provider::OpenAI));
        assert!(!is_valid(Some("   "), Provider::OpenAI));
        assert!(!is_valid(None, Provider::Claude));
    }

    #[test]
    fn test_pasted_keys_with_stray_characters() {
        assert!(!is_valid(Some("sk-abc\n"), Provider::OpenAI));
        assert!(!is_valid(Some("sk-ant-abc "), Provider::Claude));
        assert!(!is_valid(Some("gsk_a b"), Provider::Groq));
        assert!(!is_valid(Some("AIzaSy\t123"), Provider::Gemini));
        assert!(!is_valid(Some("sk-abc\u{7f}"), Provider::OpenAI));
    }

    #[test]
    fn test_claude_key_also_passes_openai_rule() {
        // "sk-ant-" starts with "sk-"; the rule is a prefix check only
        assert!(is_valid(Some("sk-ant-xyz"), Provider::OpenAI));
    }
}
