// Model selection from message heuristics
//
// A plain keyword match over the latest user message. Deterministic on
// purpose: the same provider and text always map to the same model.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::providers::Provider;

const REASONING_KEYWORDS: &[&str] = &[
    "analyze", "compare", "plan", "strategy", "decision", "problem",
];

const CREATIVE_KEYWORDS: &[&str] = &[
    "creative", "brainstorm", "idea", "write", "design", "story",
];

/// Intent tier inferred from the message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Fast,
    Reasoning,
    Creative,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Fast => "fast",
            ModelTier::Reasoning => "reasoning",
            ModelTier::Creative => "creative",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify message text into a tier
///
/// Rules run in a fixed order and the last match wins, so text matching
/// both keyword sets lands in `Creative`.
pub fn classify_tier(text: &str) -> ModelTier {
    let lowered = text.to_lowercase();
    let mut tier = ModelTier::Fast;

    if REASONING_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        tier = ModelTier::Reasoning;
    }
    if CREATIVE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        tier = ModelTier::Creative;
    }

    tier
}

/// Groq model family, one model per tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredModels {
    pub fast: String,
    pub reasoning: String,
    pub creative: String,
}

impl TieredModels {
    pub fn get(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Reasoning => &self.reasoning,
            ModelTier::Creative => &self.creative,
        }
    }
}

/// Provider -> concrete model name
///
/// Only Groq is tiered; the other providers expose a single model and
/// ignore the tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTable {
    pub groq: TieredModels,
    pub gemini: String,
    pub openai: String,
    pub claude: String,
}

impl Default for ModelTable {
    fn default() -> Self {
        Self {
            groq: TieredModels {
                fast: "llama-3.1-8b-instant".to_string(),
                reasoning: "llama-3.3-70b-versatile".to_string(),
                creative: "qwen/qwen3-32b".to_string(),
            },
            gemini: "gemini-2.0-flash".to_string(),
            openai: "gpt-4o-mini".to_string(),
            claude: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

impl ModelTable {
    pub fn model_for(&self, provider: Provider, tier: ModelTier) -> &str {
        match provider {
            Provider::Groq => self.groq.get(tier),
            Provider::Gemini => &self.gemini,
            Provider::OpenAI => &self.openai,
            Provider::Claude => &self.claude,
        }
    }

    /// Model used when nothing in the message suggests a tier
    pub fn default_model(&self, provider: Provider) -> &str {
        self.model_for(provider, ModelTier::Fast)
    }

    /// Classify `text` and look up the model for `provider`
    pub fn select(&self, provider: Provider, text: &str) -> (ModelTier, &str) {
        let tier = classify_tier(text);
        (tier, self.model_for(provider, tier))
    }
}

static DEFAULT_MODELS: Lazy<ModelTable> = Lazy::new(ModelTable::default);

/// Pick a model with the built-in table
pub fn select_model(provider: Provider, last_user_message: &str) -> &'static str {
    DEFAULT_MODELS.select(provider, last_user_message).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keywords_is_fast() {
        assert_eq!(classify_tier("hello there"), ModelTier::Fast);
        assert_eq!(select_model(Provider::Groq, "hello there"), "llama-3.1-8b-instant");
    }

    #[test]
    fn test_empty_text_is_fast() {
        assert_eq!(classify_tier(""), ModelTier::Fast);
    }

    #[test]
    fn test_reasoning_keywords() {
        assert_eq!(classify_tier("Can you ANALYZE this?"), ModelTier::Reasoning);
        assert_eq!(
            select_model(Provider::Groq, "help me compare two jobs"),
            "llama-3.3-70b-versatile"
        );
    }

    #[test]
    fn test_creative_keywords() {
        assert_eq!(classify_tier("Brainstorm names"), ModelTier::Creative);
        assert_eq!(select_model(Provider::Groq, "tell me a story"), "qwen/qwen3-32b");
    }

    #[test]
    fn test_creative_wins_conflict() {
        assert_eq!(classify_tier("plan a story"), ModelTier::Creative);
        assert_eq!(select_model(Provider::Groq, "plan a story"), "qwen/qwen3-32b");
    }

    #[test]
    fn test_substring_matching() {
        // "planet" contains "plan"; matching is substring-based
        assert_eq!(classify_tier("which planet is largest"), ModelTier::Reasoning);
    }

    #[test]
    fn test_other_providers_ignore_tier() {
        for text in ["hi", "analyze this", "write a poem"] {
            assert_eq!(select_model(Provider::Gemini, text), "gemini-2.0-flash");
            assert_eq!(select_model(Provider::OpenAI, text), "gpt-4o-mini");
            assert_eq!(select_model(Provider::Claude, text), "claude-sonnet-4-20250514");
        }
    }

    #[test]
    fn test_selection_is_deterministic() {
        for provider in Provider::ALL {
            for text in ["", "plan", "story", "plan a story", "random words"] {
                assert_eq!(select_model(provider, text), select_model(provider, text));
            }
        }
    }
}
