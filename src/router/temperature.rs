// Sampling temperature policy

use serde::{Deserialize, Serialize};

use super::ModelTier;
use crate::chat::Mode;

/// Temperature per persona/intent
///
/// Precedence is creative > bff > default. "Creative" covers both the
/// creative persona and a creative-tier message in any persona.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperaturePolicy {
    pub creative: f32,
    pub bff: f32,
    pub default: f32,
}

impl Default for TemperaturePolicy {
    fn default() -> Self {
        Self {
            creative: 0.8,
            bff: 0.9,
            default: 0.7,
        }
    }
}

impl TemperaturePolicy {
    pub fn temperature_for(&self, mode: Mode, tier: ModelTier) -> f32 {
        if mode == Mode::Creative || tier == ModelTier::Creative {
            self.creative
        } else if mode == Mode::Bff {
            self.bff
        } else {
            self.default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let policy = TemperaturePolicy::default();
        assert_eq!(policy.temperature_for(Mode::General, ModelTier::Fast), 0.7);
        assert_eq!(policy.temperature_for(Mode::Learning, ModelTier::Reasoning), 0.7);
        assert_eq!(policy.temperature_for(Mode::Creative, ModelTier::Fast), 0.8);
        assert_eq!(policy.temperature_for(Mode::Bff, ModelTier::Fast), 0.9);
    }

    #[test]
    fn test_creative_beats_bff() {
        let policy = TemperaturePolicy::default();
        assert_eq!(policy.temperature_for(Mode::Bff, ModelTier::Creative), 0.8);
        assert_eq!(policy.temperature_for(Mode::Wellness, ModelTier::Creative), 0.8);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let policy: TemperaturePolicy = toml::from_str("bff = 1.0").unwrap();
        assert_eq!(policy.bff, 1.0);
        assert_eq!(policy.creative, 0.8);
        assert_eq!(policy.default, 0.7);
    }
}
