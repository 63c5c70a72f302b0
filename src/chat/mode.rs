// Persona modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Persona tag selecting the system prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    General,
    Productivity,
    Wellness,
    Learning,
    Creative,
    Bff,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::General,
        Mode::Productivity,
        Mode::Wellness,
        Mode::Learning,
        Mode::Creative,
        Mode::Bff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::General => "general",
            Mode::Productivity => "productivity",
            Mode::Wellness => "wellness",
            Mode::Learning => "learning",
            Mode::Creative => "creative",
            Mode::Bff => "bff",
        }
    }

    /// Resolve a client-supplied mode; absent or unknown falls back to General
    pub fn resolve(name: Option<&str>) -> Mode {
        name.and_then(|n| n.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown mode '{}'", s))
    }
}
