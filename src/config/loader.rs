// Configuration loader
// Loads settings from ~/.sahiti/config.toml (optional), then applies
// environment overrides for server-side keys and the bind address.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{Config, ProvidersConfig, SamplingConfig, ServerConfig};
use crate::providers::Provider;
use crate::router::ModelTable;

/// On-disk shape of config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TomlConfig {
    server: ServerConfig,
    sampling: SamplingConfig,
    providers: ProvidersConfig,
}

/// Load configuration from the config file and process environment
pub fn load_config() -> Result<Config> {
    // .env is optional; a missing file is not an error
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let path = config_path();
    let mut config = match &path {
        Some(path) if path.exists() => load_config_file(path)?,
        _ => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };

    apply_env(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Load a config file without looking at the environment
pub fn load_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let toml_config: TomlConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let models = toml_config
        .providers
        .apply_model_overrides(ModelTable::default());

    Ok(Config {
        server: toml_config.server,
        sampling: toml_config.sampling,
        providers: toml_config.providers,
        models,
    })
}

/// `$SAHITI_CONFIG`, else `~/.sahiti/config.toml`
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SAHITI_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".sahiti/config.toml"))
}

/// Overlay environment variables on a loaded config
///
/// Environment wins over the file. Empty values are ignored.
pub fn apply_env<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(key) = non_empty("GROQ_API_KEY") {
        config.providers.get_mut(Provider::Groq).api_key = Some(key);
    }
    if let Some(key) = non_empty("GOOGLE_GENERATIVE_AI_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")) {
        config.providers.get_mut(Provider::Gemini).api_key = Some(key);
    }
    if let Some(bind) = non_empty("SAHITI_BIND") {
        config.server.bind_address = bind;
    }
}
