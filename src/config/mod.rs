// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{apply_env, load_config, load_config_file};
pub use settings::{
    Config, ProviderSettings, ProvidersConfig, SamplingConfig, ServerConfig, StreamProtocol,
};
