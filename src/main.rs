// Sahiti - Multi-provider chat routing service
// Main entry point

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::prelude::*;

use sahiti::chat::{persona, Mode};
use sahiti::config::{load_config, Config, StreamProtocol};
use sahiti::providers::{keys, Provider};
use sahiti::server::ChatServer;

#[derive(Parser, Debug)]
#[command(name = "sahiti")]
#[command(about = "Persona-aware chat router over Groq, Gemini, OpenAI and Claude", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Bind address, overrides config and SAHITI_BIND
        #[arg(long)]
        bind: Option<String>,
        /// Response stream encoding: `data` (AI SDK data stream, default) or `text`
        #[arg(long, value_enum)]
        protocol: Option<ProtocolArg>,
    },
    /// Show which providers are usable with the current configuration
    Providers {
        /// Also check a client key for openai/claude
        #[arg(long = "api-key")]
        api_key: Option<String>,
    },
    /// Print the system prompt for a persona mode
    Prompt {
        /// general, productivity, wellness, learning, creative or bff
        mode: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProtocolArg {
    Text,
    Data,
}

impl From<ProtocolArg> for StreamProtocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Text => StreamProtocol::Text,
            ProtocolArg::Data => StreamProtocol::Data,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    match args.command {
        Some(Command::Serve { bind, protocol }) => run_server(bind, protocol).await,
        Some(Command::Providers { api_key }) => run_providers(api_key.as_deref()),
        Some(Command::Prompt { mode }) => run_prompt(&mode),
        None => run_server(None, None).await,
    }
}

/// Initialize tracing; RUST_LOG overrides the default "info" level
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn run_server(bind: Option<String>, protocol: Option<ProtocolArg>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    if let Some(protocol) = protocol {
        config.server.stream_protocol = protocol.into();
    }

    if config.usable_server_providers().is_empty() {
        tracing::warn!(
            "No server-side provider key configured; set GROQ_API_KEY or GOOGLE_GENERATIVE_AI_API_KEY"
        );
    }

    ChatServer::new(config)?.serve().await
}

fn run_providers(api_key: Option<&str>) -> Result<()> {
    let config = load_config()?;
    print_providers(&config, api_key);
    Ok(())
}

fn print_providers(config: &Config, api_key: Option<&str>) {
    let available = config.available_providers(api_key);

    for provider in Provider::ALL {
        let usable = available.contains(&provider);
        let source = match provider.env_var() {
            Some(var) => format!("server ({})", var),
            None => "client key".to_string(),
        };

        println!(
            "{} {:<8} {:<28} {:<32} {}",
            if usable { "✓" } else { "✗" },
            provider.display_name(),
            config.models.default_model(provider),
            source,
            keys::key_issuance_url(provider)
        );
    }
}

fn run_prompt(mode: &str) -> Result<()> {
    let resolved = Mode::resolve(Some(mode));
    if resolved.as_str() != mode.trim().to_ascii_lowercase() {
        eprintln!("Unknown mode '{}', using {}", mode, resolved);
    }
    println!("{}", persona::resolve_prompt(resolved));
    Ok(())
}
