//! Command-line interface parsing and handling
//!
//! Subcommands read or update the config file and exit; without one the
//! interactive chat session starts.

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::core::builtin_providers::{find_builtin_provider, provider_ids};
use crate::core::chat_stream::HttpBackend;
use crate::core::config::{Config, ConfigStore};
use crate::logging::init_file_logging;
use crate::ui::chat_loop::run_chat;

#[derive(Parser, Debug)]
#[command(name = "nexly")]
#[command(about = "Nexly - AI Coding Assistant")]
#[command(
    long_about = "Nexly is a terminal coding assistant that streams answers from OpenAI, \
Anthropic, Google, OpenRouter and NVIDIA models, with a summary of the current \
directory attached to every prompt.\n\n\
Configuration lives in ~/.nexly/config.json. API keys can be stored there with \
'nexly config set-key <provider> <key>' or supplied through each provider's \
environment variable.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Ctrl+P            Open the command palette\n\
  Ctrl+U            Clear the input\n\
  PgUp/PgDn         Scroll the conversation\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Save PROVIDER as the active provider and exit
    #[arg(short = 'p', long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Save MODEL as the active model and exit
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Sampling temperature for this session
    #[arg(short = 't', long)]
    pub temperature: Option<f64>,

    /// Maximum tokens per response for this session
    #[arg(short = 'M', long = "max-tokens", value_name = "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Abort a response after SECONDS (0 disables the limit)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Write diagnostic logs to FILE (filter with NEXLY_LOG)
    #[arg(long, value_name = "FILE")]
    pub debug_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show or set the AI provider
    Provider {
        #[command(subcommand)]
        command: Option<ProviderCommands>,
    },
    /// Show or set the AI model
    Model {
        #[command(subcommand)]
        command: Option<ModelCommands>,
    },
    /// Show configuration or store an API key
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show version
    Version,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ProviderCommands {
    /// Set the AI provider
    Set { provider: String },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ModelCommands {
    /// Set the AI model
    Set { model: String },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Store an API key for a provider
    SetKey { provider: String, key: String },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = &args.debug_log {
        init_file_logging(path)?;
    }

    let store = ConfigStore::open_default()?;
    let mut stdout = io::stdout();

    if let Some(command) = args.command {
        return execute_command(&store, command, &mut stdout);
    }
    if apply_saved_flags(&store, &args, &mut stdout)? {
        return Ok(());
    }

    let config = session_config(store.load(), &args);
    let backend = HttpBackend::new(config.request_timeout());
    tracing::debug!(
        provider = %config.provider,
        model = %config.model,
        timeout = ?backend.timeout(),
        "starting chat session"
    );
    run_chat(store, config, Arc::new(backend)).await
}

fn require_known_provider(name: &str) -> Result<(), Box<dyn Error>> {
    if find_builtin_provider(name).is_some() {
        return Ok(());
    }
    Err(format!(
        "Unknown provider: {name}. Available providers: {}",
        provider_ids().join(", ")
    )
    .into())
}

/// Handle `-p` and `-m`. Returns true when either was given, in which case
/// the value has been saved and no session should start.
pub fn apply_saved_flags(
    store: &ConfigStore,
    args: &Args,
    out: &mut impl Write,
) -> Result<bool, Box<dyn Error>> {
    let mut handled = false;

    if let Some(provider) = &args.provider {
        require_known_provider(provider)?;
        store.set_provider(provider)?;
        writeln!(out, "Provider set to: {provider}")?;
        handled = true;
    }
    if let Some(model) = &args.model {
        store.set_model(model)?;
        writeln!(out, "Model set to: {model}")?;
        handled = true;
    }

    Ok(handled)
}

/// Layer the per-session overrides over the saved config. Nothing here is
/// written back.
pub fn session_config(mut config: Config, args: &Args) -> Config {
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = Some(timeout);
    }
    config
}

pub fn version_line() -> String {
    let revision = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown");
    format!("Nexly version {} ({revision})", env!("CARGO_PKG_VERSION"))
}

pub fn execute_command(
    store: &ConfigStore,
    command: Commands,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Provider { command: None } => {
            writeln!(out, "Current provider: {}", store.load().provider)?;
        }
        Commands::Provider {
            command: Some(ProviderCommands::Set { provider }),
        } => {
            require_known_provider(&provider)?;
            store.set_provider(&provider)?;
            writeln!(out, "Provider set to: {provider}")?;
        }
        Commands::Model { command: None } => {
            writeln!(out, "Current model: {}", store.load().model)?;
        }
        Commands::Model {
            command: Some(ModelCommands::Set { model }),
        } => {
            store.set_model(&model)?;
            writeln!(out, "Model set to: {model}")?;
        }
        Commands::Config { command: None } => {
            store.load().print_all(store.path(), out)?;
        }
        Commands::Config {
            command: Some(ConfigCommands::SetKey { provider, key }),
        } => {
            require_known_provider(&provider)?;
            if key.trim().is_empty() {
                return Err("API key must not be empty".into());
            }
            store.set_api_key(&provider, &key)?;
            writeln!(out, "API key saved for provider: {provider}")?;
        }
        Commands::Version => {
            writeln!(out, "{}", version_line())?;
        }
    }
    Ok(())
}
