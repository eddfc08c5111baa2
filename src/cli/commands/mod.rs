mod subcommands;


use crate::catalog::ImageCatalog;
use crate::config::{Config, load_config};
use crate::conversation::JsonFileStore;
use crate::dispatch::{Dispatcher, ResponderSettings};
use crate::gateway::GatewayState;
use crate::line::LineClient;
use crate::providers::{GeminiProvider, LLMProvider};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "mygo-bot")]
#[command(about = "LINE bot with canned replies, MyGO image search and Gemini fallback")]
#[command(version)]
pub struct Cli {
    /// Config file (default: $MYGO_BOT_HOME/config.json or ~/.mygo-bot/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Run the webhook server
    Serve {
        /// Override gateway.host
        #[arg(long)]
        host: Option<String>,
        /// Override gateway.port
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Look up an image in the catalog
    Search {
        keyword: String,
    },
    /// Dispatch one message locally and print the reply as JSON
    Ask {
        text: String,
    },
    /// Inspect or edit the conversation log
    Conversations {
        #[command(subcommand)]
        cmd: ConversationCommands,
    },
    /// Show config location and where each secret comes from
    Status,
    /// Run offline diagnostics
    Doctor,
}

#[derive(Subcommand)]
enum ConversationCommands {
    /// Print the whole log as JSON
    List,
    /// Print one user's transcript
    Show {
        id: String,
    },
    /// Delete one user's transcript
    Delete {
        id: String,
    },
    /// Delete every transcript
    Clear,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => {
            init(config_path, force)?;
        }
        Commands::Serve { host, port } => {
            serve(config_path, host, port).await?;
        }
        Commands::Search { keyword } => {
            subcommands::search(config_path, &keyword)?;
        }
        Commands::Ask { text } => {
            subcommands::ask(config_path, &text).await?;
        }
        Commands::Conversations { cmd } => {
            subcommands::conversations_command(config_path, cmd).await?;
        }
        Commands::Status => {
            subcommands::status_command(config_path)?;
        }
        Commands::Doctor => {
            crate::cli::doctor::doctor_command(config_path).await?;
        }
    }

    Ok(())
}

pub(super) fn resolve_config_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => crate::config::get_config_path(),
    }
}

fn init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve_config_path(config_path)?;
    write_default_config(&path, force)?;
    println!("\u{2713} Created config at {}", path.display());
    println!("\nNext steps:");
    println!("  1. Set channelAccessToken and channelSecret (or CHANNEL_ACCESS_TOKEN / CHANNEL_SECRET)");
    println!("  2. Optionally set providers.gemini.apiKey (or GEMINI_API_KEY)");
    println!("  3. Run: mygo-bot serve");
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    crate::config::save_config(&Config::default(), Some(path))
}

/// Build the Gemini client when an API key is configured.
fn setup_provider(config: &Config) -> Option<Arc<dyn LLMProvider>> {
    let gemini = &config.providers.gemini;
    if !gemini.is_configured() {
        info!("no Gemini API key, free-form messages get the help text");
        return None;
    }
    let provider = match &gemini.api_base {
        Some(base) => GeminiProvider::with_base_url(
            gemini.api_key.clone(),
            Some(gemini.model.clone()),
            base.clone(),
        ),
        None => GeminiProvider::new(gemini.api_key.clone(), Some(gemini.model.clone())),
    };
    info!(
        "Gemini provider created. Default model: {}",
        provider.default_model()
    );
    Some(Arc::new(provider))
}

/// Load the catalog and assemble the dispatcher. A catalog that cannot be
/// loaded is fatal.
fn setup_dispatcher(config: &Config) -> Result<Dispatcher> {
    let catalog_path = config.catalog_path();
    let catalog = ImageCatalog::load(&catalog_path)
        .with_context(|| format!("Cannot start without image catalog {}", catalog_path.display()))?;
    let dispatcher = Dispatcher::new(Arc::new(catalog), config.replies.clone());
    Ok(match setup_provider(config) {
        Some(provider) => dispatcher
            .with_responder(provider, ResponderSettings::from(&config.providers.gemini)),
        None => dispatcher,
    })
}

fn setup_store(config: &Config) -> Result<JsonFileStore> {
    let path = config.store_path()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        crate::utils::ensure_dir(parent)?;
    }
    debug!("conversation log: {}", path.display());
    Ok(JsonFileStore::new(path))
}

async fn serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    info!("Loading configuration...");
    let mut config = load_config(config_path)?;
    if let Some(host) = host {
        config.gateway.host = host;
    }
    if let Some(port) = port {
        config.gateway.port = port;
    }
    config.validate()?;
    config.require_line_credentials()?;

    let dispatcher = setup_dispatcher(&config)?;
    let store = setup_store(&config)?;
    let sender = LineClient::new(
        config.line.channel_access_token.clone(),
        &config.line.api_base,
    );

    let state = GatewayState::new(
        &config.line.channel_secret,
        Arc::new(dispatcher),
        Arc::new(sender),
        Arc::new(store),
    );

    let server = crate::gateway::start(
        &config.gateway.host,
        config.gateway.port,
        &config.line.webhook_path,
        state,
    )
    .await?;

    println!(
        "mygo-bot listening on {}:{}",
        config.gateway.host, config.gateway.port
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
        _ = server => {}
    }

    Ok(())
}
