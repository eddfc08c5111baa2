use super::{ConversationCommands, resolve_config_path, setup_dispatcher, setup_store};
use crate::catalog::ImageCatalog;
use crate::config::credentials::{CREDENTIAL_NAMES, detect_source};
use crate::config::load_config;
use crate::conversation::{self, ConversationStore};
use anyhow::Result;
use std::path::Path;

pub(super) fn search(config_path: Option<&Path>, keyword: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let catalog = ImageCatalog::load(&config.catalog_path())?;
    match catalog.search(keyword.trim()) {
        Some(url) => println!("{}", url),
        None => println!("{}", config.replies.image_search.not_found),
    }
    Ok(())
}

pub(super) async fn ask(config_path: Option<&Path>, text: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let dispatcher = setup_dispatcher(&config)?;
    let directive = dispatcher.dispatch(text).await;
    println!("{}", serde_json::to_string_pretty(&directive)?);
    Ok(())
}

pub(super) async fn conversations_command(
    config_path: Option<&Path>,
    cmd: ConversationCommands,
) -> Result<()> {
    let config = load_config(config_path)?;
    let store = setup_store(&config)?;

    match cmd {
        ConversationCommands::List => {
            let log = store.load().await?;
            if log.is_empty() {
                println!("No conversations.");
            } else {
                println!("{}", serde_json::to_string_pretty(&log)?);
            }
        }
        ConversationCommands::Show { id } => {
            let log = store.load().await?;
            let Some(record) = log.get(&id) else {
                anyhow::bail!("conversation not found: {}", id);
            };
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        ConversationCommands::Delete { id } => {
            if conversation::update(&store, |log| log.remove(&id)).await? {
                println!("\u{2713} Deleted conversation {}", id);
            } else {
                anyhow::bail!("conversation not found: {}", id);
            }
        }
        ConversationCommands::Clear => {
            let removed = conversation::update(&store, |log| {
                let n = log.len();
                log.clear();
                n
            })
            .await?;
            println!("\u{2713} Deleted {} conversation(s)", removed);
        }
    }
    Ok(())
}

pub(super) fn status_command(config_path: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(config_path)?;
    let config = load_config(Some(&path))?;

    println!("mygo-bot status\n");
    println!(
        "Config: {} {}",
        path.display(),
        if path.exists() { "\u{2713}" } else { "\u{2717}" }
    );

    let catalog = config.catalog_path();
    println!(
        "Catalog: {} {}",
        catalog.display(),
        if catalog.exists() { "\u{2713}" } else { "\u{2717}" }
    );
    println!("Conversation log: {}", config.store_path()?.display());
    println!(
        "Webhook: http://{}:{}{}",
        config.gateway.host, config.gateway.port, config.line.webhook_path
    );
    println!(
        "Gemini model: {}{}",
        config.providers.gemini.model,
        if config.providers.gemini.is_configured() {
            ""
        } else {
            " (disabled, no API key)"
        }
    );

    println!("\nSettings:");
    for name in CREDENTIAL_NAMES {
        println!("  {:<28} {}", name, detect_source(name, &config));
    }
    Ok(())
}
