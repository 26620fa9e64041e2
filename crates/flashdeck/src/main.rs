//! `flashdeck` - CLI for the flashcard service
//!
//! Runs the HTTP server and provides maintenance commands against the
//! flashcard database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use flashdeck::cli::{AddCommand, Cli, Command, ConfigCommand, ServeCommand};
use flashdeck::{init_logging, server, Config, FlashcardStore, NewFlashcard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, serve_cmd).await,
        Command::List(list_cmd) => handle_list(&config, list_cmd.json),
        Command::Add(add_cmd) => handle_add(&config, add_cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Clear(clear_cmd) => handle_clear(&config, clear_cmd.yes),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<FlashcardStore> {
    let path = config.database_path();
    FlashcardStore::open(&path)
        .with_context(|| format!("failed to open flashcard store at {}", path.display()))
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    // A store that cannot be opened or initialized is fatal before binding
    let store = Arc::new(open_store(&config)?);
    info!("Using database {}", store.path().display());

    server::serve(&config, store).await?;
    Ok(())
}

fn handle_list(config: &Config, json: bool) -> anyhow::Result<()> {
    let cards = open_store(config)?.get_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    if cards.is_empty() {
        println!("No flashcards.");
        return Ok(());
    }

    for card in cards {
        println!("[{}] deck {}", card.id, card.deck_id);
        println!("  Q: {}", card.question);
        println!("  A: {}", card.answer);
    }
    Ok(())
}

fn handle_add(config: &Config, cmd: AddCommand) -> anyhow::Result<()> {
    let card = open_store(config)?.add(&NewFlashcard::new(cmd.deck, cmd.question, cmd.answer))?;
    println!("Added flashcard {} to deck {}", card.id, card.deck_id);
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let stats = store.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "total_flashcards": stats.total_flashcards,
            "deck_count": stats.deck_count,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("flashdeck status");
        println!("----------------");
        println!("Database:      {}", store.path().display());
        println!("Flashcards:    {}", stats.total_flashcards);
        println!("Decks:         {}", stats.deck_count);
        println!("Size (bytes):  {}", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_clear(config: &Config, yes: bool) -> anyhow::Result<()> {
    if !yes {
        bail!("refusing to remove every flashcard without --yes");
    }

    let removed = open_store(config)?.clear()?;
    println!("Removed {removed} flashcards.");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.bind_address());
                println!(
                    "  Request timeout:    {}s",
                    config.server.request_timeout_secs
                );
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_file(path) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
