// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use application::{Catalog, StorageTier};
use infrastructure::{Config, FallbackStore};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::cli::args::{Args, Command};

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting flashdeck with arguments");

    if let Command::InitConfig { force } = args.command {
        let path = init_config(args.config.as_deref(), force)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    // Initialize infrastructure
    let config = load_config(&args)?;
    let store = Arc::new(FallbackStore::from_config(&config.store).await?);

    // Initialize application
    let catalog = Catalog::new(store);

    let result = execute(&args.command, &config, &catalog).await;

    if let Err(e) = catalog.close().await {
        warn!(error = %e, "Failed to close store");
    }
    result
}

/// Config file, then environment and flags on top.
pub fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::resolve(args.config.as_deref())?;

    if let Some(url) = &args.store_url {
        config.store.url = Some(url.clone());
    }
    if let Some(token) = &args.store_token {
        config.store.token = Some(token.clone());
    }
    if let Command::Serve { bind: Some(bind) } = &args.command {
        config.server.bind = bind.clone();
    }

    debug!(server = ?config.server, store_url = ?config.store.url, "Resolved configuration");
    Ok(config)
}

/// Write the default config to `path`, or to the per-user location.
pub fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path().context("No config directory on this platform")?,
    };
    if path.exists() && !force {
        bail!("Config file {} already exists, use --force to overwrite", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    Config::create_default(&path)?;
    info!(path = %path.display(), "Wrote default config");
    Ok(path)
}

async fn execute(command: &Command, config: &Config, catalog: &Catalog) -> Result<()> {
    if !matches!(command, Command::Serve { .. }) && catalog.storage_tier() == StorageTier::Memory {
        warn!("No external store in use; changes are lost when this command exits");
    }

    match command {
        Command::InitConfig { .. } => Ok(()),
        Command::Serve { .. } => serve(config, catalog).await,
        Command::List { set, json } => {
            catalog.ensure_seeded().await;
            let cards = match set {
                Some(name) => catalog.flashcards().list_by_set(name).await?,
                None => catalog.flashcards().list().await?,
            };
            if *json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else {
                for card in cards {
                    println!("{}\t{}\t{}", card.id, card.set, card.front);
                }
            }
            Ok(())
        }
        Command::Sets { json } => {
            catalog.ensure_seeded().await;
            let sets = catalog.sets().list().await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&sets)?);
            } else {
                for set in sets {
                    println!("{}\t{} cards", set.name, set.card_count);
                }
            }
            Ok(())
        }
        Command::Add { front, back, set } => {
            catalog.ensure_seeded().await;
            let mut draft = domain::NewFlashcard::new(front.as_str(), back.as_str());
            draft.set = set.clone();
            let card = catalog.flashcards().create(draft).await?;
            info!(id = card.id, "Flashcard added");
            println!("Created flashcard {} in set {}", card.id, card.set);
            Ok(())
        }
        Command::Delete { id } => {
            catalog.ensure_seeded().await;
            let card = catalog.flashcards().delete(*id).await?;
            println!("Deleted flashcard {}: {}", card.id, card.front);
            Ok(())
        }
        Command::NewSet { name, description } => {
            catalog.ensure_seeded().await;
            let set = catalog.sets().create(name, description.as_deref()).await?;
            println!("Created set {}", set.name);
            Ok(())
        }
    }
}

async fn serve(config: &Config, catalog: &Catalog) -> Result<()> {
    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    info!(
        addr = %listener.local_addr()?,
        storage = ?catalog.storage_tier(),
        "HTTP API listening"
    );
    ports::http::serve(listener, catalog.clone(), shutdown_signal()).await
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
