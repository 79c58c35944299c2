//! kms-explorer
//!
//! Main entry point for the knowledge explorer CLI.

use clap::{Parser, Subcommand};
use kms_explorer::api::{BrowserNavigator, MemoryBackend, QuivrClient, Services};
use kms_explorer::config::{validate_config_result, ExplorerConfig};
use kms_explorer::explorer::{
    write_links, ApplyOutcome, ExplorerDispatcher, FolderNavigator, KnowledgeStore, LinkRequest,
    RootSelector,
};
use kms_explorer::knowledge::{FolderRef, KMSElement, StatusClass};
use kms_explorer::{ExplorerError, Result};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

/// Explore a Quivr knowledge base from the terminal
#[derive(Parser, Debug)]
#[command(name = "kms-explorer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/kms-explorer/config.yaml)
    #[arg(short, long)]
    config: Option<String>,

    /// Use built-in sample data instead of the API
    #[arg(long, env = "KMS_EXPLORER_DEMO")]
    demo: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a default configuration file
    Init,

    /// Browse knowledge in the terminal UI (default)
    Browse,

    /// List a folder of the internal root or of a provider
    List {
        /// Folder id (default: top level)
        #[arg(short, long)]
        folder: Option<String>,

        /// Provider id, as shown by `kms-explorer providers`
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// List brains
    Brains,

    /// List connected providers
    Providers,

    /// Link a knowledge item to one or more brains
    Link {
        /// Knowledge item id
        item: String,

        /// Brain ids
        #[arg(required = true)]
        brains: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if e.is_remote() {
            eprintln!("Check api.host in the configuration, or run with --demo");
        }
        process::exit(1);
    }
}

fn load_config(path: &Option<String>) -> Result<ExplorerConfig> {
    let config = match path {
        Some(path) => ExplorerConfig::load(path)?,
        None => ExplorerConfig::load_default()?,
    };

    validate_config_result(&config)?;
    Ok(config)
}

fn build_services(config: &ExplorerConfig, demo: bool) -> Result<Services> {
    let navigator = Arc::new(BrowserNavigator::new(
        config.navigation.frontend_url.clone(),
        config.navigation.open_in_browser,
    ));

    if demo {
        tracing::info!("Using in-memory demo backend");
        return Ok(Services::from_backend(Arc::new(MemoryBackend::demo()), navigator));
    }

    let client = QuivrClient::from_config(config)?;
    tracing::info!(host = %client.host(), "Using Quivr API");
    Ok(Services::from_backend(Arc::new(client), navigator))
}

fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Browse);

    if let Commands::Init = command {
        kms_explorer::logging::init()?;
        return handle_init_command(&cli.config);
    }

    let config = load_config(&cli.config)?;

    // The terminal UI owns the screen, so it logs to a file
    match command {
        Commands::Browse => kms_explorer::logging::init_file(&config.log_file)?,
        _ => kms_explorer::logging::init()?,
    }

    let services = build_services(&config, cli.demo)?;
    let runtime = tokio::runtime::Runtime::new()?;

    match command {
        Commands::Browse => {
            let poll_interval = Duration::from_millis(config.ui.poll_interval_ms);
            kms_explorer::tui::run(
                services,
                runtime.handle().clone(),
                &config.navigation.studio_path,
                poll_interval,
            )
        }
        Commands::List { folder, provider } => runtime.block_on(handle_list(&services, folder, provider)),
        Commands::Brains => runtime.block_on(handle_brains(&services)),
        Commands::Providers => runtime.block_on(handle_providers(&services)),
        Commands::Link { item, brains } => runtime.block_on(handle_link(&services, item, brains)),
        Commands::Init => Ok(()),
    }
}

async fn handle_list(services: &Services, folder: Option<String>, provider: Option<String>) -> Result<()> {
    let mut store = KnowledgeStore::new();
    let mut dispatcher = ExplorerDispatcher::new();
    dispatcher.mount(&mut store);

    let outcome = match provider {
        Some(provider_id) => {
            let provider = services
                .providers
                .list_providers()
                .await?
                .into_iter()
                .find(|p| p.id == provider_id)
                .ok_or_else(|| ExplorerError::NotFound(format!("provider {}", provider_id)))?;

            let mut navigator = FolderNavigator::new();
            let fetch = match folder {
                Some(folder_id) => {
                    store.set_explored_provider(Some(provider.clone()));
                    navigator.open_folder(store.state(), FolderRef::new(folder_id.clone(), folder_id))
                }
                None => navigator.open_provider(provider),
            };
            navigator.navigate(&mut store, services.knowledge.as_ref(), fetch).await
        }
        None => match folder {
            Some(folder_id) => {
                let mut navigator = FolderNavigator::new();
                let fetch = navigator.open_folder(store.state(), FolderRef::new(folder_id.clone(), folder_id));
                navigator.navigate(&mut store, services.knowledge.as_ref(), fetch).await
            }
            None => {
                let mut selector = RootSelector::new();
                selector.toggle(&mut store, services.knowledge.as_ref()).await
            }
        },
    };

    if outcome == ApplyOutcome::Failed {
        return Err(ExplorerError::Other("Failed to get files".to_string()));
    }

    let brains = services.brains.list_brains().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to list brains");
        Vec::new()
    });

    let ctx = store.state();
    let location = match &ctx.explored_provider {
        Some(provider) => provider.name.clone(),
        None => "Quivr".to_string(),
    };
    println!("{} ({:?}): {} items", location, ExplorerDispatcher::view(ctx), ctx.listing.len());
    println!();
    for item in &ctx.listing {
        print_item_summary(item, &brains);
    }
    Ok(())
}

async fn handle_brains(services: &Services) -> Result<()> {
    let brains = services.brains.list_brains().await?;
    println!("Brains: {}", brains.len());
    println!();
    for brain in brains {
        match brain.brain_id {
            Some(ref route) if route != &brain.id => {
                println!("{} {} ({}, studio: {})", brain.snippet_emoji, brain.name, brain.id, route)
            }
            _ => println!("{} {} ({})", brain.snippet_emoji, brain.name, brain.id),
        }
    }
    Ok(())
}

async fn handle_providers(services: &Services) -> Result<()> {
    let providers = services.providers.list_providers().await?;
    println!("Connected providers: {}", providers.len());
    println!();
    for provider in providers {
        print!("{}: {} [{}]", provider.id, provider.name, provider.kind.display_name());
        if let Some(ref email) = provider.email {
            print!(" {}", email);
        }
        println!();
    }
    Ok(())
}

async fn handle_link(services: &Services, item: String, brains: Vec<String>) -> Result<()> {
    let request = LinkRequest::new(item, brains);
    let results = write_links(services.associations.as_ref(), &request).await;

    let mut failed = 0;
    for (brain_id, result) in results {
        match result {
            Ok(()) => println!("✓ Linked {} to {}", request.item_id, brain_id),
            Err(e) => {
                failed += 1;
                println!("✗ Failed to link {} to {}: {}", request.item_id, brain_id, e);
            }
        }
    }

    if failed > 0 {
        return Err(ExplorerError::Other(format!("{} link(s) failed", failed)));
    }
    Ok(())
}

fn handle_init_command(config_path: &Option<String>) -> Result<()> {
    let config_file = match config_path {
        Some(path) => PathBuf::from(path),
        None => ExplorerConfig::default_path(),
    };

    if config_file.exists() {
        println!("Configuration already exists at {}", config_file.display());
        return Ok(());
    }

    let config = ExplorerConfig::new();
    config.save(&config_file)?;

    println!("✓ Created configuration at {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("  1. Export your API token:");
    println!("     export {}=<token>", config.api.token_env);
    println!();
    println!("  2. Browse your knowledge:");
    println!("     kms-explorer browse");
    Ok(())
}

fn print_item_summary(item: &KMSElement, brains: &[kms_explorer::knowledge::Brain]) {
    let kind = if item.is_folder { "dir " } else { "file" };
    print!("[{}] {}: {}", kind, item.id, item.file_name);

    let class = item.status_class();
    if class != StatusClass::Settled {
        print!("  {} {}", class.glyph(), class.label());
    }

    let linked: Vec<&str> = brains
        .iter()
        .filter(|b| item.brains.iter().any(|id| b.matches(id)))
        .map(|b| b.name.as_str())
        .collect();
    if !linked.is_empty() {
        print!(" -> {}", linked.join(", "));
    }
    println!();
}
