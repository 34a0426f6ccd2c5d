//! Poolscan Indexer - liquidity pool event ingestion
//!
//! This binary provides:
//! - Event listening from Ethereum (AddLiquidity, RemoveLiquidity, RemoveLiquidityOne)
//! - An immutable event log per event kind
//! - Running liquidity balances per provider

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use poolscan_indexer::config::{Config, LoggingConfig};
use poolscan_indexer::listener::{RpcProvider, SyncEngine};
use poolscan_indexer::storage::Storage;

#[derive(Parser)]
#[command(name = "poolscan-indexer")]
#[command(version, about = "Indexer for liquidity pool deposit and withdrawal events", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "indexer.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the indexer service
    Run,

    /// Show indexer status and sync progress
    Status,

    /// Initialize the database
    InitDb {
        /// Database URL
        #[arg(long, default_value = "sqlite://poolscan.db")]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    match command {
        Commands::Run => {
            let config = Config::from_file(&cli.config).context("Failed to load configuration")?;
            init_logging(cli.debug, &config.logging);
            log_startup();
            run_indexer(config).await?
        }
        Commands::Status => {
            init_logging(cli.debug, &LoggingConfig::default());
            log_startup();
            show_status(&cli.config).await?
        }
        Commands::InitDb { database_url } => {
            init_logging(cli.debug, &LoggingConfig::default());
            log_startup();
            init_database(&database_url).await?
        }
    }

    Ok(())
}

fn log_startup() {
    info!("Poolscan Indexer starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
}

/// Initialize tracing subscriber for logging
fn init_logging(debug: bool, logging: &LoggingConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = if debug {
        EnvFilter::new("poolscan_indexer=debug,sqlx=warn")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("poolscan_indexer={}", logging.level)))
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_line_number(true))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

async fn open_storage(config: &Config) -> Result<Storage> {
    let storage = Storage::new(
        &config.database.url,
        Some(config.database.max_connections),
        Some(config.database.min_connections),
    )
    .await
    .context("Failed to connect to database")?;

    storage
        .run_migrations()
        .await
        .context("Failed to run migrations")?;

    Ok(storage)
}

/// Main indexer service - runs the event sync loop until shutdown
async fn run_indexer(config: Config) -> Result<()> {
    info!("Configuration loaded successfully");
    info!("  Chain ID: {}", config.network.chain_id);
    info!("  Pool: {}", config.contracts.pool);
    info!("  Database: {}", config.database.url);
    info!("  Start block: {}", config.sync.start_block);

    let storage = open_storage(&config).await?;

    info!("Database initialized");

    // Fresh database: point sync state one block before start_block so the
    // first range includes it
    let sync_state = storage.get_sync_state().await?;
    if sync_state.last_block_number == 0 && sync_state.chain_id == 0 {
        let initial_block = config.sync.start_block.saturating_sub(1);
        info!(
            "Fresh database detected, initializing sync state with chain_id={} initial_block={} (will start syncing from block {})",
            config.network.chain_id, initial_block, config.sync.start_block
        );
        storage
            .initialize_sync_state(config.network.chain_id, initial_block)
            .await
            .context("Failed to initialize sync state")?;
    } else {
        if sync_state.chain_id != config.network.chain_id {
            anyhow::bail!(
                "Database was indexed for chain {} but config specifies chain {}",
                sync_state.chain_id,
                config.network.chain_id
            );
        }
        info!(
            "Existing sync state found: chain_id={} last_block={}",
            sync_state.chain_id, sync_state.last_block_number
        );
    }

    let provider = RpcProvider::new(&config.network.rpc_url, config.contracts.pool)
        .await
        .context("Failed to create RPC provider")?;

    match provider.get_chain_id().await {
        Ok(chain_id) if chain_id != config.network.chain_id => {
            anyhow::bail!(
                "RPC endpoint reports chain {} but config specifies chain {}",
                chain_id,
                config.network.chain_id
            );
        }
        Ok(_) => info!("RPC provider initialized"),
        Err(e) => warn!("Could not verify RPC chain id: {:#}", e),
    }

    let sync_engine = SyncEngine::new(provider, storage.clone(), config.sync.clone());

    info!("Event listener started");

    tokio::select! {
        result = sync_engine.run() => {
            if let Err(e) = &result {
                error!("Sync engine stopped: {:#}", e);
            }
            storage.close().await;
            result
        }
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            info!("Received shutdown signal, gracefully shutting down...");
            storage.close().await;
            Ok(())
        }
    }
}

/// Show indexer status and sync progress
async fn show_status(config_path: &str) -> Result<()> {
    info!("Checking indexer status");

    let (database_url, max_conn, min_conn) = match Config::from_file(config_path) {
        Ok(config) => {
            info!("Using database from config: {}", config.database.url);
            (
                config.database.url,
                Some(config.database.max_connections),
                Some(config.database.min_connections),
            )
        }
        Err(e) => {
            let is_not_found = e.chain().any(|cause| {
                cause
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
            });

            if is_not_found {
                info!("Config file not found, using default database: sqlite://poolscan.db");
                ("sqlite://poolscan.db".to_string(), None, None)
            } else {
                return Err(e).context("Failed to load config file");
            }
        }
    };

    let storage = Storage::new(&database_url, max_conn, min_conn)
        .await
        .context("Failed to connect to database")?;

    storage
        .run_migrations()
        .await
        .context("Failed to run migrations")?;

    let sync_state = storage.get_sync_state().await?;
    let stats = storage.stats().await?;

    println!("\n=== Poolscan Indexer Status ===\n");
    println!("Sync Progress:");
    println!("  Chain ID: {}", sync_state.chain_id);
    println!("  Last Block: {}", sync_state.last_block_number);
    println!(
        "  Last Updated: {}",
        chrono::DateTime::from_timestamp(sync_state.updated_at, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string())
    );

    println!("\nDatabase Statistics:");
    println!("  Accounts: {}", stats.account_count);
    println!("  AddLiquidity events: {}", stats.add_liquidity_count);
    println!("  RemoveLiquidity events: {}", stats.remove_liquidity_count);
    println!(
        "  RemoveLiquidityOne events: {}",
        stats.remove_liquidity_one_count
    );
    println!("  Liquidity provisions: {}", stats.provision_count);

    println!();

    storage.close().await;

    Ok(())
}

/// Initialize the database
async fn init_database(database_url: &str) -> Result<()> {
    info!("Initializing database: {}", database_url);

    let storage = Storage::new(database_url, None, None)
        .await
        .context("Failed to connect to database")?;

    storage
        .run_migrations()
        .await
        .context("Failed to run migrations")?;

    storage
        .health_check()
        .await
        .context("Database health check failed")?;

    let stats = storage.stats().await?;
    info!("Database initialized successfully!");
    info!("  Accounts: {}", stats.account_count);
    info!("  Events: {}", stats.event_count());
    info!("  Provisions: {}", stats.provision_count);
    info!("  Last block: {}", stats.last_block_number);

    storage.close().await;

    Ok(())
}
