// ABOUTME: Command-line entry point for Storefront
// ABOUTME: Serves the API, runs migrations and seeds the catalog

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;
use storefront_catalog::ProductStorage;
use storefront_cli::{run_server, seed, Config};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront order service")]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides STOREFRONT_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Listen port (overrides STOREFRONT_API_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create or upgrade the database schema
    Migrate,
    /// Load products from a JSON file into the catalog
    Seed {
        /// Path to a JSON array of products
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                if port == 0 {
                    anyhow::bail!("Port 0 is out of valid range (1-65535)");
                }
                config.port = port;
            }
            run_server(config).await
        }
        Commands::Migrate => {
            storefront_storage::open_database(Some(config.database_path.clone())).await?;
            println!(
                "{}",
                format!("Database ready at {}", config.database_path.display()).green()
            );
            Ok(())
        }
        Commands::Seed { file } => {
            let pool = storefront_storage::open_database(Some(config.database_path)).await?;
            let summary = seed::seed_products(&ProductStorage::new(pool), &file).await?;
            println!(
                "{}",
                format!(
                    "Seeded {} product(s), skipped {} existing",
                    summary.created, summary.skipped
                )
                .green()
            );
            Ok(())
        }
    }
}
