//! Bazaar CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Apply the embedded schema migrations
//! bazaar-cli migrate
//!
//! # Seed the built-in demo data plus 50 random clicks
//! bazaar-cli seed --clicks 50
//!
//! # Seed from a fixtures file
//! bazaar-cli seed --file fixtures.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_DATABASE_URL` - `SQLite` URL (fallback `DATABASE_URL`,
//!   default `sqlite://bazaar.db`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert demo users, stores, items and clicks
    Seed {
        /// YAML fixtures file (built-in demo data when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Number of random clicks to record across the seeded items
        #[arg(short, long, default_value_t = 0)]
        clicks: u32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bazaar_cli=info,bazaar_storefront=info")),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let database_url = commands::database_url();

    match cli.command {
        Commands::Migrate => commands::migrate::run(&database_url).await?,
        Commands::Seed { file, clicks } => {
            commands::seed::run(&database_url, file.as_deref(), clicks).await?;
        }
    }
    Ok(())
}
