//! Atelier CLI - Database setup tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the tables (retries while the database comes up)
//! atelier-cli migrate
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create the `users` and `fashion_items` tables

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "atelier-cli")]
#[command(author, version, about = "Atelier catalog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables
    Migrate {
        /// Give up after this many attempts
        #[arg(long, default_value_t = atelier_api::db::SCHEMA_ATTEMPTS)]
        attempts: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { attempts } => commands::migrate::run(attempts).await?,
    }
    Ok(())
}
