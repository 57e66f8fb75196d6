//! EggBucket CLI - inspect and reset the storefront's local state.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart stored on this device
//! eb-cli cart show
//!
//! # Empty it
//! eb-cli cart clear
//!
//! # Who is signed in, and the delivery address
//! eb-cli session show
//!
//! # Sign out (the cart is kept)
//! eb-cli session logout
//!
//! # Print the backend catalog
//! eb-cli catalog list
//! ```
//!
//! The data directory defaults to `STOREFRONT_DATA_DIR` or `.eggbucket`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "eb-cli")]
#[command(author, version, about = "EggBucket storefront CLI tools")]
struct Cli {
    /// Directory holding the storefront's local storage
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or empty the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect or end the signed-in session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Read the backend catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print cart lines and totals
    Show,
    /// Remove every line
    ///
    /// A running storefront keeps its cart in memory and writes it back on
    /// its next cart change; stop it first. Session commands are safe to run
    /// alongside it.
    Clear,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Print the signed-in phone and selected address
    Show,
    /// Sign out, keeping the cart
    Logout,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products with price and stock
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eb_cli=info,eggbucket_storefront=warn".into()),
        )
        .init();

    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let data_dir = cli.data_dir.unwrap_or_else(commands::default_data_dir);

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&data_dir)?,
            CartAction::Clear => commands::cart::clear(&data_dir)?,
        },
        Commands::Session { action } => match action {
            SessionAction::Show => commands::session::show(&data_dir)?,
            SessionAction::Logout => commands::session::logout(&data_dir)?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list().await?,
        },
    }
    Ok(())
}
