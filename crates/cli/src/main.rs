//! Shopify app CLI - Database migrations and shop management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shopify-app-cli migrate
//!
//! # Register a shop (or refresh its token) and drop its online sessions
//! shopify-app-cli shop register -d store.myshopify.com -t shpat_xxx
//!
//! # Check whether a shop is installed
//! shopify-app-cli shop exists -d store.myshopify.com
//!
//! # List a shop's stored sessions
//! shopify-app-cli shop sessions -d store.myshopify.com
//! ```
//!
//! Reads `APP_DATABASE_URL` (or `DATABASE_URL`) from the environment or `.env`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopify-app-cli")]
#[command(author, version, about = "Shopify app CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage installed shops
    Shop {
        #[command(subcommand)]
        action: ShopAction,
    },
}

#[derive(Subcommand)]
enum ShopAction {
    /// Register a shop or refresh its access token
    Register {
        /// Shop domain, e.g. `store.myshopify.com`
        #[arg(short, long)]
        domain: String,

        /// Offline access token
        #[arg(short, long)]
        token: String,
    },
    /// Check whether a shop is registered
    Exists {
        /// Shop domain
        #[arg(short, long)]
        domain: String,
    },
    /// List the sessions stored for a shop
    Sessions {
        /// Shop domain
        #[arg(short, long)]
        domain: String,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Shop { action } => match action {
            ShopAction::Register { domain, token } => {
                commands::shop::register(&domain, token).await?;
            }
            ShopAction::Exists { domain } => commands::shop::exists(&domain).await?,
            ShopAction::Sessions { domain } => commands::shop::sessions(&domain).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_register() {
        let cli = Cli::try_parse_from([
            "shopify-app-cli",
            "shop",
            "register",
            "-d",
            "store.myshopify.com",
            "-t",
            "token",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Shop {
                action: ShopAction::Register { .. }
            })
        ));
    }

    #[test]
    fn test_register_requires_token() {
        assert!(
            Cli::try_parse_from(["shopify-app-cli", "shop", "register", "-d", "store.myshopify.com"])
                .is_err()
        );
    }
}
