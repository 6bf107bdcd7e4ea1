//! Grocery CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! grocery-cli migrate
//!
//! # Create an account
//! grocery-cli account create -n alice -e alice@example.com -p 's3cret-pw'
//!
//! # Issue a bearer token for an existing account
//! grocery-cli token issue -e alice@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `account create` - Register an account without going through HTTP
//! - `token issue` - Mint a bearer token for an account (support and testing)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "grocery-cli")]
#[command(author, version, about = "Grocery list service CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Register a new account
    Create {
        /// Display name (3-20 characters)
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a token for the account with this email
    Issue {
        /// Email address
        #[arg(short, long)]
        email: String,
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
        Commands::Account { action } => match action {
            AccountAction::Create {
                name,
                email,
                password,
            } => {
                commands::account::create(name, email, password).await?;
            }
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { email } => commands::token::issue(&email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_account_create() {
        let cli = Cli::try_parse_from([
            "grocery-cli",
            "account",
            "create",
            "-n",
            "alice",
            "-e",
            "alice@example.com",
            "-p",
            "hunter22",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Account {
                action: AccountAction::Create { .. }
            })
        ));
    }
}
