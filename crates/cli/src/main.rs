//! Jerseyworks CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! jw-cli migrate
//!
//! # Create a profile for local development
//! jw-cli user add -e dev@example.com -n "Dev User"
//!
//! # Grant or revoke a role
//! jw-cli role grant -u <uuid> -r admin
//! jw-cli role revoke -u <uuid> -r admin
//!
//! # Issue a bearer token (printed once, stored hashed)
//! jw-cli token issue -u <uuid> -d 7
//! ```
//!
//! All commands read `DATABASE_URL` (a `.env` file is honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "jw-cli")]
#[command(author, version, about = "Jerseyworks CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage profiles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage role grants
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a profile
    Add {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Grant a role to a user
    Grant {
        /// User ID
        #[arg(short, long)]
        user: String,

        /// Role (`admin`, `customer`)
        #[arg(short, long)]
        role: String,
    },
    /// Revoke a role from a user
    Revoke {
        /// User ID
        #[arg(short, long)]
        user: String,

        /// Role (`admin`, `customer`)
        #[arg(short, long)]
        role: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a bearer token for a user
    Issue {
        /// User ID
        #[arg(short, long)]
        user: String,

        /// Days until the token expires
        #[arg(short, long, default_value_t = 30)]
        days: i32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Add { email, name } => {
                commands::users::add(&email, name.as_deref()).await?;
            }
        },
        Commands::Role { action } => match action {
            RoleAction::Grant { user, role } => commands::roles::grant(&user, &role).await?,
            RoleAction::Revoke { user, role } => commands::roles::revoke(&user, &role).await?,
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { user, days } => {
                commands::tokens::issue(&user, days).await?;
            }
        },
    }
    Ok(())
}
