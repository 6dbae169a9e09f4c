//! CLI administration tool for slug-shortener.
//!
//! Manages users and API tokens and prints statistics without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a user
//! cargo run --bin admin -- user create --email me@example.com
//!
//! # Issue a token for that user
//! cargo run --bin admin -- token create --name laptop --email me@example.com
//!
//! # List and revoke tokens
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke laptop
//!
//! # Statistics and database checks
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): must match the server's value,
//!   otherwise issued tokens will not authenticate

use slug_shortener::application::services::auth_service::{generate_token, hash_token};
use slug_shortener::domain::repositories::{TokenRepository, UserRepository};
use slug_shortener::infrastructure::persistence::{PgTokenRepository, PgUserRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user that can own links
    Create {
        #[arg(short, long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a new API token for a user
    Create {
        /// Token name (e.g., "laptop", "CI")
        #[arg(short, long)]
        name: Option<String>,

        /// Email of the user the token authenticates as
        #[arg(short, long)]
        email: Option<String>,

        /// Custom token value (auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn prompt_email(email: Option<String>) -> Result<String> {
    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        anyhow::bail!("'{email}' is not an email address");
    }

    Ok(email)
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = PgUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::Create { email } => {
            println!("{}", "👤 Create User".bright_blue().bold());
            println!();

            let email = prompt_email(email)?;

            if repo
                .find_user_by_email(&email)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {e}"))?
                .is_some()
            {
                println!("{}", format!("⚠️  User {email} already exists").yellow());
                return Ok(());
            }

            let user = repo
                .create_user(email, None)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create user: {e}"))?;

            println!(
                "{} {} (id {})",
                "✅ Created".green().bold(),
                user.email.cyan(),
                user.id.to_string().bright_black()
            );
        }
    }

    Ok(())
}

async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let tokens = PgTokenRepository::new(pool.clone());

    match action {
        TokenAction::Create {
            name,
            email,
            token,
            yes,
        } => {
            let users = PgUserRepository::new(pool);
            create_token(&tokens, &users, name, email, token, yes).await?;
        }
        TokenAction::List => list_tokens(&tokens).await?,
        TokenAction::Revoke { name_or_id } => revoke_token(&tokens, name_or_id).await?,
    }

    Ok(())
}

/// Issues a token for an existing user.
///
/// Only the HMAC of the token is stored. The raw value is shown once.
async fn create_token(
    tokens: &PgTokenRepository,
    users: &PgUserRepository,
    name: Option<String>,
    email: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let secret = std::env::var("TOKEN_SIGNING_SECRET")
        .context("TOKEN_SIGNING_SECRET must be set to issue tokens")?;
    if secret.is_empty() {
        anyhow::bail!("TOKEN_SIGNING_SECRET must not be empty");
    }

    let email = prompt_email(email)?;
    let user = users
        .find_user_by_email(&email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {e}"))?
        .with_context(|| format!("No user with email {email}; run `admin user create` first"))?;

    if !user.is_active {
        println!("{}", "⚠️  This user is deactivated; the token will be rejected".yellow());
    }

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("laptop")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => generate_token(),
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  User:  {}", user.email.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    tokens
        .create_token(user.id, &token_name, &hash_token(&secret, &token_value))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {e}"))?;

    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/urls",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: &PgTokenRepository) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {e}"))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<24} {:<6} {:<17} {:<17} {:<8}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "User".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(82).bright_black());

    for token in &tokens {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<24} {:<6} {:<17} {:<17} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token.user_id,
            token.created_at.format("%Y-%m-%d %H:%M").to_string(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", tokens.len().to_string().bright_white().bold());

    Ok(())
}

/// Numeric input is tried as an id first, then as a name.
async fn revoke_token(repo: &PgTokenRepository, name_or_id: String) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let by_id = match name_or_id.parse::<i64>() {
        Ok(id) => repo
            .list_tokens()
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {e}"))?
            .into_iter()
            .find(|t| t.id == id),
        Err(_) => None,
    };

    let token = match by_id {
        Some(t) => Some(t),
        None => repo
            .find_by_name(&name_or_id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {e}"))?,
    };

    let token = token.context("Token not found")?;

    if token.revoked_at.is_some() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {e}"))?;

    println!("{}", "✅ Token revoked".green().bold());

    Ok(())
}

async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (active_links, deleted_links, total_visits): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*) FILTER (WHERE is_active), \
                COUNT(*) FILTER (WHERE NOT is_active), \
                COALESCE(SUM(visit_count) FILTER (WHERE is_active), 0)::BIGINT \
         FROM short_links",
    )
    .fetch_one(pool)
    .await?;

    let expired_links: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM short_links WHERE is_active AND expires_at <= NOW()",
    )
    .fetch_one(pool)
    .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks")
        .fetch_one(pool)
        .await?;

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active")
        .fetch_one(pool)
        .await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    let rows = [
        ("Active links", active_links),
        ("Expired links", expired_links),
        ("Deleted links", deleted_links),
        ("Visits", total_visits),
        ("Logged clicks", clicks_count),
        ("Active users", users_count),
        ("Active tokens", tokens_count),
    ];

    for (label, value) in rows {
        println!(
            "  {:<15} {}",
            format!("{label}:"),
            value.to_string().bright_green().bold()
        );
    }
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
