//! CLI administration tool for shortkey.
//!
//! Manages stored URLs and checks the database without going through the
//! HTTP API. Deleting records is only possible from here.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! cargo run --bin admin -- url create "https://example.com/page"
//!
//! # List records, newest first
//! cargo run --bin admin -- url list --page 1 --page-size 20
//!
//! # Show click statistics for a key
//! cargo run --bin admin -- url stats 1f3a9c0b
//!
//! # Delete a record
//! cargo run --bin admin -- url delete 1f3a9c0b
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `REDIS_URL` (optional): deleted keys are also evicted from the cache
//! - Shortener settings (`KEY_LENGTH`, `KEY_MAX_RETRIES`, ...) as for the server

use shortkey::application::services::{Assignment, ResolverService, UrlService};
use shortkey::config::{self, Config};
use shortkey::domain::entities::UrlRecord;
use shortkey::domain::repositories::UrlStore;
use shortkey::infrastructure::cache::{CacheService, NullCache, RedisCache};
use shortkey::infrastructure::persistence::PgUrlStore;
use shortkey::utils::url_validator::UrlValidator;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;

/// CLI tool for managing shortkey.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short URLs
    Url {
        #[command(subcommand)]
        action: UrlAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// URL management subcommands.
#[derive(Subcommand)]
enum UrlAction {
    /// Shorten a URL
    Create {
        /// URL to shorten (scheme optional)
        url: String,
    },

    /// List stored URLs, newest first
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: i64,

        #[arg(short = 's', long, default_value_t = 20)]
        page_size: i64,
    },

    /// Show statistics for a key
    Stats { key: String },

    /// Delete a key
    Delete {
        key: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection and count records
    Check,
}

/// Services over the PostgreSQL store.
struct Services {
    urls: UrlService,
    resolver: ResolverService,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Url { action } => {
            let services = build_services(&config, pool).await;
            handle_url_action(action, &services).await?
        }
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn build_services(config: &Config, pool: PgPool) -> Services {
    let store: Arc<dyn UrlStore> = Arc::new(PgUrlStore::new(Arc::new(pool)));

    let cache: Arc<dyn CacheService> = match &config.redis_url {
        Some(redis_url) => match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                println!("{} {}", "⚠️  Cache unavailable:".yellow(), e);
                Arc::new(NullCache::new())
            }
        },
        None => Arc::new(NullCache::new()),
    };

    // Admin reads are not clicks; nothing consumes this queue.
    let (click_tx, _) = mpsc::channel(1);

    Services {
        urls: UrlService::new(
            store.clone(),
            UrlValidator::new(config.shortener.validation.clone()),
            &config.shortener.keys,
        ),
        resolver: ResolverService::new(store, cache, click_tx),
    }
}

/// Dispatches URL management commands.
async fn handle_url_action(action: UrlAction, services: &Services) -> Result<()> {
    match action {
        UrlAction::Create { url } => create_url(services, &url).await,
        UrlAction::List { page, page_size } => list_urls(services, page, page_size).await,
        UrlAction::Stats { key } => show_stats(services, &key).await,
        UrlAction::Delete { key, yes } => delete_url(services, &key, yes).await,
    }
}

/// Runs the create path and prints the assigned key.
async fn create_url(services: &Services, url: &str) -> Result<()> {
    println!("{}", "🔗 Shorten URL".bright_blue().bold());
    println!();

    let outcome = services
        .urls
        .create_short_url(url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    match outcome.assignment {
        Assignment::Fresh => println!("{}", "✅ Short URL created".green().bold()),
        Assignment::Existing => println!("{}", "ℹ️  URL already shortened".yellow()),
        Assignment::Fallback => println!(
            "{}",
            "⚠️  Created with a fallback key (all hash attempts collided)".yellow()
        ),
    }

    println!();
    println!("  Key: {}", outcome.record.key.bright_yellow().bold());
    println!("  URL: {}", outcome.record.value.cyan());
    println!();

    Ok(())
}

/// Lists stored URLs.
///
/// # Output Format
///
/// ```text
/// 📋 Short URLs
///
///   Key              Clicks   Created            URL
///   ───────────────────────────────────────────────────────
///   1f3a9c0b         12       2026-01-15 10:30   https://example.com/page
/// ```
async fn list_urls(services: &Services, page: i64, page_size: i64) -> Result<()> {
    println!("{}", "📋 Short URLs".bright_blue().bold());
    println!();

    let records = services
        .resolver
        .list(page, page_size)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list URLs: {}", e))?;

    if records.is_empty() {
        println!("{}", "  No URLs found".yellow());
        return Ok(());
    }

    println!(
        "  {:<16} {:<8} {:<18} {}",
        "Key".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for record in &records {
        print_row(record);
    }

    let total = services
        .resolver
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count URLs: {}", e))?;

    println!();
    println!(
        "  Page {}: {} of {}",
        page,
        records.len().to_string().bright_white().bold(),
        total.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

fn print_row(record: &UrlRecord) {
    let key = if record.is_fallback {
        format!("{}*", record.key).yellow()
    } else {
        record.key.cyan()
    };

    println!(
        "  {:<16} {:<8} {:<18} {}",
        key,
        record.click_count.to_string().bright_green(),
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black(),
        record.value
    );
}

/// Shows click statistics for one key.
async fn show_stats(services: &Services, key: &str) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let record = services
        .resolver
        .get_stats(key)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let last_accessed = record
        .last_accessed
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!("  Key:           {}", record.key.cyan());
    println!("  URL:           {}", record.value);
    println!(
        "  Clicks:        {}",
        record.click_count.to_string().bright_green().bold()
    );
    println!(
        "  Created:       {}",
        record.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Last accessed: {}", last_accessed);
    if record.is_fallback {
        println!("  {}", "Fallback key".yellow());
    }
    println!();

    Ok(())
}

/// Deletes a key after confirmation (default: No).
async fn delete_url(services: &Services, key: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Short URL".bright_blue().bold());
    println!();

    let record = services
        .resolver
        .get_stats(key)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("  Key: {}", record.key.cyan());
    println!("  URL: {}", record.value);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this URL?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    services
        .resolver
        .delete(key)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete URL: {}", e))?;

    println!("{}", "✅ URL deleted".green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());

            let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_records")
                .fetch_one(pool)
                .await
                .context("url_records table missing; start the server once to migrate")?;

            println!(
                "  Records: {}",
                records.to_string().bright_green().bold()
            );
        }
    }

    Ok(())
}
