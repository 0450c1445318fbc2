//! Schema migration command

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use polls_server::db::{create_pool, migrations};
use polls_server::PollsConfig;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Create any missing tables, constraints and indexes
pub async fn run_migrate(args: MigrateArgs, config_path: &Path) -> Result<()> {
    let config = PollsConfig::load(config_path).context("Failed to load config")?;
    let database_url = args
        .database_url
        .or(config.database.url)
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or [database] url in the config file")?;

    let pool = create_pool(&database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to apply migrations")?;

    println!("✅ Schema is up to date");
    Ok(())
}
