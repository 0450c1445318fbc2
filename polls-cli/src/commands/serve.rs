//! HTTP server command
//!
//! Runs the polls API on PostgreSQL, or entirely in memory with `--ephemeral`.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use uuid::Uuid;

use polls_server::db::{create_pool_with_options, migrations};
use polls_server::{run_server, AppState, MemoryStore, PgStore, PollsConfig, Store, TokenService};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:5000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep everything in memory; data is lost on exit
    #[arg(long)]
    pub ephemeral: bool,

    /// Apply migrations before accepting requests
    #[arg(long, conflicts_with = "ephemeral")]
    pub migrate: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: &Path) -> Result<()> {
    let mut config = PollsConfig::load(config_path).context("Failed to load config")?;

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if args.cors_permissive {
        config.server.cors_permissive = true;
    }

    let secret = match config.jwt_secret() {
        Some(secret) => secret.to_owned(),
        None if args.ephemeral => {
            tracing::warn!("No JWT secret configured; tokens will not survive a restart");
            format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
        }
        None => anyhow::bail!(
            "JWT secret not set. Set POLLS_JWT_SECRET or [auth] jwt_secret in {}",
            config_path.display()
        ),
    };

    let tokens = TokenService::new(&secret, config.auth.jwt_issuer.clone(), config.token_ttl())
        .context("Invalid JWT settings")?;

    let store: Arc<dyn Store> = if args.ephemeral {
        tracing::warn!("Ephemeral mode: all data is kept in memory and lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let database_url = args
            .database_url
            .or_else(|| config.database.url.clone())
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or [database] url in the config file")?;

        let pool = create_pool_with_options(&database_url, config.database.max_connections)
            .await
            .context("Failed to create database pool")?;

        if args.migrate {
            migrations::run(&pool)
                .await
                .context("Failed to apply migrations")?;
        }

        Arc::new(PgStore::new(pool))
    };

    tracing::info!("Starting polls server on {}", config.server.bind);

    let state = AppState::new(store, tokens, config.pagination);
    run_server(state, config.server_config())
        .await
        .context("Server error")?;

    Ok(())
}
