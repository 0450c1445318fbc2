//! polls CLI - run and administer the polls REST API
//!
//! - `serve`: HTTP server on PostgreSQL, or in memory with `--ephemeral`
//! - `migrate`: create or update the database schema
//! - `config`: write, show and locate the configuration file
//! - `completions`: shell completion scripts

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use polls_server::PollsConfig;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "polls",
    author,
    version,
    about = "Polling REST API: accounts, polls with expiry, one vote per user"
)]
struct Cli {
    /// Verbose logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    /// Config file (default: ~/.polls/config.toml)
    #[arg(long, global = true, env = "POLLS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Apply the database schema
    Migrate(commands::migrate::MigrateArgs),
    /// Manage configuration (init, show, path)
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: clap_complete::Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .context("Failed to initialize logging")?;

    let config_path = PollsConfig::resolve_path(cli.config.as_deref());

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &config_path).await,
        Commands::Migrate(args) => commands::run_migrate(args, &config_path).await,
        Commands::Config(args) => commands::run_config(args, &config_path),
        Commands::Completions(args) => run_completions(args),
    };

    tracing_setup::shutdown_otel();
    result
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
