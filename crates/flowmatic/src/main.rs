//! Flowmatic edge CLI.
//!
//! Runs the backend proxy and drives the auth session from a terminal.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{auth, health, projects, serve};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Flowmatic - backend proxy and auth session tools
#[derive(Parser)]
#[command(name = "flowmatic")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config directory (default: FLOWMATIC_CONFIG_DIR or the platform config dir)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Backend base URL (overrides environment and config)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the backend proxy
    Serve(serve::ServeArgs),

    /// Sign in, sign out and inspect the stored session
    Auth(auth::AuthArgs),

    /// Project management
    Projects(projects::ProjectsArgs),

    /// Check that the backend is reachable
    Health(health::HealthArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = cli.config_dir.clone().or_else(flowmatic_config::config_dir);

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "flowmatic=debug,flowmatic_proxy=debug,flowmatic_session=debug,flowmatic_client=debug,flowmatic_config=debug,tower_http=debug,info"
    } else {
        "flowmatic=info,flowmatic_proxy=info,flowmatic_session=info,warn"
    };

    let log_dir = config_dir
        .as_ref()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "flowmatic.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "flowmatic=trace,flowmatic_proxy=trace,flowmatic_session=trace,flowmatic_client=trace,flowmatic_config=trace,tower_http=debug,info",
                )),
        )
        .init();

    // Load layered config
    let loaded = flowmatic_config::load_config_with_options(None, cli.config_dir.as_deref())?;
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    for path in loaded.loaded_from() {
        tracing::debug!(path = %path.display(), "Loaded config");
    }

    let ctx = commands::Context {
        config: loaded.config,
        config_dir,
        backend_url: cli.backend,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Projects(args) => projects::run(args, &ctx).await,
        Commands::Health(args) => health::run(args, &ctx).await,
    }
}
