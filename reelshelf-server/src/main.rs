//! # Reelshelf Server
//!
//! Serves the lending API by default. Maintenance commands:
//!
//! - `db migrate`: apply the embedded migrations
//! - `roles seed`: reconcile the built-in roles
//! - `movies import <file>`: bulk-load catalog entries
//! - `movies list`: print a page of the catalog

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use reelshelf_server::{
    AppState,
    infra::{
        config::{Config, ConfigLoad, ConfigLoader, ConfigLoaderOptions},
        mailer::LogNotifier,
        startup,
    },
    movies::import,
    routes,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "reelshelf-server")]
#[command(about = "Movie lending service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to reelshelf.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT", global = true)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST", global = true)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (the default)
    Serve,
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    Roles(RolesCommand),
    #[command(subcommand)]
    Movies(MoviesCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum RolesCommand {
    /// Create or update the built-in roles
    Seed,
}

#[derive(Debug, Subcommand)]
enum MoviesCommand {
    /// Insert movies from a JSON file, skipping titles already present
    Import { file: PathBuf },
    /// Print one page of the catalog, best rated first
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(config).await,
        Command::Db(DbCommand::Migrate) => startup::run_migrations(&config).await,
        Command::Roles(RolesCommand::Seed) => {
            let uow = startup::open_store(&config).await?;
            let roles = startup::seed_roles(&uow).await?;
            info!(count = roles.len(), "Roles seeded");
            Ok(())
        }
        Command::Movies(MoviesCommand::Import { file }) => {
            run_import(config, &file).await
        }
        Command::Movies(MoviesCommand::List { page }) => {
            run_list(config, page).await
        }
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let options = ConfigLoaderOptions {
        config_path: args.config.clone(),
        env_file: args.env_file.clone(),
    };
    let ConfigLoad {
        mut config,
        warnings,
    } = ConfigLoader::with_options(options)
        .load()
        .context("failed to load configuration")?;

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(
                message = %warning.message,
                hint = %hint,
                "configuration warning"
            ),
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    Ok(config)
}

async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let uow = startup::open_store(&config).await?;
    startup::seed_roles(&uow).await?;
    AppState::new(config, uow, Arc::new(LogNotifier))
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let address = config.bind_address();
    let state = build_state(config).await?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, "Reelshelf listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn run_import(config: Config, file: &std::path::Path) -> anyhow::Result<()> {
    let movies = import::read_movies(file)?;
    let state = build_state(config).await?;
    let report = state
        .catalog
        .import(movies)
        .await
        .context("catalog import failed")?;
    println!("inserted {} movies, skipped {}", report.inserted, report.skipped);
    Ok(())
}

async fn run_list(config: Config, page: u32) -> anyhow::Result<()> {
    let per_page = config.lending.movies_per_page;
    let state = build_state(config).await?;
    let page = state
        .catalog
        .list_with(page, per_page)
        .await
        .context("failed to list movies")?;

    for (offset, movie) in page.items.iter().enumerate() {
        println!(
            "{:>4}. {:<32} {:>4}  {:>4.1}  {} left",
            page.start() + offset as u64 + 1,
            movie.title,
            movie.year,
            movie.rating,
            movie.amount
        );
    }
    println!("page {} ({} movies in total)", page.page, page.total);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
