//! Tidecast Service - Weather, forecast and beach HTTP API.
//!
//! Run with: `cargo run -p tidecast-service`

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use tidecast_service::{AppState, Config, api};
use tidecast_store::Store;

/// Tidecast Service - Weather, forecast and beach HTTP API.
#[derive(Parser, Debug)]
#[command(name = "tidecast-service")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bind address (overrides config and environment).
    #[arg(short, long, global = true)]
    bind: Option<String>,

    /// Database path (overrides config and environment).
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the service in the foreground (default behavior).
    Run,

    /// Create the database and schema, then exit.
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tidecast_service=info".parse()?)
                .add_directive("tidecast_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let config = load_config(&args)?;

    match args.command {
        Some(Command::InitDb) => init_db(&config),
        Some(Command::Run) | None => run_server(config).await,
    }
}

/// File, then environment, then command line.
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    config.apply_env();

    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(db_path) = &args.database {
        config.storage.path = db_path.clone();
    }

    Ok(config)
}

fn init_db(config: &Config) -> anyhow::Result<()> {
    info!("Initializing database at {:?}", config.storage.path);
    let store = Store::open(&config.storage.path)?;
    store.ping()?;
    info!("Database ready");
    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    info!("Opening database at {:?}", config.storage.path);
    let store = Store::open(&config.storage.path)?;

    let addr: SocketAddr = config.server.bind.parse()?;
    let state = AppState::from_config(store, config)?;

    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
