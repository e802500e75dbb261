use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hearth_core::service::{AuthService, ListingService};
use hearth_core::storage::{DiskStorage, FileStorage, RemoteStorage};
use hearth_core::store::PostgresDatabase;
use hearth_server::auth::token::TokenSigner;
use hearth_server::infra::config::Config;
use hearth_server::{AppState, create_app};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "hearth-server")]
#[command(about = "REST API for browsing and managing property-rental listings")]
struct Cli {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if let Some(url) = cli.database_url {
        config.database_url = Some(url);
    }

    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set (environment, .env file, or --database-url)")?;

    let db = Arc::new(PostgresDatabase::new(&database_url).await?);
    db.run_migrations().await?;

    let storage: Arc<dyn FileStorage> = match &config.storage_endpoint {
        Some(endpoint) => {
            info!("using hosted file storage at {endpoint}");
            Arc::new(RemoteStorage::new(endpoint.clone()))
        }
        None => {
            info!("storing uploads on disk under {}", config.upload_dir);
            Arc::new(DiskStorage::new(
                &config.upload_dir,
                &config.public_base_url,
            ))
        }
    };

    let auth = Arc::new(AuthService::new(db.clone()));
    let listings = Arc::new(ListingService::new(db.clone(), storage.clone()));
    let tokens = Arc::new(TokenSigner::new(&config.auth_token_secret));

    let port = config.server_port;
    let state = AppState {
        config: Arc::new(config),
        auth,
        listings,
        storage,
        tokens,
    };

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server is running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        return;
    }
    info!("shutdown signal received");
}
