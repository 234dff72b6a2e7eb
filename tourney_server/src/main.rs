//! Tournament bracket server.
//!
//! Serves the engine over HTTP, backed by either an in-memory store or
//! PostgreSQL.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use tourney::{
    Engine, EngineContext, MemoryStore, PgStore, Store,
    db::Database,
};
use tourney_server::{
    api::{self, ParticipantDirectory},
    config::{Overrides, ServerConfig, StorageMode},
    logging, metrics,
    webhook::HttpWebhookSink,
};

const HELP: &str = "\
Run a single-elimination tournament server

USAGE:
  tourney_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --storage    MODE        memory or postgres          [default: env STORAGE or memory]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  STORAGE                  memory | postgres
  DATABASE_URL             PostgreSQL connection string
  DB_MAX_CONNECTIONS       Pool size (and DB_MIN_CONNECTIONS, DB_CONNECTION_TIMEOUT, ...)
  WEBHOOK_TIMEOUT_SECS     Completion webhook timeout [default: 5]
  METRICS_BIND             Prometheus listener address (disabled when unset)
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        bind: pargs.opt_value_from_str::<_, SocketAddr>("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        storage: pargs.opt_value_from_str::<_, StorageMode>("--storage")?,
    };

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;
    info!("Starting tournament server at {} ({} storage)", config.bind, config.storage);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics on http://{addr}/metrics");
    }

    let (store, participants): (Arc<dyn Store>, Arc<dyn ParticipantDirectory>) =
        match (config.storage, &config.database) {
            (StorageMode::Postgres, Some(db_config)) => {
                let db = Database::new(db_config)
                    .await
                    .context("Failed to connect to database")?;
                info!("Database connected successfully");

                let pg = Arc::new(PgStore::new(db.pool().clone()));
                pg.migrate().await.context("Failed to apply schema")?;
                let store: Arc<dyn Store> = pg.clone();
                let participants: Arc<dyn ParticipantDirectory> = pg;
                (store, participants)
            }
            _ => {
                let memory = Arc::new(MemoryStore::new());
                let store: Arc<dyn Store> = memory.clone();
                let participants: Arc<dyn ParticipantDirectory> = memory;
                (store, participants)
            }
        };

    let webhooks = Arc::new(HttpWebhookSink::new(config.webhook_timeout)?);
    let ctx = EngineContext::new(store.clone()).with_webhooks(webhooks);
    let app = api::create_router(api::AppState::new(Engine::new(ctx), store, participants));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {e}");
        std::future::pending::<()>().await;
    }
}
