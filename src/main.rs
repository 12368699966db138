use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use facecrook_store::config::{BackendKind, Cli, Config};
use facecrook_store::db;
use facecrook_store::kv::{KvBackend, MemoryBackend, NullBackend, SqliteBackend};
use facecrook_store::routes;
use facecrook_store::state::AppState;
use facecrook_store::store::LocalStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    let backend = open_backend(&config)?;
    tracing::info!("Storage backend: {}", backend.name());

    let store = LocalStore::new(backend, config.store_options());
    let state = AppState::new(store, config.clone());
    let app = routes::app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn open_backend(config: &Config) -> anyhow::Result<Arc<dyn KvBackend>> {
    Ok(match config.store.backend {
        BackendKind::Sqlite => {
            let db_path = config.db_path();
            let pool = db::create_pool(&db_path)?;
            db::run_migrations(&pool)?;
            tracing::info!("Database: {}", db_path.display());
            Arc::new(SqliteBackend::new(pool))
        }
        BackendKind::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on exit");
            Arc::new(MemoryBackend::new())
        }
        BackendKind::Null => {
            tracing::warn!("Storage disabled, writes will be rejected");
            Arc::new(NullBackend)
        }
    })
}
