use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, ImageBackend, StoreBackend};
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, RouterOptions, ServerState, StaticUploads};
use service::{
    image::{local::LocalDiskHost, remote::RemoteImageHost, ImageHost},
    item::{
        domain::IngestPolicy,
        repo::seaorm::SeaOrmItemStore,
        repository::{memory::MemoryItemStore, ItemStore},
        ItemService,
    },
    observability, runtime,
};

fn init_logging() {
    init_logging_from_env();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

async fn build_store(cfg: &AppConfig) -> Result<Arc<dyn ItemStore>, StartupError> {
    match cfg.storage.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryItemStore::new())),
        StoreBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            migration::Migrator::up(&db, None)
                .await
                .map_err(|e| StartupError::InvalidConfig(format!("migrations failed: {e}")))?;
            Ok(Arc::new(SeaOrmItemStore { db }))
        }
    }
}

async fn build_images(cfg: &AppConfig) -> Result<(Arc<dyn ImageHost>, Option<StaticUploads>), StartupError> {
    let images = &cfg.images;
    match images.backend {
        ImageBackend::Local => {
            runtime::ensure_env(&images.upload_dir).await?;
            let dir = PathBuf::from(&images.upload_dir);
            let host = LocalDiskHost::new(dir.clone(), &images.public_path);
            Ok((Arc::new(host), Some(StaticUploads { dir, public_path: images.public_path.clone() })))
        }
        ImageBackend::Remote => {
            let remote = &images.remote;
            let host = RemoteImageHost::new(&remote.endpoint, &remote.api_key, Duration::from_secs(remote.timeout_secs))
                .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            Ok((Arc::new(host), None))
        }
    }
}

/// Wire the item service from config and build the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = build_store(cfg).await?;
    let (images, uploads) = build_images(cfg).await?;
    info!(store = store.backend(), images = images.backend(), require_image = cfg.ingest.require_image, "item_service_ready");

    let policy = IngestPolicy { require_image: cfg.ingest.require_image };
    let state = ServerState { items: Arc::new(ItemService::new(store, images, policy)) };
    let opts = RouterOptions { cors: build_cors(), uploads, max_upload_bytes: cfg.ingest.max_upload_bytes };
    Ok(routes::build_router(state, opts))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();
    observability::init();

    let cfg = AppConfig::load_or_env()?;
    let app = build_app(&cfg).await?;

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting item server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl_c listener failed; shutting down");
        return;
    }
    info!("received Ctrl+C, shutting down");
}
