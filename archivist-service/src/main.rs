use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

mod api;
mod config;
mod error;
mod ingestion;
mod jobs;
mod processing;
mod service;
mod store;

use crate::config::StaticConfig;
use crate::jobs::JobRegistry;
use crate::jobs::pool::WorkerPool;
use crate::processing::ArchiveProcessor;
use crate::service::IngestService;
use crate::store::{DocumentStore, MemoryStore};

// Re-export config crate types to avoid namespace collision
use ::config::{Config as ConfigBuilder, Environment, File};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!(
        "Starting Archivist service v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load static configuration (server binding, storage paths, pool size)
    let static_config: StaticConfig = ConfigBuilder::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("ARCHIVIST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    info!(
        host = %static_config.server.host,
        port = static_config.server.port,
        "Static configuration loaded"
    );

    // Ensure storage directories exist
    let documents_dir = static_config.storage.documents_dir();
    std::fs::create_dir_all(&documents_dir)?;

    // The job registry and worker pool are built exactly once here and
    // injected into everything that touches job state. The pool's slot count
    // is fixed for the life of the process.
    let registry = Arc::new(JobRegistry::new());
    let pool = WorkerPool::new(static_config.ingest.worker_slots, registry.clone());
    info!(
        slots = static_config.ingest.worker_slots,
        "Worker pool ready"
    );

    // The bundled store is in-process only; durable deployments implement
    // DocumentStore over their database.
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let processor = Arc::new(ArchiveProcessor::new(store.clone(), documents_dir));

    let service = Arc::new(IngestService::new(
        &static_config,
        store,
        processor,
        registry,
        pool,
    )?);

    // Build the router
    let app = api::router(service, &static_config);

    // Start the server
    let addr = format!(
        "{}:{}",
        static_config.server.host, static_config.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("archivist_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
