//! treatment-dialogue server.
//!
//! Configuration comes from `TREATMENT_ENGINE__*` environment variables
//! (a `.env` file is honored). See `config` for every key.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use treatment_dialogue::adapters::http::{build_router, TreatmentHandlers};
use treatment_dialogue::adapters::{
    FileTreatmentStore, HttpFallbackConfig, HttpValidationFallback, InMemoryTreatmentStore,
    PostgresTreatmentStore,
};
use treatment_dialogue::application::handlers::{
    GetTreatmentSessionHandler, ProcessInputHandler, RetryPolicy, SessionCache,
    StartTreatmentHandler, TurnPersister,
};
use treatment_dialogue::config::{AppConfig, PersistenceBackend, PersistenceConfig, ServerConfig};
use treatment_dialogue::domain::treatment::TreatmentEngine;
use treatment_dialogue::ports::TreatmentStore;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let store = build_store(&config.persistence).await?;
    let engine = TreatmentEngine::standard(config.engine.max_signal_iterations);
    let sessions = Arc::new(SessionCache::new(store.clone()));
    let sweeper = sessions.spawn_idle_sweeper(config.engine.session_idle_timeout());
    let retry = RetryPolicy::new(
        config.persistence.retry_attempts,
        config.persistence.retry_base_backoff(),
    );
    let persister = Arc::new(TurnPersister::new(store, retry));

    let mut process_handler = ProcessInputHandler::new(engine, sessions.clone(), persister.clone());
    if let Some(endpoint) = config.validation.endpoint.clone() {
        let mut fallback_config =
            HttpFallbackConfig::new(endpoint).with_timeout(config.validation.timeout());
        if let Some(key) = config.validation.api_key.clone() {
            fallback_config = fallback_config.with_api_key(key);
        }
        process_handler = process_handler.with_fallback(Arc::new(HttpValidationFallback::new(
            fallback_config,
        )?));
        info!("Validation fallback enabled");
    }

    let handlers = TreatmentHandlers::new(
        Arc::new(StartTreatmentHandler::new(engine, sessions.clone(), persister)),
        Arc::new(process_handler),
        Arc::new(GetTreatmentSessionHandler::new(sessions)),
    );
    let app = build_router(handlers.clone(), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, backend = ?config.persistence.backend, "treatment-dialogue listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    handlers.process_handler().flush().await;
    info!("Pending writes flushed, shutting down");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_store(config: &PersistenceConfig) -> Result<Arc<dyn TreatmentStore>, BoxError> {
    let store: Arc<dyn TreatmentStore> = match config.backend {
        PersistenceBackend::Memory => {
            warn!("Using in-memory store; sessions will not survive a restart");
            Arc::new(InMemoryTreatmentStore::new())
        }
        PersistenceBackend::File => {
            info!(data_dir = %config.data_dir, "Using file store");
            Arc::new(FileTreatmentStore::new(&config.data_dir))
        }
        PersistenceBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or("postgres backend requires a database_url")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.acquire_timeout())
                .connect(url)
                .await?;
            let store = PostgresTreatmentStore::new(pool);
            if config.run_migrations {
                store.migrate().await?;
                info!("Database migrations applied");
            }
            Arc::new(store)
        }
    };
    Ok(store)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
