//! Expense Claims - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with in-memory claim storage
//! cargo run --bin claims-api
//!
//! # Run against PostgreSQL
//! API_DATABASE_URL=postgres://... API_CLASSIFIER_URL=https://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string; in-memory storage when unset
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_CLASSIFIER_URL` - Document classifier endpoint
//! * `API_CLASSIFIER_API_KEY` - Bearer token for the classifier
//! * `API_ADMISSION_TIMEOUT_SECS` - Longest wait for a verdict (default: 30)
//! * `API_DOCUMENT_ROOT` - Where uploaded documents are written
//! * `API_DOCUMENT_BASE_URL` - Public URL prefix for uploaded documents
//! * `API_CURRENCY` - Claim currency (default: USD)
//! * `API_MAX_UPLOAD_BYTES` - Largest claims request body (default: 25 MiB)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::HealthCheckable;
use domain_claims::adapters::{
    ClassifierConfig, HttpDocumentClassifier, InMemoryClaimStore, LocalDocumentStore,
};
use domain_claims::{ClaimPolicy, ClaimStore};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresClaimStore};
use interface_api::{config::ApiConfig, create_router, AppState, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        classifier = %config.classifier_url,
        "starting expense claims API server"
    );

    let policy = ClaimPolicy::standard(config.currency()?);
    let services = build_services(&config).await?;

    let state = AppState::new(config.clone(), policy, services);
    state.feed.refresh().await.context("initial claim load failed")?;

    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Picks adapters from configuration
async fn build_services(config: &ApiConfig) -> anyhow::Result<Services> {
    let mut probes: Vec<Arc<dyn HealthCheckable>> = Vec::new();

    let claims: Arc<dyn ClaimStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(DatabaseConfig::new(url)).await?;
            run_migrations(&pool).await?;
            let store = Arc::new(PostgresClaimStore::new(pool));
            probes.push(store.clone());
            store
        }
        None => {
            tracing::warn!("API_DATABASE_URL not set; claims are kept in memory");
            let store = Arc::new(InMemoryClaimStore::new());
            probes.push(store.clone());
            store
        }
    };

    let documents = Arc::new(LocalDocumentStore::new(
        &config.document_root,
        &config.document_base_url,
    ));
    probes.push(documents.clone());

    let classifier = Arc::new(
        HttpDocumentClassifier::new(ClassifierConfig {
            endpoint: config.classifier_url.clone(),
            api_key: config.classifier_api_key.clone(),
            timeout_secs: config.admission_timeout_secs,
        })
        .context("document classifier setup failed")?,
    );
    probes.push(classifier.clone());

    Ok(Services {
        claims,
        documents,
        admission: classifier,
        probes,
    })
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating graceful shutdown");
        }
    }
}
