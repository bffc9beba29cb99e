//! HTTP API Layer
//!
//! This crate provides the REST API for expense claims using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: evaluate, submit, list, stream, review
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, Services};
//!
//! let state = AppState::new(config, policy, services);
//! state.feed.refresh().await?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod in_flight;
pub mod middleware;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_claims::{
    ClaimFeed, ClaimPolicy, ClaimStore, DocumentAdmissionPort, DocumentStore, PolicyEvaluator,
    ReviewService, SubmissionService,
};

use crate::config::ApiConfig;
use crate::handlers::{claims, health};
use crate::in_flight::InFlightSubmissions;
use crate::middleware::{audit_middleware, auth_middleware, document_access_middleware};

/// Adapters the API runs against
pub struct Services {
    pub claims: Arc<dyn ClaimStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub admission: Arc<dyn DocumentAdmissionPort>,
    /// Checked by `/health/ready`
    pub probes: Vec<Arc<dyn HealthCheckable>>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub submissions: Arc<SubmissionService>,
    pub reviews: Arc<ReviewService>,
    pub feed: ClaimFeed,
    pub in_flight: InFlightSubmissions,
    pub probes: Arc<Vec<Arc<dyn HealthCheckable>>>,
}

impl AppState {
    /// Wires the services; call `feed.refresh()` before serving
    pub fn new(config: ApiConfig, policy: ClaimPolicy, services: Services) -> Self {
        let feed = ClaimFeed::new(services.claims.clone());

        let submissions = SubmissionService::new(
            PolicyEvaluator::new(policy),
            services.admission,
            services.documents,
            services.claims.clone(),
        )
        .with_feed(feed.clone())
        .with_admission_timeout(config.admission_timeout());

        let reviews = ReviewService::new(services.claims).with_feed(feed.clone());

        Self {
            config,
            submissions: Arc::new(submissions),
            reviews: Arc::new(reviews),
            feed,
            in_flight: InFlightSubmissions::new(),
            probes: Arc::new(services.probes),
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim).get(claims::list_claims))
        .route("/evaluate", post(claims::evaluate))
        .route("/stream", get(claims::stream_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/status", put(claims::update_status))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Uploaded documents, addressed by the URLs stored on claims
    let document_routes = Router::new()
        .nest_service("/files", ServeDir::new(&state.config.document_root))
        .layer(axum_middleware::from_fn(document_access_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .merge(document_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
