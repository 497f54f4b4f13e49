//! HTTP API Layer
//!
//! This crate provides the REST API for the claims workflow using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for claims and health
//! - **Middleware**: Request ids, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, config::ApiConfig};
//! use domain_claims::ClaimService;
//!
//! let config = ApiConfig::from_env()?;
//! let service = ClaimService::in_memory(config.service_settings()?);
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_claims::ClaimService;

use crate::config::ApiConfig;
use crate::handlers::{claims, health};
use crate::middleware::{audit_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ClaimService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - Claim workflow service
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(service: ClaimService, config: ApiConfig) -> Router {
    let state = AppState { service, config };
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/", post(claims::create_claim).get(claims::list_claims))
        .route("/summary", get(claims::summary))
        .route("/by-number/:claim_number", get(claims::get_claim_by_number))
        .route("/:id", get(claims::get_claim).patch(claims::update_claim))
        .route("/:id/upload-link", post(claims::send_upload_link))
        .route("/:id/reminder", post(claims::send_reminder))
        .route("/:id/photos", post(claims::upload_photo))
        .route("/:id/photos/:photo_id", delete(claims::remove_photo))
        .route("/:id/assessment", post(claims::dispatch_assessment))
        .route("/:id/costs", get(claims::cost_summary))
        .route("/:id/lines/:line_id", put(claims::review_line))
        .route("/:id/notes", put(claims::set_agent_notes))
        .route("/:id/review", post(claims::submit_review))
        .route("/:id/review/reset", post(claims::reset_review))
        .route("/:id/resume", post(claims::resume_review))
        .route("/:id/decision", post(claims::decide));

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .route("/jobs/:job_id", get(claims::get_job))
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
