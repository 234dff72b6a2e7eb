//! HTTP API for the bracket engine.
//!
//! # Modules
//!
//! - [`tournaments`]: create, list, publish and cancel tournaments
//! - [`entries`]: registration, withdrawal, confirmation
//! - [`bracket`]: bracket generation and the round-by-round view
//! - [`matches`]: match listing and result record / edit / annul
//! - [`participants`]: minimal participant directory for the stores
//! - [`error`]: engine error to HTTP status mapping
//! - [`request_id`]: correlation ids and request metrics
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health
//! POST   /api/v1/participants
//! POST   /api/v1/tournaments
//! GET    /api/v1/tournaments
//! GET    /api/v1/tournaments/{id}
//! PUT    /api/v1/tournaments/{id}/publish
//! PUT    /api/v1/tournaments/{id}/cancel
//! GET    /api/v1/tournaments/{id}/entries
//! POST   /api/v1/tournaments/{id}/entries
//! DELETE /api/v1/tournaments/{id}/entries/{participantId}
//! PUT    /api/v1/tournaments/{id}/entries/{entryId}/confirm
//! PUT    /api/v1/tournaments/{id}/entries/{entryId}/cancel
//! POST   /api/v1/tournaments/{id}/bracket/generate
//! GET    /api/v1/tournaments/{id}/bracket
//! GET    /api/v1/tournaments/{id}/matches
//! GET    /api/v1/tournaments/{id}/matches/{matchId}
//! POST   /api/v1/tournaments/{id}/matches/{matchId}/result
//! PUT    /api/v1/tournaments/{id}/matches/{matchId}/result
//! DELETE /api/v1/tournaments/{id}/matches/{matchId}/result
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tourney::{Engine, EngineContext, MemoryStore};
//! use tourney_server::api::{AppState, create_router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let engine = Engine::new(EngineContext::new(store.clone()));
//! let app = create_router(AppState::new(engine, store.clone(), store));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:6969").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development.

pub mod bracket;
pub mod entries;
pub mod error;
pub mod matches;
pub mod participants;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
};
use serde_json::json;
use std::sync::Arc;
use tourney::{Engine, Store};
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ErrorResponse};
pub use participants::ParticipantDirectory;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    /// Used by the health check
    pub store: Arc<dyn Store>,
    pub participants: Arc<dyn ParticipantDirectory>,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        engine: Engine,
        store: Arc<dyn Store>,
        participants: Arc<dyn ParticipantDirectory>,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            store,
            participants,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::track_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API v1 routes
fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/participants", post(participants::create_participant))
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{tournament_id}/publish",
            put(tournaments::publish_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/cancel",
            put(tournaments::cancel_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/entries",
            get(entries::list_entries).post(entries::register_entry),
        )
        // DELETE takes a participant id, the PUT routes an entry id
        .route(
            "/tournaments/{tournament_id}/entries/{subject_id}",
            delete(entries::withdraw_entry),
        )
        .route(
            "/tournaments/{tournament_id}/entries/{subject_id}/confirm",
            put(entries::confirm_entry),
        )
        .route(
            "/tournaments/{tournament_id}/entries/{subject_id}/cancel",
            put(entries::cancel_entry),
        )
        .route(
            "/tournaments/{tournament_id}/bracket",
            get(bracket::view_bracket),
        )
        .route(
            "/tournaments/{tournament_id}/bracket/generate",
            post(bracket::generate_bracket),
        )
        .route(
            "/tournaments/{tournament_id}/matches",
            get(matches::list_matches),
        )
        .route(
            "/tournaments/{tournament_id}/matches/{match_id}",
            get(matches::get_match),
        )
        .route(
            "/tournaments/{tournament_id}/matches/{match_id}/result",
            post(matches::record_result)
                .put(matches::edit_result)
                .delete(matches::annul_result),
        )
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` if the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","storage":true,"version":"0.4.0","timestamp":"2026-10-16T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_healthy = state.store.list_tournaments().await.is_ok();

    let status_code = if storage_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if storage_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
