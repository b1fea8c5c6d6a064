/// Engram: A Spaced Repetition Study Tracker
///
/// This library provides the core functionality for a spaced repetition
/// study tracker: a memory-state scheduler, retrievability decay, progress
/// aggregation, per-category activity status, and batch import with
/// deduplication, all exposed through a RESTful API.
///
/// The name "Engram" refers to the physical trace a memory leaves in the
/// brain, which is fitting for a system that tracks how well memories hold.
///
/// ### Modules
///
/// - `config`: Layered configuration (defaults, TOML file, env/CLI)
/// - `models`: Study items, content units, attempts and ratings
/// - `linkage`: Item-to-unit key resolution and canonicalization
/// - `scheduler`: The memory-state update applied on every review
/// - `recall`: Retrievability decay and current-domain scoring
/// - `aggregate`: Progress aggregation, unit summaries, fingerprints
/// - `activity`: Per-category activity status and the next-action pick
/// - `merge`: Batch merge and deduplication for imports
/// - `store`: The in-memory store all handlers go through
///
/// ### Web API
///
/// - `POST /items`, `GET /items`, `GET /items/{id}`, `DELETE /items/{id}`
/// - `POST /units`, `GET /units`, `DELETE /units/{key}`
/// - `PUT /units/{key}/reading`, `PUT /units/{key}/pair-session`,
///   `PUT /units/{key}/drill`
/// - `GET /units/{key}/summary`, `GET /units/{key}/activity`
/// - `POST /reviews`, `POST /import`, `GET /stats`

pub mod activity;
pub mod aggregate;
pub mod config;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod linkage;
pub mod merge;
pub mod models;
pub mod recall;
pub mod scheduler;
pub mod store;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use config::SrsConfig;
use store::Store;

/// Shared application state: the store plus the scheduling parameters
#[derive(Debug)]
pub struct AppState {
    pub store: Store,
    pub srs: SrsConfig,
}

impl AppState {
    /// Creates application state with an empty store
    pub fn new(srs: SrsConfig) -> Self {
        Self {
            store: Store::new(),
            srs,
        }
    }
}

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `state` - The application state to be shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes and a permissive CORS layer
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/items",
            post(handlers::create_item_handler).get(handlers::list_items_handler),
        )
        .route(
            "/items/{id}",
            get(handlers::get_item_handler).delete(handlers::delete_item_handler),
        )
        .route(
            "/units",
            post(handlers::create_unit_handler).get(handlers::list_units_handler),
        )
        .route("/units/{key}", axum::routing::delete(handlers::delete_unit_handler))
        .route("/units/{key}/reading", put(handlers::set_reading_handler))
        .route(
            "/units/{key}/pair-session",
            put(handlers::record_pair_session_handler),
        )
        .route("/units/{key}/drill", put(handlers::record_drill_handler))
        .route("/units/{key}/summary", get(handlers::get_unit_summary_handler))
        .route(
            "/units/{key}/activity",
            get(handlers::get_unit_activity_handler),
        )
        .route("/reviews", post(handlers::create_review_handler))
        .route("/import", post(handlers::import_handler))
        .route("/stats", get(handlers::get_stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
