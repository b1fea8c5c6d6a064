use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::aggregate::{self, ItemStats};
use crate::dto::{CreateItemDto, ItemQueryDto};
use crate::errors::ApiError;
use crate::linkage;
use crate::models::StudyItem;
use crate::AppState;

/// Handler for creating a new study item
///
/// This function handles POST requests to `/items`.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `payload` - The request payload containing the item content
///
/// ### Returns
///
/// The newly created item as JSON
#[instrument(skip(state, payload), fields(kind = ?payload.kind))]
pub async fn create_item_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateItemDto>,
) -> Result<Json<StudyItem>, ApiError> {
    info!("Creating new item");

    let item = StudyItem::new_with_fields(
        Uuid::new_v4().to_string(),
        payload.kind,
        payload.reference,
        payload.unit_key,
        payload.legacy_unit_key,
        payload.tags,
        payload.prompt,
        payload.answer,
        payload.explanation,
        state.srs.initial_stability_days,
        Utc::now(),
    );
    let item = state.store.insert_item(item)?;

    info!("Successfully created item with id: {}", item.get_id());
    Ok(Json(item))
}

/// Handler for retrieving a specific item
///
/// This function handles GET requests to `/items/{id}`.
///
/// ### Returns
///
/// The requested item as JSON, or null if not found
#[instrument(skip(state), fields(item_id = %id))]
pub async fn get_item_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Option<StudyItem>>, ApiError> {
    debug!("Getting item");

    let item = state.store.get_item(&id)?;
    Ok(Json(item))
}

/// Handler for listing items with optional filtering
///
/// This function handles GET requests to `/items`.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `query` - Query parameters: `unit` restricts to items linked to a unit
///   key, `due_before` to items scheduled at or before a time
///
/// ### Returns
///
/// A list of items matching the filter criteria as JSON
#[instrument(skip(state, query))]
pub async fn list_items_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ItemQueryDto>,
) -> Result<Json<Vec<StudyItem>>, ApiError> {
    debug!("Listing items with filters: {:?}", query);

    let mut items = state.store.list_items()?;
    if let Some(ref unit) = query.unit {
        items.retain(|item| linkage::is_linked(item, unit));
    }
    if let Some(due_before) = query.due_before {
        items.retain(|item| item.get_next_review_at() <= due_before);
    }

    info!("Retrieved {} items", items.len());
    Ok(Json(items))
}

/// Handler for soft-deleting an item
///
/// This function handles DELETE requests to `/items/{id}`.
///
/// ### Returns
///
/// A confirmation as JSON, or 404 if no live item has the ID
#[instrument(skip(state), fields(item_id = %id))]
pub async fn delete_item_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!("Deleting item");

    if !state.store.delete_item(&id, Utc::now())? {
        return Err(ApiError::NotFound);
    }

    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// Handler for global item statistics
///
/// This function handles GET requests to `/stats`.
///
/// ### Returns
///
/// Aggregate statistics over all live items as JSON
#[instrument(skip(state))]
pub async fn get_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ItemStats>, ApiError> {
    debug!("Computing global stats");

    let items = state.store.list_items()?;
    let refs: Vec<&StudyItem> = items.iter().collect();
    let stats = aggregate::aggregate(&refs, Utc::now());

    Ok(Json(stats))
}
