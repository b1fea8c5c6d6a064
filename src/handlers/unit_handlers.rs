use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::activity::{self, UnitActivity};
use crate::aggregate::{self, UnitSummary};
use crate::dto::{CreateUnitDto, DrillDto, PairSessionDto, ReadingDto};
use crate::errors::ApiError;
use crate::linkage;
use crate::models::{ContentUnit, StudyItem};
use crate::AppState;

/// Handler for creating a content unit
///
/// This function handles POST requests to `/units`. The key is canonicalized
/// before storage, so `" Art-5 "` and `"art-5"` name the same unit.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `payload` - The request payload with the key and title
///
/// ### Returns
///
/// The newly created unit as JSON, or 409 if the key is taken
#[instrument(skip(state), fields(key = %payload.key))]
pub async fn create_unit_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUnitDto>,
) -> Result<Json<ContentUnit>, ApiError> {
    info!("Creating unit");

    let key = linkage::canonicalize(&payload.key);
    if key.is_empty() {
        return Err(ApiError::InvalidKey(
            "Unit key must not be empty".to_string(),
        ));
    }

    let unit = ContentUnit::new(key.clone(), payload.title, Utc::now());
    let unit = state
        .store
        .insert_unit(unit)?
        .ok_or(ApiError::DuplicateKey(key))?;

    info!("Created unit with key: {}", unit.get_key());
    Ok(Json(unit))
}

/// Handler for listing all content units
///
/// This function handles GET requests to `/units`.
#[instrument(skip(state))]
pub async fn list_units_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ContentUnit>>, ApiError> {
    debug!("Listing units");

    let units = state.store.list_units()?;
    Ok(Json(units))
}

/// Handler for deleting a unit and everything linked to it
///
/// This function handles DELETE requests to `/units/{key}`. Linked items are
/// soft-deleted in the same store transaction.
///
/// ### Returns
///
/// A confirmation with the cascade count as JSON, or 404
#[instrument(skip(state), fields(key = %key))]
pub async fn delete_unit_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!("Deleting unit");

    let key = linkage::canonicalize(&key);
    let cascaded = state
        .store
        .delete_unit(&key, Utc::now())?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(serde_json::json!({
        "deleted": key,
        "cascaded_items": cascaded,
    })))
}

/// Handler for marking a unit's text as read or unread
///
/// This function handles PUT requests to `/units/{key}/reading`.
#[instrument(skip(state), fields(key = %key, done = %payload.done))]
pub async fn set_reading_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<ReadingDto>,
) -> Result<Json<ContentUnit>, ApiError> {
    info!("Setting reading flag");

    let key = linkage::canonicalize(&key);
    let unit = state
        .store
        .update_unit(&key, |u| u.set_reading_done(payload.done))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(unit))
}

/// Handler for recording a matching-pair game session
///
/// This function handles PUT requests to `/units/{key}/pair-session`. Only
/// the most recent session is kept.
#[instrument(skip(state), fields(key = %key, errors = %payload.errors))]
pub async fn record_pair_session_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<PairSessionDto>,
) -> Result<Json<ContentUnit>, ApiError> {
    info!("Recording pair session");

    let key = linkage::canonicalize(&key);
    let unit = state
        .store
        .update_unit(&key, |u| u.record_pair_session(payload.errors))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(unit))
}

/// Handler for recording a timed-drill play
///
/// This function handles PUT requests to `/units/{key}/drill`. The play count
/// grows and the best score is kept.
#[instrument(skip(state), fields(key = %key, score = %payload.score))]
pub async fn record_drill_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<DrillDto>,
) -> Result<Json<ContentUnit>, ApiError> {
    info!("Recording drill play");

    let key = linkage::canonicalize(&key);
    let unit = state
        .store
        .update_unit(&key, |u| u.record_drill(payload.score))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(unit))
}

/// Handler for a unit's progress summary
///
/// This function handles GET requests to `/units/{key}/summary`. The summary
/// is recomputed from the live item collection on every call.
#[instrument(skip(state), fields(key = %key))]
pub async fn get_unit_summary_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<UnitSummary>, ApiError> {
    debug!("Computing unit summary");

    let key = linkage::canonicalize(&key);
    let unit = state.store.get_unit(&key)?.ok_or(ApiError::NotFound)?;
    let items = state.store.list_items()?;
    let refs: Vec<&StudyItem> = items.iter().collect();

    let summary = aggregate::unit_summary(&unit, &refs, Utc::now());
    Ok(Json(summary))
}

/// Handler for a unit's per-category activity states
///
/// This function handles GET requests to `/units/{key}/activity`. States are
/// derived fresh from the live collection; nothing is cached between calls.
#[instrument(skip(state), fields(key = %key))]
pub async fn get_unit_activity_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<UnitActivity>, ApiError> {
    debug!("Computing unit activity");

    let key = linkage::canonicalize(&key);
    let unit = state.store.get_unit(&key)?.ok_or(ApiError::NotFound)?;
    let items = state.store.list_items()?;
    let refs: Vec<&StudyItem> = items.iter().collect();

    let activity = activity::unit_activity(&unit, &refs, Utc::now());
    Ok(Json(activity))
}
