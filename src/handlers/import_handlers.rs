use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::{ImportDto, ImportResponseDto};
use crate::errors::ApiError;
use crate::models::StudyItem;
use crate::AppState;

/// Handler for importing a batch of items
///
/// This function handles POST requests to `/import`. The whole batch merges
/// inside one store transaction; replaying a batch never duplicates items.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `payload` - The merge policy and the batch of records
///
/// ### Returns
///
/// The merge counters as JSON
#[instrument(skip(state, payload), fields(records = payload.records.len(), policy = ?payload.policy))]
pub async fn import_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImportDto>,
) -> Result<Json<ImportResponseDto>, ApiError> {
    info!("Importing batch");

    let now = Utc::now();
    let incoming: Vec<StudyItem> = payload
        .records
        .into_iter()
        .map(|record| {
            let id = record
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            StudyItem::new_with_fields(
                id,
                record.kind,
                record.reference,
                record.unit_key,
                record.legacy_unit_key,
                record.tags,
                record.prompt,
                record.answer,
                record.explanation,
                state.srs.initial_stability_days,
                now,
            )
        })
        .collect();

    let report = state.store.import(incoming, payload.policy)?;

    info!(
        "Import finished: {} imported, {} updated, {} blocked",
        report.imported, report.updated, report.blocked
    );
    Ok(Json(ImportResponseDto { report }))
}
