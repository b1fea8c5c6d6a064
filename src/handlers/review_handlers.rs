use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::{CreateReviewDto, ReviewResponseDto};
use crate::errors::ApiError;
use crate::models::Rating;
use crate::AppState;

/// Handler for recording a review
///
/// This function handles POST requests to `/reviews`. The memory-state
/// update, the attempt append and the rescheduling all happen in one store
/// transaction.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `payload` - The request payload with the item ID, correctness, rating
///   and response time
///
/// ### Returns
///
/// The updated item and the timing classification as JSON
#[instrument(skip(state), fields(item_id = %payload.item_id, rating = %payload.rating))]
pub async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateReviewDto>,
) -> Result<Json<ReviewResponseDto>, ApiError> {
    info!("Recording review");

    let rating = Rating::from_i32(payload.rating).ok_or_else(|| {
        ApiError::InvalidRating(format!(
            "Rating must be between 0 and 3, got {}",
            payload.rating
        ))
    })?;

    let (item, timing) = state
        .store
        .record_review(
            &payload.item_id,
            payload.was_correct,
            rating,
            payload.response_secs,
            Utc::now(),
            &state.srs,
        )?
        .ok_or(ApiError::NotFound)?;

    info!(
        "Recorded review: mastery {:.1}, timing {:?}",
        item.get_mastery_score(),
        timing
    );
    Ok(Json(ReviewResponseDto { item, timing }))
}
