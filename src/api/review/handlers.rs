use crate::api::models::*;
use crate::storage::Review;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

pub async fn submit_review_handler(
    State(state): State<AppState>,
    request: Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    // Validate
    let Json(request) = request?;
    let review = request.validate().map_err(AppError::BadRequest)?;

    info!(book_id = review.book_id, rating = review.rating, "Submitting review");

    let stored = state
        .review_store
        .insert_review(review.book_id, review.rating, &review.review_text, Utc::now())
        .map_err(|e| AppError::Internal(format!("Store review failed: {}", e)))?;

    info!(review_id = stored.review_id, "Review stored");

    Ok((StatusCode::CREATED, Json(stored)))
}
