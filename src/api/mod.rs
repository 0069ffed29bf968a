pub mod models;
pub mod ratings;
pub mod review;
pub mod search;


// Re-exports
pub use models::*;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::warn;

/// Reports `degraded` with 503 when the review database can't be read
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, status, total_reviews) = match state.review_store.count() {
        Ok(count) => (StatusCode::OK, "healthy", Some(count)),
        Err(e) => {
            warn!(error = %e, "Health check could not count reviews");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", None)
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            total_reviews,
        }),
    )
}

/// All endpoints, without middleware layers
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(search::routes())
        .merge(ratings::routes())
        .merge(review::routes())
        .with_state(state)
}
