use crate::api::models::AppState;
use crate::api::ratings::handlers::{monthly_ratings_handler, top_books_handler};
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/top", get(top_books_handler))
        .route("/averageRatingPerMonth", get(monthly_ratings_handler))
}
