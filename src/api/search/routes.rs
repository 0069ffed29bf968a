use crate::api::models::AppState;
use crate::api::search::handlers::{get_book_handler, search_books_handler};
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_books_handler))
        .route("/search/{id}", get(get_book_handler))
}
