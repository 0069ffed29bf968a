use crate::aggregator::{to_book_view, to_book_views, Book};
use crate::api::models::*;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::info;

pub async fn search_books_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(params) = params?;

    // Validate before touching the catalog
    let page = params.validate().map_err(AppError::BadRequest)?;

    info!(title = %params.title, page, "Searching catalog");

    let catalog_page = state
        .catalog
        .search(&params.title, page)
        .await
        .map_err(|e| {
            AppError::Upstream(format!("An error occurred while fetching the books: {}", e))
        })?;

    let results = to_book_views(catalog_page.results, &state.review_store)
        .map_err(|e| AppError::Internal(format!("Review lookup failed: {}", e)))?;

    info!(found = results.len(), total = catalog_page.count, "Search complete");

    Ok(Json(SearchResponse {
        count: catalog_page.count,
        next: catalog_page.next,
        previous: catalog_page.previous,
        results,
    }))
}

pub async fn get_book_handler(
    State(state): State<AppState>,
    book_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(book_id) = book_id?;
    info!(book_id, "Looking up book");

    let raw = state
        .catalog
        .lookup_by_ids(&[book_id])
        .await
        .map_err(|e| AppError::Internal(format!("An error occurred: {}", e)))?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))?;

    let book = to_book_view(raw, &state.review_store)
        .map_err(|e| AppError::Internal(format!("An error occurred: {}", e)))?;

    Ok(Json(book))
}
