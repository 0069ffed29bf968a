use crate::aggregator::{to_book_details, BookDetails};
use crate::api::models::*;
use crate::catalog::Catalog;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use tracing::{info, warn};

pub async fn top_books_handler(
    State(state): State<AppState>,
    params: Result<Query<TopParams>, QueryRejection>,
) -> Result<Json<TopBooksResponse>, AppError> {
    let Query(params) = params?;
    let n = params.validate().map_err(AppError::BadRequest)?;

    info!(n, "Ranking books by average rating");

    let ranked = state
        .review_store
        .top_n_by_average_rating(n)
        .map_err(|e| AppError::Internal(format!("An error occurred: {}", e)))?;

    let mut books = Vec::with_capacity(ranked.len());
    for entry in ranked {
        books.push(TopBook {
            id: entry.book_id,
            rating: entry.average_rating,
            details: fetch_details(state.catalog.as_ref(), entry.book_id).await,
        });
    }

    Ok(Json(TopBooksResponse { books }))
}

/// Catalog metadata for one ranked book; `None` when it can't be fetched
async fn fetch_details(catalog: &dyn Catalog, book_id: i64) -> Option<BookDetails> {
    match catalog.lookup_by_ids(&[book_id]).await {
        Ok(books) => {
            let details = books.into_iter().next().map(to_book_details);
            if details.is_none() {
                warn!(book_id, "Catalog has no entry for ranked book");
            }
            details
        }
        Err(e) => {
            warn!(book_id, error = %e, "Catalog lookup failed for ranked book");
            None
        }
    }
}

pub async fn monthly_ratings_handler(
    State(state): State<AppState>,
    params: Result<Query<MonthlyRatingParams>, QueryRejection>,
) -> Result<Json<MonthlyRatingsResponse>, AppError> {
    let Query(params) = params?;
    info!(book_id = params.book_id, "Computing monthly average rating");

    let monthly_ratings = state
        .review_store
        .monthly_average_rating(params.book_id)
        .map_err(|e| AppError::Internal(format!("An error occurred: {}", e)))?;

    if monthly_ratings.is_empty() {
        return Ok(Json(MonthlyRatingsResponse::Empty {
            message: "No ratings found for the given book ID".to_string(),
        }));
    }

    Ok(Json(MonthlyRatingsResponse::Found {
        book_id: params.book_id,
        monthly_ratings,
    }))
}
