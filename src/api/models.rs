use crate::aggregator::{Book, BookDetails};
use crate::catalog::Catalog;
use crate::storage::{MonthlyRating, ReviewStore, MAX_REVIEW_TEXT_LEN};
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub review_store: ReviewStore,
}

/// Query for `GET /search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub title: String,

    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// Query for `GET /top`
#[derive(Debug, Deserialize)]
pub struct TopParams {
    #[serde(default = "default_top_n")]
    pub n: i64,
}

fn default_top_n() -> i64 {
    10
}

/// Query for `GET /averageRatingPerMonth`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRatingParams {
    pub book_id: i64,
}

/// Body of `POST /reviews`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub book_id: Option<i64>,
    pub rating: Option<i64>,
    pub review_text: Option<String>,
}

/// A review that passed validation
#[derive(Debug, PartialEq)]
pub struct NewReview {
    pub book_id: i64,
    pub rating: i64,
    pub review_text: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct TopBooksResponse {
    pub books: Vec<TopBook>,
}

/// Ranked book. `details` is null when the catalog lookup failed.
#[derive(Debug, Serialize)]
pub struct TopBook {
    pub id: i64,
    pub rating: f64,
    pub details: Option<BookDetails>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MonthlyRatingsResponse {
    #[serde(rename_all = "camelCase")]
    Found {
        book_id: i64,
        monthly_ratings: Vec<MonthlyRating>,
    },
    Empty {
        message: String,
    },
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Null when the review database can't be read
    pub total_reviews: Option<usize>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl SearchParams {
    /// Validate the page number
    pub fn validate(&self) -> Result<u32, String> {
        if self.page <= 0 {
            return Err("Page number must be a positive integer".to_string());
        }
        u32::try_from(self.page).map_err(|_| "Page number is too large".to_string())
    }
}

impl TopParams {
    pub fn validate(&self) -> Result<u32, String> {
        if self.n <= 0 {
            return Err("Number must be a positive integer".to_string());
        }
        u32::try_from(self.n).map_err(|_| "Number is too large".to_string())
    }
}

impl SubmitReviewRequest {
    /// Validate the request
    pub fn validate(self) -> Result<NewReview, String> {
        let book_id = self.book_id.ok_or("Book ID is required")?;
        let rating = self.rating.ok_or("Rating is required")?;
        if !(0..=5).contains(&rating) {
            return Err("Rating must be between 0 and 5".to_string());
        }
        let review_text = self.review_text.ok_or("Review text is required")?;
        if review_text.chars().count() > MAX_REVIEW_TEXT_LEN {
            return Err(format!(
                "Review text must be at most {} characters",
                MAX_REVIEW_TEXT_LEN
            ));
        }

        Ok(NewReview {
            book_id,
            rating,
            review_text,
        })
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Upstream(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Upstream(msg) => {
                error!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// Malformed input is a client error with the usual JSON error body

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
