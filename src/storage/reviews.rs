use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::info;

/// Format of `created_at`; SQLite's `strftime` parses it directly
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const MAX_REVIEW_TEXT_LEN: usize = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored review row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: i64,
    pub book_id: i64,
    pub rating: i64,
    pub review_text: String,
    pub created_at: NaiveDateTime,
}

/// All review texts of one book plus their mean rating
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookReviews {
    pub texts: Vec<String>,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookRating {
    pub book_id: i64,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRating {
    pub year: i32,
    pub month: u32,
    pub average_rating: f64,
}

/// Append-only SQLite review table
#[derive(Clone)]
pub struct ReviewStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!(path = %path.display(), "Opening review database");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                review_id   INTEGER PRIMARY KEY AUTOINCREMENT,
                book_id     INTEGER NOT NULL,
                rating      INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 5),
                review_text TEXT NOT NULL CHECK (length(review_text) <= 1000),
                created_at  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_reviews_book_id ON reviews (book_id);
            "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Insert a review stamped with `created_at`
    pub fn insert_review(
        &self,
        book_id: i64,
        rating: i64,
        review_text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Review, StoreError> {
        let created_at = created_at.naive_utc();
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO reviews (book_id, rating, review_text, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                book_id,
                rating,
                review_text,
                created_at.format(TIMESTAMP_FORMAT).to_string()
            ],
        )?;

        Ok(Review {
            review_id: conn.last_insert_rowid(),
            book_id,
            rating,
            review_text: review_text.to_string(),
            // Stored with second precision
            created_at: created_at.with_nanosecond(0).unwrap_or(created_at),
        })
    }

    /// Review texts in insertion order and their mean rating (0 when none)
    pub fn reviews_for_book(&self, book_id: i64) -> Result<BookReviews, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT review_text, rating FROM reviews WHERE book_id = ?1 ORDER BY review_id",
        )?;

        let rows = stmt.query_map([book_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut texts = Vec::new();
        let mut total = 0i64;
        for row in rows {
            let (text, rating) = row?;
            texts.push(text);
            total += rating;
        }

        let average = if texts.is_empty() {
            0.0
        } else {
            total as f64 / texts.len() as f64
        };

        Ok(BookReviews { texts, average })
    }

    /// Highest average ratings first, ties by ascending book id
    pub fn top_n_by_average_rating(&self, n: u32) -> Result<Vec<BookRating>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT book_id, AVG(rating) AS average_rating
             FROM reviews
             GROUP BY book_id
             ORDER BY average_rating DESC, book_id ASC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map([n], |row| {
            Ok(BookRating {
                book_id: row.get(0)?,
                average_rating: row.get(1)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Mean rating per calendar month of `created_at`, oldest first
    pub fn monthly_average_rating(&self, book_id: i64) -> Result<Vec<MonthlyRating>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT CAST(strftime('%Y', created_at) AS INTEGER) AS year,
                    CAST(strftime('%m', created_at) AS INTEGER) AS month,
                    AVG(rating) AS average_rating
             FROM reviews
             WHERE book_id = ?1
             GROUP BY year, month
             ORDER BY year, month",
        )?;

        let rows = stmt.query_map([book_id], |row| {
            Ok(MonthlyRating {
                year: row.get(0)?,
                month: row.get(1)?,
                average_rating: row.get(2)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Drop the table so every query fails
    #[cfg(test)]
    pub fn drop_table(&self) -> Result<(), StoreError> {
        self.lock()?.execute_batch("DROP TABLE reviews")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn book_without_reviews_has_zero_average() {
        let store = ReviewStore::open_in_memory().unwrap();
        let reviews = store.reviews_for_book(42).unwrap();

        assert!(reviews.texts.is_empty());
        assert_eq!(reviews.average, 0.0);
    }

    #[test]
    fn average_is_mean_of_ratings() {
        let store = ReviewStore::open_in_memory().unwrap();
        let now = Utc::now();
        store.insert_review(7, 5, "great", now).unwrap();
        store.insert_review(7, 3, "fine", now).unwrap();
        store.insert_review(7, 4, "good", now).unwrap();
        store.insert_review(8, 0, "other book", now).unwrap();

        let reviews = store.reviews_for_book(7).unwrap();
        assert_eq!(reviews.texts, vec!["great", "fine", "good"]);
        assert_eq!(reviews.average, 4.0);
    }

    #[test]
    fn insert_returns_stored_row() {
        let store = ReviewStore::open_in_memory().unwrap();
        let review = store
            .insert_review(1, 5, "Amazing book!", at(2023, 11, 5))
            .unwrap();

        assert_eq!(review.review_id, 1);
        assert_eq!(review.book_id, 1);
        assert_eq!(review.rating, 5);
        assert_eq!(review.review_text, "Amazing book!");
        assert_eq!(review.created_at, at(2023, 11, 5).naive_utc());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn out_of_range_rating_violates_constraint() {
        let store = ReviewStore::open_in_memory().unwrap();
        let result = store.insert_review(1, 6, "too good", Utc::now());

        assert!(matches!(result, Err(StoreError::Sqlite(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn overlong_text_violates_constraint() {
        let store = ReviewStore::open_in_memory().unwrap();
        let text = "x".repeat(MAX_REVIEW_TEXT_LEN + 1);

        assert!(store.insert_review(1, 3, &text, Utc::now()).is_err());
    }

    #[test]
    fn top_n_orders_by_average_then_book_id() {
        let store = ReviewStore::open_in_memory().unwrap();
        let now = Utc::now();
        // book 1: 4.5, book 2: 3.8 (avg of 4,4,4,3,4), book 3: 4.5, book 4: 1
        store.insert_review(1, 5, "a", now).unwrap();
        store.insert_review(1, 4, "b", now).unwrap();
        for rating in [4, 4, 4, 3, 4] {
            store.insert_review(2, rating, "c", now).unwrap();
        }
        store.insert_review(3, 4, "d", now).unwrap();
        store.insert_review(3, 5, "e", now).unwrap();
        store.insert_review(4, 1, "f", now).unwrap();

        let top = store.top_n_by_average_rating(3).unwrap();
        let ids: Vec<i64> = top.iter().map(|r| r.book_id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(top[0].average_rating, 4.5);
        assert!((top[2].average_rating - 3.8).abs() < 1e-9);
    }

    #[test]
    fn top_n_on_empty_table() {
        let store = ReviewStore::open_in_memory().unwrap();
        assert!(store.top_n_by_average_rating(10).unwrap().is_empty());
    }

    #[test]
    fn monthly_average_groups_by_calendar_month() {
        let store = ReviewStore::open_in_memory().unwrap();
        store.insert_review(9, 4, "jan 1", at(2024, 1, 3)).unwrap();
        store.insert_review(9, 2, "jan 2", at(2024, 1, 28)).unwrap();
        store.insert_review(9, 5, "nov", at(2023, 11, 15)).unwrap();
        store.insert_review(9, 1, "feb", at(2024, 2, 1)).unwrap();
        store.insert_review(10, 0, "elsewhere", at(2024, 1, 10)).unwrap();

        let monthly = store.monthly_average_rating(9).unwrap();
        assert_eq!(
            monthly,
            vec![
                MonthlyRating { year: 2023, month: 11, average_rating: 5.0 },
                MonthlyRating { year: 2024, month: 1, average_rating: 3.0 },
                MonthlyRating { year: 2024, month: 2, average_rating: 1.0 },
            ]
        );
    }

    #[test]
    fn queries_fail_once_table_is_gone() {
        let store = ReviewStore::open_in_memory().unwrap();
        store.drop_table().unwrap();

        assert!(matches!(store.count(), Err(StoreError::Sqlite(_))));
        assert!(store.reviews_for_book(1).is_err());
        assert!(store.insert_review(1, 3, "ok", Utc::now()).is_err());
    }

    #[test]
    fn monthly_average_empty_for_unknown_book() {
        let store = ReviewStore::open_in_memory().unwrap();
        assert!(store.monthly_average_rating(404).unwrap().is_empty());
    }
}
