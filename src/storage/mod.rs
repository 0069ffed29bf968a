pub mod reviews;

pub use reviews::{MonthlyRating, Review, ReviewStore, StoreError, MAX_REVIEW_TEXT_LEN};
