//! Reading progress model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Per-user, per-book reading progress
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReadingProgress {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub current_page: i32,
    /// 0-100
    pub percentage: f64,
    pub updated_at: DateTime<Utc>,
}

/// Update progress request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProgress {
    #[validate(range(min = 0, message = "Current page cannot be negative"))]
    pub current_page: i32,
}

/// Values written by a progress upsert, derived fields already computed
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub user_id: i32,
    pub book_id: i32,
    pub current_page: i32,
    pub percentage: f64,
}

impl ProgressUpdate {
    /// Start from the stored record (if any) and move to `current_page`.
    ///
    /// The percentage is recomputed on every update; a book without a page
    /// count keeps the previous percentage.
    pub fn compute(
        user_id: i32,
        book_id: i32,
        previous: Option<&ReadingProgress>,
        current_page: i32,
        total_pages: i32,
    ) -> Self {
        let previous_percentage = previous.map(|p| p.percentage).unwrap_or(0.0);
        Self {
            user_id,
            book_id,
            current_page,
            percentage: reading_percentage(current_page, total_pages).unwrap_or(previous_percentage),
        }
    }
}

/// `current_page / total_pages * 100`, `None` for books without a page count
pub fn reading_percentage(current_page: i32, total_pages: i32) -> Option<f64> {
    if total_pages > 0 {
        Some(f64::from(current_page) / f64::from(total_pages) * 100.0)
    } else {
        None
    }
}
