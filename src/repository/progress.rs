//! Reading progress repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::progress::{ProgressUpdate, ReadingProgress},
};

#[derive(Clone)]
pub struct ProgressRepository {
    pool: Pool<Postgres>,
}

impl ProgressRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: i32, book_id: i32) -> AppResult<Option<ReadingProgress>> {
        let progress = sqlx::query_as::<_, ReadingProgress>(
            "SELECT * FROM reading_progress WHERE user_id = $1 AND book_id = $2",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(progress)
    }

    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<ReadingProgress>> {
        let rows = sqlx::query_as::<_, ReadingProgress>(
            "SELECT * FROM reading_progress WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert or overwrite the progress of a user on a book
    pub async fn upsert(&self, update: &ProgressUpdate) -> AppResult<ReadingProgress> {
        let progress = sqlx::query_as::<_, ReadingProgress>(
            r#"
            INSERT INTO reading_progress (user_id, book_id, current_page, percentage, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id, book_id) DO UPDATE
                SET current_page = EXCLUDED.current_page,
                    percentage = EXCLUDED.percentage,
                    updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(update.user_id)
        .bind(update.book_id)
        .bind(update.current_page)
        .bind(update.percentage)
        .fetch_one(&self.pool)
        .await?;
        Ok(progress)
    }
}
