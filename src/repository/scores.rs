//! Scores repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{ranking::RankingEntry, score::Score},
};

#[derive(Clone)]
pub struct ScoresRepository {
    pool: Pool<Postgres>,
}

impl ScoresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: i32, book_id: i32) -> AppResult<Option<Score>> {
        let score = sqlx::query_as::<_, Score>(
            "SELECT * FROM scores WHERE user_id = $1 AND book_id = $2",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(score)
    }

    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Score>> {
        let rows = sqlx::query_as::<_, Score>(
            "SELECT * FROM scores WHERE user_id = $1 ORDER BY scored_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// One score per (user, book); a second score replaces the first
    pub async fn upsert(&self, user_id: i32, book_id: i32, rating: i32) -> AppResult<Score> {
        let score = sqlx::query_as::<_, Score>(
            r#"
            INSERT INTO scores (user_id, book_id, rating, scored_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, book_id) DO UPDATE
                SET rating = EXCLUDED.rating, scored_at = EXCLUDED.scored_at
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(rating)
        .fetch_one(&self.pool)
        .await?;
        Ok(score)
    }

    /// Mean score per book, best first, optionally restricted to one year
    pub async fn mean_scores(&self, year: Option<i32>, limit: usize) -> AppResult<Vec<RankingEntry>> {
        let rows = sqlx::query_as::<_, RankingEntry>(
            r#"
            SELECT b.id AS book_id, b.title, b.author,
                   AVG(s.rating)::float8 AS mean_score,
                   COUNT(s.id) AS votes
            FROM scores s
            JOIN books b ON b.id = s.book_id
            WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM s.scored_at)::int = $1)
            GROUP BY b.id, b.title, b.author
            ORDER BY mean_score DESC, b.id
            LIMIT $2
            "#,
        )
        .bind(year)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
