//! Archived yearly rankings

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::ranking::{AnnualRanking, RankingEntry},
};

#[derive(Clone)]
pub struct RankingsRepository {
    pool: Pool<Postgres>,
}

impl RankingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_year(&self, year: i32) -> AppResult<Vec<AnnualRanking>> {
        let rows = sqlx::query_as::<_, AnnualRanking>(
            r#"
            SELECT r.year, r.position, r.book_id, b.title, r.mean_score, r.votes, r.archived_at
            FROM annual_rankings r
            JOIN books b ON b.id = r.book_id
            WHERE r.year = $1
            ORDER BY r.position
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Replace the archived ranking of a year with `entries` (already ordered)
    pub async fn replace_year(&self, year: i32, entries: &[RankingEntry]) -> AppResult<Vec<AnnualRanking>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM annual_rankings WHERE year = $1")
            .bind(year)
            .execute(&mut *tx)
            .await?;

        for (idx, entry) in entries.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO annual_rankings (year, book_id, position, mean_score, votes)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(year)
            .bind(entry.book_id)
            .bind((idx + 1) as i16)
            .bind(entry.mean_score)
            .bind(entry.votes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.get_year(year).await
    }
}
