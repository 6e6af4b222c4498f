//! Repository layer for database operations

pub mod books;
pub mod categories;
pub mod loans;
pub mod progress;
pub mod rankings;
pub mod scores;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub categories: categories::CategoriesRepository,
    pub loans: loans::LoansRepository,
    pub progress: progress::ProgressRepository,
    pub scores: scores::ScoresRepository,
    pub rankings: rankings::RankingsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            progress: progress::ProgressRepository::new(pool.clone()),
            scores: scores::ScoresRepository::new(pool.clone()),
            rankings: rankings::RankingsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
