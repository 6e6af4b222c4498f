//! Reading progress and scores

use crate::{
    error::{AppError, AppResult},
    models::{
        progress::{ProgressUpdate, ReadingProgress},
        score::Score,
        Principal,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ReadingService {
    repository: Repository,
}

impl ReadingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Move the caller's bookmark and recompute the percentage
    pub async fn update_progress(
        &self,
        book_id: i32,
        principal: &Principal,
        current_page: i32,
    ) -> AppResult<ReadingProgress> {
        let book = self.repository.books.get_by_id(book_id).await?;

        if book.total_pages > 0 && current_page > book.total_pages {
            return Err(AppError::Validation(format!(
                "current_page: Page {} is past the end of the book ({} pages)",
                current_page, book.total_pages
            )));
        }

        let previous = self.repository.progress.find(principal.user_id, book_id).await?;
        let update = ProgressUpdate::compute(
            principal.user_id,
            book_id,
            previous.as_ref(),
            current_page,
            book.total_pages,
        );

        let progress = self.repository.progress.upsert(&update).await?;
        tracing::debug!(
            "User {} at page {} of book {} ({:.1}%)",
            principal.user_id,
            progress.current_page,
            book_id,
            progress.percentage
        );
        Ok(progress)
    }

    /// Record the caller's score, replacing any earlier one
    pub async fn score(&self, book_id: i32, principal: &Principal, rating: i32) -> AppResult<Score> {
        self.repository.books.get_by_id(book_id).await?;
        let score = self
            .repository
            .scores
            .upsert(principal.user_id, book_id, rating)
            .await?;
        tracing::info!("User {} scored book {} with {}", principal.user_id, book_id, rating);
        Ok(score)
    }
}
