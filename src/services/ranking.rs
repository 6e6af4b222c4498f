//! Ranking aggregation

use chrono::{Datelike, Utc};

use crate::{
    error::{AppError, AppResult},
    models::ranking::{top_ranked, AnnualRanking, RankingEntry, RANKING_SIZE},
    repository::Repository,
};

#[derive(Clone)]
pub struct RankingService {
    repository: Repository,
}

impl RankingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Top books by mean score, computed on every call
    pub async fn top(&self, year: Option<i32>) -> AppResult<Vec<RankingEntry>> {
        let entries = self.repository.scores.mean_scores(year, RANKING_SIZE).await?;
        Ok(top_ranked(entries, RANKING_SIZE))
    }

    /// Store the ranking of `year` as computed now
    pub async fn archive_year(&self, year: i32) -> AppResult<Vec<AnnualRanking>> {
        check_year(year)?;
        let entries = self.top(Some(year)).await?;
        tracing::info!("Archiving {} ranking ({} books)", year, entries.len());
        self.repository.rankings.replace_year(year, &entries).await
    }

    pub async fn archived(&self, year: i32) -> AppResult<Vec<AnnualRanking>> {
        check_year(year)?;
        self.repository.rankings.get_year(year).await
    }
}

fn check_year(year: i32) -> AppResult<()> {
    let current = Utc::now().year();
    if !(1900..=current).contains(&year) {
        return Err(AppError::Validation(format!(
            "year: Year must be between 1900 and {}",
            current
        )));
    }
    Ok(())
}
