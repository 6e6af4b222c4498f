//! Ranking rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Number of books in a ranking
pub const RANKING_SIZE: usize = 5;

/// Mean score of one book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RankingEntry {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub mean_score: f64,
    pub votes: i64,
}

/// Archived ranking row for one year
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AnnualRanking {
    pub year: i32,
    pub position: i16,
    pub book_id: i32,
    pub title: String,
    pub mean_score: f64,
    pub votes: i64,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RankingQuery {
    /// Only count scores given during this year
    pub year: Option<i32>,
}

/// Best `limit` books by descending mean score, ties by ascending book id.
///
/// Books without votes never rank.
pub fn top_ranked(mut entries: Vec<RankingEntry>, limit: usize) -> Vec<RankingEntry> {
    entries.retain(|e| e.votes > 0);
    entries.sort_by(|a, b| {
        b.mean_score
            .total_cmp(&a.mean_score)
            .then_with(|| a.book_id.cmp(&b.book_id))
    });
    entries.truncate(limit);
    entries
}
