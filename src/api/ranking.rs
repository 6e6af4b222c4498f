//! Ranking endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::ranking::{AnnualRanking, RankingEntry, RankingQuery},
};

use super::AuthenticatedUser;

/// Top 5 books by mean score
#[utoipa::path(
    get,
    path = "/ranking",
    tag = "ranking",
    security(("bearer_auth" = [])),
    params(RankingQuery),
    responses(
        (status = 200, description = "Best rated books", body = Vec<RankingEntry>)
    )
)]
pub async fn get_ranking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Query(query): Query<RankingQuery>,
) -> AppResult<Json<Vec<RankingEntry>>> {
    let ranking = state.services.ranking.top(query.year).await?;
    Ok(Json(ranking))
}

/// Archive the ranking of a year
#[utoipa::path(
    post,
    path = "/ranking/{year}/archive",
    tag = "ranking",
    security(("bearer_auth" = [])),
    params(
        ("year" = i32, Path, description = "Year")
    ),
    responses(
        (status = 200, description = "Archived ranking", body = Vec<AnnualRanking>),
        (status = 400, description = "Invalid year")
    )
)]
pub async fn archive_ranking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path(year): Path<i32>,
) -> AppResult<Json<Vec<AnnualRanking>>> {
    let ranking = state.services.ranking.archive_year(year).await?;
    Ok(Json(ranking))
}

/// Read an archived yearly ranking
#[utoipa::path(
    get,
    path = "/ranking/{year}/archive",
    tag = "ranking",
    security(("bearer_auth" = [])),
    params(
        ("year" = i32, Path, description = "Year")
    ),
    responses(
        (status = 200, description = "Archived ranking", body = Vec<AnnualRanking>),
        (status = 400, description = "Invalid year")
    )
)]
pub async fn get_archived_ranking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path(year): Path<i32>,
) -> AppResult<Json<Vec<AnnualRanking>>> {
    let ranking = state.services.ranking.archived(year).await?;
    Ok(Json(ranking))
}
