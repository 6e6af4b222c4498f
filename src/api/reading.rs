//! Score and reading progress endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        progress::{ReadingProgress, UpdateProgress},
        score::{Score, ScoreBook},
    },
};

use super::AuthenticatedUser;

/// Score a book (one score per user and book)
#[utoipa::path(
    put,
    path = "/books/{id}/score",
    tag = "reading",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = ScoreBook,
    responses(
        (status = 200, description = "Score stored", body = Score),
        (status = 400, description = "Rating outside 1-10"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn score_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<ScoreBook>,
) -> AppResult<Json<Score>> {
    request.validate()?;

    let score = state
        .services
        .reading
        .score(book_id, &principal, request.rating)
        .await?;
    Ok(Json(score))
}

/// Update reading progress
#[utoipa::path(
    put,
    path = "/books/{id}/progress",
    tag = "reading",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateProgress,
    responses(
        (status = 200, description = "Progress stored", body = ReadingProgress),
        (status = 400, description = "Invalid page"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_progress(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<UpdateProgress>,
) -> AppResult<Json<ReadingProgress>> {
    request.validate()?;

    let progress = state
        .services
        .reading
        .update_progress(book_id, &principal, request.current_page)
        .await?;
    Ok(Json(progress))
}
