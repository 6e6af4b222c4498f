//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;
use super::progress::ReadingProgress;
use super::score::Score;

pub const DEFAULT_AUTHOR: &str = "Unknown author";
pub const DEFAULT_FILE_REF: &str = "books/default.pdf";

/// Book as stored, joined with its category name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub edition: String,
    /// Opaque handle to the uploaded book file
    pub file_ref: String,
    pub owner_id: Option<i32>,
    pub total_pages: i32,
    pub isbn: Option<String>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub on_loan: bool,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    /// Defaults to "Unknown author"
    #[validate(length(max = 200, message = "Author must be at most 200 characters"))]
    pub author: Option<String>,
    #[validate(length(max = 100, message = "Edition must be at most 100 characters"))]
    pub edition: String,
    pub file_ref: Option<String>,
    #[validate(range(min = 0, message = "Total pages cannot be negative"))]
    pub total_pages: i32,
    #[validate(length(max = 20, message = "ISBN must be at most 20 characters"))]
    pub isbn: Option<String>,
    pub category_id: Option<i32>,
}

/// Fully resolved book ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub edition: String,
    pub file_ref: String,
    pub owner_id: i32,
    pub total_pages: i32,
    pub isbn: Option<String>,
    pub category_id: Option<i32>,
}

impl NewBook {
    /// Apply defaults and normalization to a creation request
    pub fn from_request(request: CreateBook, owner_id: i32) -> Self {
        let author = request
            .author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        let file_ref = request
            .file_ref
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_REF.to_string());

        Self {
            title: request.title.trim().to_string(),
            author,
            edition: request.edition.trim().to_string(),
            file_ref,
            owner_id,
            total_pages: request.total_pages,
            isbn: request.isbn.as_deref().and_then(normalize_isbn),
            category_id: request.category_id,
        }
    }
}

/// Book detail as seen by one reader
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub book: Book,
    pub is_owner: bool,
    pub score: Option<Score>,
    pub progress: Option<ReadingProgress>,
}

/// The caller's own shelf
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LibraryView {
    pub books: Vec<Book>,
    pub scores: Vec<Score>,
    pub progress: Vec<ReadingProgress>,
}

/// Strip separators from an ISBN; `None` when nothing usable is left
pub fn normalize_isbn(isbn: &str) -> Option<String> {
    let normalized: String = isbn
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
