//! Open Library client for ISBN and category lookups
//!
//! Every failure (network, status, payload, empty result) is reported as
//! "no match" so callers never abort on a catalog problem.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
};

/// What the catalog knows about a book
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogMatch {
    pub isbn: Option<String>,
    pub subject: Option<String>,
}

impl CatalogMatch {
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none() && self.subject.is_none()
    }
}

/// Best-effort metadata source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// First subject listed for an ISBN
    async fn subject_for_isbn(&self, isbn: &str) -> Option<String>;

    /// First search result for a title/author/edition query
    async fn search(&self, title: &str, author: &str, edition: &str) -> Option<CatalogMatch>;
}

/// Lookup used when the catalog is disabled in configuration
pub struct NoCatalog;

#[async_trait]
impl CatalogLookup for NoCatalog {
    async fn subject_for_isbn(&self, _isbn: &str) -> Option<String> {
        None
    }

    async fn search(&self, _title: &str, _author: &str, _edition: &str) -> Option<CatalogMatch> {
        None
    }
}

#[derive(Debug, Error)]
enum LookupError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),
}

#[derive(Debug, Deserialize)]
struct BookData {
    #[serde(default)]
    subjects: Vec<Subject>,
}

#[derive(Debug, Deserialize)]
struct Subject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    isbn: Vec<String>,
    #[serde(default)]
    subject: Vec<String>,
}

#[derive(Clone)]
pub struct OpenLibraryClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(config: &CatalogConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build catalog client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, LookupError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CatalogLookup for OpenLibraryClient {
    async fn subject_for_isbn(&self, isbn: &str) -> Option<String> {
        let key = format!("ISBN:{}", isbn);
        tracing::debug!("Catalog lookup by {}", key);

        match self
            .fetch::<HashMap<String, BookData>>(
                "/api/books",
                &[("bibkeys", key.as_str()), ("format", "json"), ("jscmd", "data")],
            )
            .await
        {
            Ok(data) => first_subject(&key, data),
            Err(e) => {
                tracing::warn!("Catalog lookup for {} failed: {}", key, e);
                None
            }
        }
    }

    async fn search(&self, title: &str, author: &str, edition: &str) -> Option<CatalogMatch> {
        tracing::debug!("Catalog search: title={:?} author={:?} edition={:?}", title, author, edition);

        let mut query = vec![("title", title), ("author", author)];
        if !edition.is_empty() {
            query.push(("q", edition));
        }

        match self.fetch::<SearchResponse>("/search.json", &query).await {
            Ok(response) => first_match(response),
            Err(e) => {
                tracing::warn!("Catalog search for {:?} failed: {}", title, e);
                None
            }
        }
    }
}

fn first_subject(key: &str, mut data: HashMap<String, BookData>) -> Option<String> {
    data.remove(key)?
        .subjects
        .into_iter()
        .map(|s| s.name)
        .find(|name| !name.trim().is_empty())
}

fn first_match(response: SearchResponse) -> Option<CatalogMatch> {
    let doc = response.docs.into_iter().next()?;
    let found = CatalogMatch {
        isbn: doc.isbn.into_iter().next(),
        subject: doc.subject.into_iter().next(),
    };
    if found.is_empty() {
        None
    } else {
        Some(found)
    }
}
