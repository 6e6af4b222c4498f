//! Book catalog service: creation, listings and metadata enrichment

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        book::{normalize_isbn, Book, BookDetails, CreateBook, LibraryView, NewBook},
        category::Category,
        Principal,
    },
    repository::Repository,
    services::openlibrary::{CatalogLookup, CatalogMatch},
};

/// Ask the catalog for whatever the book is missing.
///
/// With an ISBN only the subject is looked up; without one the catalog is
/// searched by title, author and edition. Never fails: no answer means no
/// enrichment.
pub async fn enrich(
    lookup: &dyn CatalogLookup,
    isbn: Option<&str>,
    title: &str,
    author: &str,
    edition: &str,
) -> CatalogMatch {
    match isbn {
        Some(isbn) => CatalogMatch {
            isbn: None,
            subject: lookup.subject_for_isbn(isbn).await,
        },
        None => lookup
            .search(title, author, edition)
            .await
            .map(|found| CatalogMatch {
                isbn: found.isbn.as_deref().and_then(normalize_isbn),
                subject: found.subject,
            })
            .unwrap_or_default(),
    }
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    lookup: Arc<dyn CatalogLookup>,
}

impl CatalogService {
    pub fn new(repository: Repository, lookup: Arc<dyn CatalogLookup>) -> Self {
        Self { repository, lookup }
    }

    /// Books owned by the caller with the caller's scores and progress
    pub async fn library(&self, principal: &Principal) -> AppResult<LibraryView> {
        Ok(LibraryView {
            books: self.repository.books.list_by_owner(principal.user_id).await?,
            scores: self.repository.scores.list_by_user(principal.user_id).await?,
            progress: self.repository.progress.list_by_user(principal.user_id).await?,
        })
    }

    /// Books not currently on loan
    pub async fn list_available(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_available().await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Book with the caller's own score and progress
    pub async fn get_details(&self, id: i32, principal: &Principal) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let score = self.repository.scores.find(principal.user_id, id).await?;
        let progress = self.repository.progress.find(principal.user_id, id).await?;

        Ok(BookDetails {
            is_owner: principal.is(book.owner_id),
            book,
            score,
            progress,
        })
    }

    /// Create a book owned by the caller, enriching ISBN/category best-effort
    pub async fn create_book(&self, request: CreateBook, principal: &Principal) -> AppResult<Book> {
        let mut book = NewBook::from_request(request, principal.user_id);

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, None).await? {
                return Err(crate::error::AppError::Conflict(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }

        if let Some(category_id) = book.category_id {
            self.repository.categories.get_by_id(category_id).await?;
        }

        if book.category_id.is_none() || book.isbn.is_none() {
            let found = enrich(
                self.lookup.as_ref(),
                book.isbn.as_deref(),
                &book.title,
                &book.author,
                &book.edition,
            )
            .await;
            let (isbn, category_id) = self.resolve(found, None, book.category_id.is_none()).await?;
            book.isbn = book.isbn.or(isbn);
            book.category_id = book.category_id.or(category_id);
        }

        let created = self.repository.books.create(&book).await?;
        tracing::info!(
            "Book {} created by user {} (isbn: {:?}, category: {:?})",
            created.id,
            principal.user_id,
            created.isbn,
            created.category_name
        );
        Ok(created)
    }

    /// Try to fill in the ISBN (and category) of a book that has none yet
    pub async fn enrich_existing(&self, book: Book) -> AppResult<Book> {
        if book.isbn.is_some() {
            return Ok(book);
        }

        let found = enrich(self.lookup.as_ref(), None, &book.title, &book.author, &book.edition).await;
        if found.is_empty() {
            tracing::debug!("No catalog match for book {}", book.id);
            return Ok(book);
        }

        let (isbn, category_id) = self
            .resolve(found, Some(book.id), book.category_id.is_none())
            .await?;
        if isbn.is_none() && category_id.is_none() {
            return Ok(book);
        }

        self.repository
            .books
            .fill_metadata(book.id, isbn.as_deref(), category_id)
            .await
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }

    pub async fn get_or_create_category(&self, name: &str) -> AppResult<Category> {
        self.repository.categories.get_or_create(name.trim()).await
    }

    /// Turn a catalog answer into storable values: drop an ISBN another book
    /// already uses and, when the book still needs one, get-or-create the
    /// subject as a category.
    async fn resolve(
        &self,
        found: CatalogMatch,
        book_id: Option<i32>,
        needs_category: bool,
    ) -> AppResult<(Option<String>, Option<i32>)> {
        let isbn = match found.isbn {
            Some(isbn) if self.repository.books.isbn_exists(&isbn, book_id).await? => {
                tracing::warn!("Catalog returned ISBN {} already used by another book, ignoring", isbn);
                None
            }
            other => other,
        };

        let category_id = match found.subject {
            Some(subject) if needs_category => Some(self.repository.categories.get_or_create(&subject).await?.id),
            _ => None,
        };

        Ok((isbn, category_id))
    }
}
