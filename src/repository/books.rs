//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::book::{Book, NewBook},
};

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.author, b.edition, b.file_ref, b.owner_id, b.total_pages,
           b.isbn, b.category_id, c.name AS category_name, b.uploaded_at, b.on_loan
    FROM books b
    LEFT JOIN categories c ON c.id = b.category_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Books owned by a user
    pub async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "{} WHERE b.owner_id = $1 ORDER BY b.uploaded_at DESC, b.id DESC",
            BOOK_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Books that can be borrowed right now
    pub async fn list_available(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "{} WHERE b.on_loan = FALSE ORDER BY b.title, b.id",
            BOOK_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Check whether an ISBN is already used by another book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int IS NULL OR id <> $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new book
    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, edition, file_ref, owner_id, total_pages, isbn, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.edition)
        .bind(&book.file_ref)
        .bind(book.owner_id)
        .bind(book.total_pages)
        .bind(&book.isbn)
        .bind(book.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A book with this ISBN already exists"))?;

        self.get_by_id(id).await
    }

    /// Fill in catalog metadata; fields already set are kept
    pub async fn fill_metadata(
        &self,
        id: i32,
        isbn: Option<&str>,
        category_id: Option<i32>,
    ) -> AppResult<Book> {
        sqlx::query(
            r#"
            UPDATE books
            SET isbn = COALESCE(isbn, $2),
                category_id = COALESCE(category_id, $3)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(isbn)
        .bind(category_id)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A book with this ISBN already exists"))?;

        self.get_by_id(id).await
    }
}
