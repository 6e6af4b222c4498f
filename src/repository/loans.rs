//! Loans repository for database operations
//!
//! Borrow and return load the book's lending state with the book row locked,
//! apply the transition in memory and write flag, loan and borrowers back in
//! the same transaction. A borrow also opens the borrower's reading progress
//! there.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Lending, Loan, LoanDetails, LoanWindow, Transition},
};

macro_rules! details_select {
    () => {
        r#"
        SELECT l.id, l.book_id, b.title, l.start_date, l.end_date,
               ARRAY(
                   SELECT lb.user_id FROM loan_borrowers lb
                   WHERE lb.loan_id = l.id
                   ORDER BY lb.user_id
               ) AS borrowers,
               b.on_loan,
               (b.on_loan AND l.end_date < NOW()) AS is_overdue
        FROM loans l
        JOIN books b ON b.id = l.book_id
        "#
    };
}

const DETAILS_BY_BOOK: &str = concat!(details_select!(), " WHERE l.book_id = $1");

const DETAILS_BY_BORROWER: &str = concat!(
    details_select!(),
    r#"
    WHERE EXISTS (
        SELECT 1 FROM loan_borrowers lb
        WHERE lb.loan_id = l.id AND lb.user_id = $1
    )
    ORDER BY l.end_date
    "#
);

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Active loans where the user is one of the borrowers
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(DETAILS_BY_BORROWER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Borrow a book for a user
    pub async fn borrow(
        &self,
        book_id: i32,
        user_id: i32,
        requested_end: Option<DateTime<Utc>>,
    ) -> AppResult<LoanDetails> {
        let mut tx = self.pool.begin().await?;

        let mut lending = Self::lock_lending(&mut tx, book_id).await?;
        lending.borrow(user_id, Utc::now(), requested_end)?;
        Self::store_lending(&mut tx, &lending).await?;
        Self::start_reading(&mut tx, user_id, book_id).await?;

        let details = Self::details(&mut *tx, book_id).await?;
        tx.commit().await?;

        tracing::info!(
            "Book {} borrowed by user {} until {}",
            book_id,
            user_id,
            details.end_date
        );
        Ok(details)
    }

    /// Return a book on behalf of one of its borrowers
    pub async fn give_back(&self, book_id: i32, user_id: i32) -> AppResult<(Transition, LoanDetails)> {
        let mut tx = self.pool.begin().await?;

        let mut lending = Self::lock_lending(&mut tx, book_id).await?;
        let transition = lending.give_back(user_id)?;
        if transition != Transition::Unchanged {
            Self::store_lending(&mut tx, &lending).await?;
        }

        let details = Self::details(&mut *tx, book_id).await?;
        tx.commit().await?;

        match transition {
            Transition::Returned { loan_ended } => tracing::info!(
                "Book {} returned by user {} (loan ended: {})",
                book_id,
                user_id,
                loan_ended
            ),
            _ => tracing::debug!("User {} is not a borrower of book {}", user_id, book_id),
        }
        Ok((transition, details))
    }

    async fn lock_lending(tx: &mut Transaction<'_, Postgres>, book_id: i32) -> AppResult<Lending> {
        let on_loan: bool = sqlx::query_scalar("SELECT on_loan FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let loan = sqlx::query_as::<_, Loan>(
            "SELECT id, book_id, start_date, end_date FROM loans WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_optional(&mut **tx)
        .await?;

        let borrowers: Vec<i32> = match &loan {
            Some(loan) => {
                sqlx::query_scalar("SELECT user_id FROM loan_borrowers WHERE loan_id = $1")
                    .bind(loan.id)
                    .fetch_all(&mut **tx)
                    .await?
            }
            None => Vec::new(),
        };

        Ok(Lending::new(
            book_id,
            on_loan,
            loan.map(LoanWindow::from),
            borrowers.into_iter().collect(),
        ))
    }

    async fn store_lending(tx: &mut Transaction<'_, Postgres>, lending: &Lending) -> AppResult<()> {
        sqlx::query("UPDATE books SET on_loan = $1 WHERE id = $2")
            .bind(lending.on_loan)
            .bind(lending.book_id)
            .execute(&mut **tx)
            .await?;

        let Some(window) = &lending.window else {
            return Ok(());
        };

        let loan_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO loans (book_id, start_date, end_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (book_id) DO UPDATE
                SET start_date = EXCLUDED.start_date, end_date = EXCLUDED.end_date
            RETURNING id
            "#,
        )
        .bind(lending.book_id)
        .bind(window.start_date)
        .bind(window.end_date)
        .fetch_one(&mut **tx)
        .await?;

        let borrowers: Vec<i32> = lending.borrowers.iter().copied().collect();

        sqlx::query("DELETE FROM loan_borrowers WHERE loan_id = $1 AND NOT (user_id = ANY($2))")
            .bind(loan_id)
            .bind(&borrowers)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO loan_borrowers (loan_id, user_id)
            SELECT $1, UNNEST($2::int4[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(loan_id)
        .bind(&borrowers)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Empty progress record for a new borrower, kept if one already exists
    async fn start_reading(tx: &mut Transaction<'_, Postgres>, user_id: i32, book_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reading_progress (user_id, book_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, book_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn details<'e, E>(executor: E, book_id: i32) -> AppResult<LoanDetails>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LoanDetails>(DETAILS_BY_BOOK)
            .bind(book_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No loan found for book {}", book_id)))
    }
}
