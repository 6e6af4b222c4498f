//! Loan management service

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{LoanDetails, Transition},
        Principal,
    },
    repository::Repository,
    services::catalog::CatalogService,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    catalog: CatalogService,
}

impl LoansService {
    pub fn new(repository: Repository, catalog: CatalogService) -> Self {
        Self { repository, catalog }
    }

    /// Loans the caller is currently a borrower of
    pub async fn get_user_loans(&self, principal: &Principal) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_user_loans(principal.user_id).await
    }

    /// Borrow a book (available -> on_loan)
    pub async fn borrow(
        &self,
        book_id: i32,
        principal: &Principal,
        end_date: Option<DateTime<Utc>>,
    ) -> AppResult<LoanDetails> {
        let book = self.catalog.get_book(book_id).await?;
        if book.on_loan {
            return Err(AppError::BusinessRule(format!(
                "Book {} is already on loan",
                book_id
            )));
        }

        // Best effort: a catalog problem must not block the loan
        if let Err(e) = self.catalog.enrich_existing(book).await {
            tracing::warn!("Enrichment of book {} before loan failed: {}", book_id, e);
        }

        self.repository
            .loans
            .borrow(book_id, principal.user_id, end_date)
            .await
    }

    /// Return a book (on_loan -> available once the last borrower returns it)
    pub async fn give_back(&self, book_id: i32, principal: &Principal) -> AppResult<(Transition, LoanDetails)> {
        self.repository.loans.give_back(book_id, principal.user_id).await
    }
}
