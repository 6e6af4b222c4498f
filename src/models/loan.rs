//! Loan model and the lending state machine

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Fixed lending window, roughly five months
pub const LOAN_PERIOD_DAYS: i64 = 150;

/// Default end of a loan that started at `start`
pub fn due_date(start: DateTime<Utc>) -> DateTime<Utc> {
    start + Duration::days(LOAN_PERIOD_DAYS)
}

/// Loan row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Loan with its borrowers for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub borrowers: Vec<i32>,
    pub on_loan: bool,
    pub is_overdue: bool,
}

/// Borrow request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BorrowBook {
    /// Explicit end of the loan; defaults to 150 days after the start
    pub end_date: Option<DateTime<Utc>>,
}

/// Start and end of a loan record, `id` is `None` until first persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanWindow {
    pub id: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl LoanWindow {
    /// Open a window at `start`, computing the end date when none is requested
    pub fn open(start: DateTime<Utc>, requested_end: Option<DateTime<Utc>>) -> AppResult<Self> {
        let end_date = requested_end.unwrap_or_else(|| due_date(start));
        if end_date <= start {
            return Err(AppError::Validation(
                "end_date: Loan must end after it starts".to_string(),
            ));
        }
        Ok(Self {
            id: None,
            start_date: start,
            end_date,
        })
    }
}

impl From<Loan> for LoanWindow {
    fn from(loan: Loan) -> Self {
        Self {
            id: Some(loan.id),
            start_date: loan.start_date,
            end_date: loan.end_date,
        }
    }
}

/// Outcome of a lending transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Borrowed,
    /// The caller left the borrower set; `loan_ended` when nobody is left
    Returned { loan_ended: bool },
    /// The caller was not a borrower
    Unchanged,
}

/// Lending state of a single book: its on-loan flag, loan record and borrowers.
///
/// Both transitions keep `on_loan == !borrowers.is_empty()`. The repository
/// loads this aggregate with the book row locked and writes it back in the
/// same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lending {
    pub book_id: i32,
    pub on_loan: bool,
    pub window: Option<LoanWindow>,
    pub borrowers: BTreeSet<i32>,
}

impl Lending {
    pub fn new(book_id: i32, on_loan: bool, window: Option<LoanWindow>, borrowers: BTreeSet<i32>) -> Self {
        Self {
            book_id,
            on_loan,
            window,
            borrowers,
        }
    }

    pub fn is_on_loan(&self) -> bool {
        self.on_loan || !self.borrowers.is_empty()
    }

    /// available -> on_loan
    ///
    /// An existing loan record is reused and its window restarts at `now`.
    pub fn borrow(
        &mut self,
        user_id: i32,
        now: DateTime<Utc>,
        requested_end: Option<DateTime<Utc>>,
    ) -> AppResult<Transition> {
        if self.is_on_loan() {
            return Err(AppError::BusinessRule(format!(
                "Book {} is already on loan",
                self.book_id
            )));
        }

        let mut window = LoanWindow::open(now, requested_end)?;
        window.id = self.window.as_ref().and_then(|w| w.id);
        self.window = Some(window);
        self.borrowers.insert(user_id);
        self.sync_flag();
        Ok(Transition::Borrowed)
    }

    /// on_loan -> available once the last borrower returns the book
    pub fn give_back(&mut self, user_id: i32) -> AppResult<Transition> {
        if self.window.is_none() {
            return Err(AppError::NotFound(format!(
                "No loan found for book {}",
                self.book_id
            )));
        }

        if !self.borrowers.remove(&user_id) {
            return Ok(Transition::Unchanged);
        }

        self.sync_flag();
        Ok(Transition::Returned {
            loan_ended: self.borrowers.is_empty(),
        })
    }

    fn sync_flag(&mut self) {
        self.on_loan = !self.borrowers.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn available() -> Lending {
        Lending::new(1, false, None, BTreeSet::new())
    }

    #[test]
    fn test_due_date_is_150_days_later() {
        assert_eq!(
            due_date(now()),
            Utc.with_ymd_and_hms(2024, 7, 29, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_window_defaults_end_date() {
        let window = LoanWindow::open(now(), None).unwrap();
        assert_eq!(window.end_date - window.start_date, Duration::days(LOAN_PERIOD_DAYS));
    }

    #[test]
    fn test_window_keeps_explicit_end_date() {
        let end = now() + Duration::days(14);
        assert_eq!(LoanWindow::open(now(), Some(end)).unwrap().end_date, end);
    }

    #[test]
    fn test_window_rejects_end_before_start() {
        let result = LoanWindow::open(now(), Some(now() - Duration::days(1)));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_borrow_then_return() {
        let mut lending = available();

        assert_eq!(lending.borrow(10, now(), None).unwrap(), Transition::Borrowed);
        assert!(lending.on_loan);
        assert_eq!(lending.borrowers, BTreeSet::from([10]));

        assert_eq!(
            lending.give_back(10).unwrap(),
            Transition::Returned { loan_ended: true }
        );
        assert!(!lending.on_loan);
        assert!(lending.borrowers.is_empty());
        // the loan record survives the return
        assert!(lending.window.is_some());
    }

    #[test]
    fn test_borrow_rejected_when_on_loan() {
        let mut lending = available();
        lending.borrow(10, now(), None).unwrap();

        let result = lending.borrow(11, now(), None);
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
        assert_eq!(lending.borrowers, BTreeSet::from([10]));
    }

    #[test]
    fn test_borrow_rejected_on_inconsistent_flag() {
        let mut lending = Lending::new(1, false, None, BTreeSet::from([3]));
        assert!(lending.borrow(10, now(), None).is_err());
    }

    #[test]
    fn test_borrow_reuses_loan_record() {
        let old = Loan {
            id: 77,
            book_id: 1,
            start_date: now() - Duration::days(400),
            end_date: now() - Duration::days(250),
        };
        let mut lending = Lending::new(1, false, Some(old.into()), BTreeSet::new());

        lending.borrow(10, now(), None).unwrap();

        let window = lending.window.unwrap();
        assert_eq!(window.id, Some(77));
        assert_eq!(window.start_date, now());
        assert_eq!(window.end_date, due_date(now()));
    }

    #[test]
    fn test_return_by_non_borrower_is_noop() {
        let mut lending = available();
        lending.borrow(10, now(), None).unwrap();
        let before = lending.clone();

        assert_eq!(lending.give_back(99).unwrap(), Transition::Unchanged);
        assert_eq!(lending, before);
    }

    #[test]
    fn test_return_without_loan_is_not_found() {
        let mut lending = available();
        assert!(matches!(lending.give_back(10), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_flag_stays_set_while_borrowers_remain() {
        let mut lending = Lending::new(
            1,
            true,
            Some(LoanWindow::open(now(), None).unwrap()),
            BTreeSet::from([10, 11]),
        );

        assert_eq!(
            lending.give_back(10).unwrap(),
            Transition::Returned { loan_ended: false }
        );
        assert!(lending.on_loan);
        assert_eq!(lending.give_back(11).unwrap(), Transition::Returned { loan_ended: true });
        assert!(!lending.on_loan);
    }
}
