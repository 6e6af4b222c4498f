//! Data models for Bookshelf

pub mod book;
pub mod category;
pub mod loan;
pub mod principal;
pub mod progress;
pub mod ranking;
pub mod score;

use validator::ValidationError;

// Re-export commonly used types
pub use book::{Book, BookDetails, CreateBook, LibraryView, NewBook};
pub use category::Category;
pub use loan::{Lending, Loan, LoanDetails, Transition};
pub use principal::Principal;
pub use progress::ReadingProgress;
pub use ranking::{AnnualRanking, RankingEntry};
pub use score::Score;

/// Reject strings that are empty once surrounding whitespace is trimmed
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}
