//! Loan endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::loan::{BorrowBook, LoanDetails, Transition},
};

use super::AuthenticatedUser;

/// Return response with loan details
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// "returned" when the caller left the borrower set, "not_borrower" otherwise
    pub status: String,
    /// Whether the book is available again
    pub loan_ended: bool,
    pub loan: LoanDetails,
}

/// Loans the caller currently takes part in
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's active loans", body = Vec<LoanDetails>)
    )
)]
pub async fn get_my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.get_user_loans(&principal).await?;
    Ok(Json(loans))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body(content = BorrowBook, description = "Optional explicit end date"),
    responses(
        (status = 201, description = "Book borrowed", body = LoanDetails),
        (status = 400, description = "End date before start"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book already on loan")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(book_id): Path<i32>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let request = parse_borrow_request(&body)?;

    let loan = state
        .services
        .loans
        .borrow(book_id, &principal, request.end_date)
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// An empty body borrows with the default period; anything else must be a
/// well-formed `BorrowBook`.
fn parse_borrow_request(body: &[u8]) -> AppResult<BorrowBook> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BorrowBook::default());
    }
    let Json(request) =
        Json::<BorrowBook>::from_bytes(body).map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    Ok(request)
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Return processed", body = ReturnResponse),
        (status = 404, description = "Book or loan not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let (transition, loan) = state.services.loans.give_back(book_id, &principal).await?;

    let (status, loan_ended) = match transition {
        Transition::Returned { loan_ended } => ("returned", loan_ended),
        _ => ("not_borrower", !loan.on_loan),
    };

    Ok(Json(ReturnResponse {
        status: status.to_string(),
        loan_ended,
        loan,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_uses_default_period() {
        assert!(parse_borrow_request(b"").unwrap().end_date.is_none());
        assert!(parse_borrow_request(b" \n").unwrap().end_date.is_none());
        assert!(parse_borrow_request(b"{}").unwrap().end_date.is_none());
    }

    #[test]
    fn test_explicit_end_date_parsed() {
        let request = parse_borrow_request(br#"{"end_date": "2024-05-01T00:00:00Z"}"#).unwrap();
        assert_eq!(
            request.end_date.map(|d| d.to_rfc3339()).as_deref(),
            Some("2024-05-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_malformed_end_date_rejected() {
        match parse_borrow_request(br#"{"end_date": "next tuesday"}"#) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("end_date"), "{}", msg),
            other => panic!("expected validation error, got ok = {}", other.is_ok()),
        }
        assert!(matches!(parse_borrow_request(b"not json"), Err(AppError::Validation(_))));
    }
}
