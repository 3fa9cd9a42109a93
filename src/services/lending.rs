//! Lending service: borrow, return and loan history

use crate::{
    error::AppResult,
    models::{loan::Loan, session::Caller},
    repository::Repository,
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
}

impl LendingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book on behalf of the caller
    pub async fn borrow_book(&self, book_id: i64, caller: &Caller) -> AppResult<Loan> {
        let loan = self.repository.loans.borrow(book_id, caller.user_id).await?;
        tracing::info!(
            "Book {} borrowed by user {} (loan {}, due {})",
            book_id,
            caller.user_id,
            loan.id,
            loan.due_date
        );
        Ok(loan)
    }

    /// Return a borrowed book
    pub async fn return_book(&self, book_id: i64) -> AppResult<Loan> {
        let loan = self.repository.loans.return_book(book_id).await?;
        tracing::info!("Book {} returned (loan {})", book_id, loan.id);
        Ok(loan)
    }

    /// Loans of the caller, most recent first
    pub async fn user_loan_history(&self, caller: &Caller, open_only: bool) -> AppResult<Vec<Loan>> {
        self.repository.loans.history_for(caller.user_id, open_only).await
    }

    /// Every loan not yet returned
    pub async fn open_loans(&self) -> AppResult<Vec<Loan>> {
        self.repository.loans.open_loans().await
    }
}
