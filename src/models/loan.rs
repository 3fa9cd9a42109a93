//! Loan (borrowing history) model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Fixed loan period applied at borrow time
pub const LOAN_PERIOD_DAYS: i64 = 6;

/// Due date for a loan starting at `date_borrowed`
pub fn due_date_for(date_borrowed: DateTime<Utc>) -> DateTime<Utc> {
    date_borrowed + Duration::days(LOAN_PERIOD_DAYS)
}

/// Loan record from database.
///
/// The book fields are a copy taken when the loan was opened, so later catalog
/// edits or deletion never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub book_title: String,
    pub book_author: String,
    pub book_description: String,
    pub date_borrowed: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned: bool,
    pub returned_date: Option<DateTime<Utc>>,
}

impl Loan {
    /// An open loan past its due date
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.returned && now > self.due_date
    }
}

/// Loan with derived state for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub book_title: String,
    pub book_author: String,
    pub book_description: String,
    pub date_borrowed: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned: bool,
    pub returned_date: Option<DateTime<Utc>>,
    pub is_overdue: bool,
}

impl From<Loan> for LoanDetails {
    fn from(loan: Loan) -> Self {
        let is_overdue = loan.is_overdue(Utc::now());
        LoanDetails {
            id: loan.id,
            book_id: loan.book_id,
            user_id: loan.user_id,
            book_title: loan.book_title,
            book_author: loan.book_author,
            book_description: loan.book_description,
            date_borrowed: loan.date_borrowed,
            due_date: loan.due_date,
            returned: loan.returned,
            returned_date: loan.returned_date,
            is_overdue,
        }
    }
}

/// Borrowing history query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    /// `false` restricts the history to books not yet returned
    pub returned: Option<bool>,
}

impl HistoryQuery {
    pub fn open_only(&self) -> bool {
        self.returned == Some(false)
    }
}
