//! Data models for Hello Books

pub mod book;
pub mod loan;
pub mod session;
pub mod user;

// Re-export commonly used types
pub use book::{Book, CreateBook, UpdateBook};
pub use loan::{Loan, LoanDetails};
pub use session::{ActiveToken, Caller, TokenClaims};
pub use user::{CreateUser, User};
