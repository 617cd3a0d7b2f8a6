use async_trait::async_trait;

use reelshelf_model::{Loan, Movie, MovieID, UserID};

use crate::{
    error::Result,
    ledger::{BorrowOutcome, LedgerReceipt, ReturnOutcome},
};

/// The lending ledger.
///
/// `borrow` and `return_movie` each run as a single transaction that locks
/// the user row and then the movie row, applies the transition from
/// [`crate::ledger`] and writes all three records (user, movie, loan).
#[async_trait]
pub trait LoansRepository: Send + Sync {
    async fn borrow(
        &self,
        user_id: UserID,
        movie_id: MovieID,
    ) -> Result<LedgerReceipt<BorrowOutcome>>;
    async fn return_movie(
        &self,
        user_id: UserID,
        movie_id: MovieID,
    ) -> Result<LedgerReceipt<ReturnOutcome>>;
    async fn is_borrowing(&self, user_id: UserID, movie_id: MovieID) -> Result<bool>;
    /// Movies currently held by `user_id`, most recent loan first.
    async fn borrowed_movies(&self, user_id: UserID) -> Result<Vec<Movie>>;
    async fn loans_for_user(&self, user_id: UserID) -> Result<Vec<Loan>>;
    async fn count_loans_for_movie(&self, movie_id: MovieID) -> Result<u64>;
}
