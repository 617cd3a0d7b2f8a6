use chrono::{DateTime, Utc};

use crate::ids::{MovieID, UserID};

/// An active borrow of one movie by one user.
///
/// The `(user_id, movie_id)` pair is the identity of a loan, so a user can
/// hold at most one copy of a given movie at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loan {
    pub user_id: UserID,
    pub movie_id: MovieID,
    pub borrowed_at: DateTime<Utc>,
}

impl Loan {
    pub fn new(user_id: UserID, movie_id: MovieID) -> Self {
        Self {
            user_id,
            movie_id,
            borrowed_at: Utc::now(),
        }
    }
}
