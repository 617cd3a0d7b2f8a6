//! Borrow/return transitions over a (user, movie) pair.
//!
//! Each pair is either `NotBorrowed` or `Borrowed`. The functions here
//! mutate the entities in memory only; repositories call them inside a
//! transaction holding locks on both rows and then persist the result.
//!
//! Re-entrant calls are not errors: borrowing a movie already held reports
//! [`BorrowOutcome::AlreadyBorrowed`], returning one not held reports
//! [`ReturnOutcome::NotBorrowed`], and neither touches any counter.

use reelshelf_model::{Loan, Movie, User};
use serde::Serialize;

use crate::error::{Result, ShelfError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BorrowOutcome {
    Borrowed { loan: Loan },
    AlreadyBorrowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReturnOutcome {
    Returned,
    NotBorrowed,
}

/// Outcome of a ledger operation plus both entities as they were committed.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReceipt<O> {
    pub outcome: O,
    pub user: User,
    pub movie: Movie,
}

/// Apply a borrow to `user` and `movie`.
///
/// Stock is checked before quota, so a movie with no copies left reports
/// `OutOfStock` even for a user who is also out of quota. On error nothing
/// is mutated.
pub fn apply_borrow(
    user: &mut User,
    movie: &mut Movie,
    already_borrowing: bool,
) -> Result<BorrowOutcome> {
    if already_borrowing {
        return Ok(BorrowOutcome::AlreadyBorrowed);
    }
    if movie.amount <= 0 {
        return Err(ShelfError::OutOfStock(movie.title.clone()));
    }
    if user.remaining_quota <= 0 {
        return Err(ShelfError::QuotaExceeded);
    }

    movie.amount -= 1;
    movie.counts = movie.counts.saturating_add(1);
    user.remaining_quota -= 1;

    Ok(BorrowOutcome::Borrowed {
        loan: Loan::new(user.id, movie.id),
    })
}

/// Apply a return to `user` and `movie`.
pub fn apply_return(
    user: &mut User,
    movie: &mut Movie,
    currently_borrowing: bool,
) -> ReturnOutcome {
    if !currently_borrowing {
        return ReturnOutcome::NotBorrowed;
    }

    movie.amount = movie.amount.saturating_add(1);
    user.remaining_quota = user.remaining_quota.saturating_add(1);
    ReturnOutcome::Returned
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelshelf_model::NewMovie;

    fn user(quota: i32) -> User {
        User::new("reader@example.com", "reader", "hash", None, quota)
    }

    fn movie(amount: i32) -> Movie {
        NewMovie {
            title: "Stalker".into(),
            original_title: "Сталкер".into(),
            directors: "Andrei Tarkovsky".into(),
            casts: String::new(),
            genres: "Drama / Sci-Fi".into(),
            year: 1979,
            rating: 8.1,
            images: None,
            alt: None,
            amount,
        }
        .into_movie()
    }

    #[test]
    fn borrow_moves_one_copy() {
        let (mut user, mut movie) = (user(1), movie(1));

        let outcome = apply_borrow(&mut user, &mut movie, false).unwrap();

        let BorrowOutcome::Borrowed { loan } = outcome else {
            panic!("expected a new loan, got {outcome:?}");
        };
        assert_eq!(loan.user_id, user.id);
        assert_eq!(loan.movie_id, movie.id);
        assert_eq!(movie.amount, 0);
        assert_eq!(movie.counts, 1);
        assert_eq!(user.remaining_quota, 0);
    }

    #[test]
    fn borrowing_twice_is_a_no_op() {
        let (mut user, mut movie) = (user(3), movie(3));
        apply_borrow(&mut user, &mut movie, false).unwrap();

        let again = apply_borrow(&mut user, &mut movie, true).unwrap();

        assert_eq!(again, BorrowOutcome::AlreadyBorrowed);
        assert_eq!(movie.amount, 2);
        assert_eq!(movie.counts, 1);
        assert_eq!(user.remaining_quota, 2);
    }

    #[test]
    fn out_of_stock_is_checked_first() {
        let (mut user, mut movie) = (user(0), movie(0));

        let err = apply_borrow(&mut user, &mut movie, false).unwrap_err();

        assert!(matches!(err, ShelfError::OutOfStock(_)));
        assert_eq!(movie.amount, 0);
        assert_eq!(movie.counts, 0);
        assert_eq!(user.remaining_quota, 0);
    }

    #[test]
    fn exhausted_quota_is_rejected() {
        let (mut user, mut movie) = (user(0), movie(5));

        let err = apply_borrow(&mut user, &mut movie, false).unwrap_err();

        assert!(matches!(err, ShelfError::QuotaExceeded));
        assert_eq!(movie.amount, 5);
        assert_eq!(user.remaining_quota, 0);
    }

    #[test]
    fn return_restores_counters_but_not_borrow_count() {
        let (mut user, mut movie) = (user(1), movie(1));
        apply_borrow(&mut user, &mut movie, false).unwrap();

        let outcome = apply_return(&mut user, &mut movie, true);

        assert_eq!(outcome, ReturnOutcome::Returned);
        assert_eq!(movie.amount, 1);
        assert_eq!(movie.counts, 1);
        assert_eq!(user.remaining_quota, 1);
    }

    #[test]
    fn returning_unborrowed_movie_changes_nothing() {
        let (mut user, mut movie) = (user(7), movie(200));

        let outcome = apply_return(&mut user, &mut movie, false);

        assert_eq!(outcome, ReturnOutcome::NotBorrowed);
        assert_eq!(movie.amount, 200);
        assert_eq!(user.remaining_quota, 7);
    }

    #[test]
    fn outcomes_serialize_with_status_tag() {
        let value = serde_json::to_value(ReturnOutcome::NotBorrowed).unwrap();
        assert_eq!(value, serde_json::json!({"status": "not_borrowed"}));
    }
}
