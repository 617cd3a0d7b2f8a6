use std::{fmt, sync::Arc};

use reelshelf_model::{Movie, MovieID, Permissions, User, UserID};

use crate::{
    application::unit_of_work::AppUnitOfWork,
    error::{Result, ShelfError},
    ledger::{BorrowOutcome, LedgerReceipt, ReturnOutcome},
    rbac::Principal,
};

/// Borrow and return on behalf of an authenticated, confirmed principal.
pub struct LendingService {
    uow: Arc<AppUnitOfWork>,
}

impl fmt::Debug for LendingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LendingService")
            .field("uow", &self.uow)
            .finish()
    }
}

impl LendingService {
    pub fn new(uow: Arc<AppUnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn borrow(
        &self,
        principal: &Principal,
        movie_id: MovieID,
    ) -> Result<LedgerReceipt<BorrowOutcome>> {
        let user = require_confirmed(principal, Permissions::BORROW)?;
        self.uow.loans.borrow(user.id, movie_id).await
    }

    pub async fn return_movie(
        &self,
        principal: &Principal,
        movie_id: MovieID,
    ) -> Result<LedgerReceipt<ReturnOutcome>> {
        let user = require_confirmed(principal, Permissions::RETURN)?;
        self.uow.loans.return_movie(user.id, movie_id).await
    }

    pub async fn is_borrowing(&self, user_id: UserID, movie_id: MovieID) -> Result<bool> {
        self.uow.loans.is_borrowing(user_id, movie_id).await
    }

    /// Movies held by `user_id` and nobody else.
    pub async fn borrowed_movies(&self, user_id: UserID) -> Result<Vec<Movie>> {
        self.uow.loans.borrowed_movies(user_id).await
    }
}

fn require_confirmed(principal: &Principal, permission: Permissions) -> Result<&User> {
    let user = principal.require(permission)?;
    if !user.confirmed {
        return Err(ShelfError::Unconfirmed);
    }
    Ok(user)
}
