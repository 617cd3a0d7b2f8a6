use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use reelshelf_core::{
    Principal,
    ledger::{BorrowOutcome, LedgerReceipt, ReturnOutcome},
};
use reelshelf_model::MovieID;

use crate::{
    infra::{app_state::AppState, errors::AppResult},
    movies::views::MovieView,
};

/// Result of a borrow or return: the outcome tag, the movie as committed
/// and the caller's remaining quota.
#[derive(Debug, Serialize)]
pub struct LoanResponse<O> {
    #[serde(flatten)]
    pub outcome: O,
    pub movie: MovieView,
    pub remaining_quota: i32,
}

impl<O> From<LedgerReceipt<O>> for LoanResponse<O> {
    fn from(receipt: LedgerReceipt<O>) -> Self {
        Self {
            outcome: receipt.outcome,
            movie: MovieView::from(&receipt.movie),
            remaining_quota: receipt.user.remaining_quota,
        }
    }
}

pub async fn borrow_movie(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LoanResponse<BorrowOutcome>>> {
    let receipt = state.lending.borrow(&principal, MovieID::from(id)).await?;
    Ok(Json(receipt.into()))
}

pub async fn return_movie(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LoanResponse<ReturnOutcome>>> {
    let receipt = state
        .lending
        .return_movie(&principal, MovieID::from(id))
        .await?;
    Ok(Json(receipt.into()))
}
