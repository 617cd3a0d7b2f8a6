use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;

use reelshelf_core::Principal;

use crate::{
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
    },
    movies::views::MovieView,
    users::profile::{UserProfile, current_user},
};

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: UserProfile,
    pub borrowed: Vec<MovieView>,
    pub max_borrowed: i32,
}

pub async fn current_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AppResult<Json<CurrentUserResponse>> {
    let user = current_user(&principal)?;
    let borrowed = state.lending.borrowed_movies(user.id).await?;

    Ok(Json(CurrentUserResponse {
        user: UserProfile::new(user, principal.role()),
        borrowed: borrowed.iter().map(MovieView::from).collect(),
        max_borrowed: state.config.lending.max_borrowed,
    }))
}

/// Profiles are private: looking up anyone but yourself is a 404.
pub async fn user_by_username(
    Extension(principal): Extension<Principal>,
    Path(username): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let user = current_user(&principal)?;
    if user.username != username {
        return Err(AppError::not_found(format!("user {username}")));
    }
    Ok(Json(UserProfile::new(user, principal.role())))
}
