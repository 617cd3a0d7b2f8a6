use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use reelshelf_core::Principal;
use reelshelf_model::{MovieID, MovieUpdate, NewMovie};

use crate::{
    infra::{app_state::AppState, errors::AppResult},
    movies::views::{MoviePage, MovieView},
};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<MoviePage>> {
    let page = state.catalog.list(query.page.unwrap_or(1)).await?;
    Ok(Json(MoviePage::from(page)))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<u32>,
}

pub async fn search_movies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<MoviePage>> {
    let page = state
        .catalog
        .search(&query.q, query.page.unwrap_or(1))
        .await?;
    Ok(Json(MoviePage::search(page, query.q.trim())))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MovieView>> {
    let movie = state.catalog.get(MovieID::from(id)).await?;
    let mut view = MovieView::from(&movie);

    if let Some(user) = principal.user() {
        view.borrowed_by_me =
            Some(state.lending.is_borrowing(user.id, movie.id).await?);
    }

    Ok(Json(view))
}

pub async fn create_movie(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(movie): Json<NewMovie>,
) -> AppResult<(StatusCode, Json<MovieView>)> {
    let movie = state.catalog.create(&principal, movie).await?;
    Ok((StatusCode::CREATED, Json(MovieView::from(&movie))))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(update): Json<MovieUpdate>,
) -> AppResult<Json<MovieView>> {
    let movie = state
        .catalog
        .update(&principal, MovieID::from(id), update)
        .await?;
    Ok(Json(MovieView::from(&movie)))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.catalog.delete(&principal, MovieID::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
