use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    movies::{loan_handlers, movie_handlers},
    routes::paths::v1,
    users::{
        auth::{
            handlers,
            middleware::{auth_middleware, optional_auth_middleware},
        },
        user_handlers,
    },
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::HEALTH, get(health))
        // Public authentication endpoints
        .route(v1::auth::REGISTER, post(handlers::register))
        .route(v1::auth::TOKEN, post(handlers::issue_token))
        .route(
            v1::auth::PASSWORD_RESET_REQUEST,
            post(handlers::request_password_reset),
        )
        .route(v1::auth::PASSWORD_RESET, post(handlers::reset_password))
        .merge(create_catalog_routes(state.clone()))
        .merge(create_protected_routes(state))
}

/// Catalog and lending routes. Anonymous callers may browse; the services
/// decide what a principal may change.
fn create_catalog_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            v1::movies::COLLECTION,
            get(movie_handlers::list_movies).post(movie_handlers::create_movie),
        )
        .route(v1::movies::SEARCH, get(movie_handlers::search_movies))
        .route(
            v1::movies::ITEM,
            get(movie_handlers::get_movie)
                .put(movie_handlers::update_movie)
                .delete(movie_handlers::delete_movie),
        )
        .route(v1::movies::BORROW, post(loan_handlers::borrow_movie))
        .route(v1::movies::RETURN, post(loan_handlers::return_movie))
        .route_layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ))
}

/// Create protected routes that require authentication
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::auth::CONFIRM, post(handlers::confirm))
        .route(
            v1::auth::CONFIRM_RESEND,
            post(handlers::resend_confirmation),
        )
        .route(v1::auth::PASSWORD_CHANGE, post(handlers::change_password))
        .route(
            v1::auth::EMAIL_CHANGE_REQUEST,
            post(handlers::request_email_change),
        )
        .route(v1::auth::EMAIL_CHANGE, post(handlers::change_email))
        .route(v1::users::CURRENT, get(user_handlers::current_user_handler))
        .route(
            v1::users::BY_USERNAME,
            get(user_handlers::user_by_username),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
