pub mod paths;
pub mod v1;

use crate::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main API router with all versions
pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(v1::create_v1_router(state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Router with state applied, ready to serve.
pub fn app(state: AppState) -> Router {
    create_api_router(state.clone()).with_state(state)
}
