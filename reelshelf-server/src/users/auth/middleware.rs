use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use reelshelf_core::{Principal, ShelfError};

use crate::infra::{app_state::AppState, errors::AppError};

/// Resolve the bearer token to a [`Principal`] and store it in the request
/// extensions. Requests without a valid token are rejected.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
    let principal = resolve_principal(&state, &token).await?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Like [`auth_middleware`], but callers without a usable token continue as
/// [`Principal::Anonymous`].
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match extract_bearer_token(&request) {
        Some(token) => match resolve_principal(&state, &token).await {
            Ok(principal) => principal,
            Err(err) => {
                debug!(error = %err, "Ignoring unusable bearer token");
                Principal::Anonymous
            }
        },
        None => Principal::Anonymous,
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

async fn resolve_principal(
    state: &AppState,
    token: &str,
) -> Result<Principal, AppError> {
    let user = state
        .accounts
        .resolve_auth_token(token)
        .await
        .map_err(|err| match err {
            ShelfError::Token(_) | ShelfError::InvalidCredentials => {
                AppError::unauthorized("Invalid or expired token")
            }
            other => other.into(),
        })?;
    Ok(state.accounts.principal_for(user).await?)
}
