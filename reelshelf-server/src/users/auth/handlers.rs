use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;

use reelshelf_core::{Principal, application::AuthToken};

use crate::{
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
    },
    users::profile::{UserProfile, current_user},
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeEmailRequest {
    pub new_email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let user = state
        .accounts
        .register(&request.email, &request.username, &request.password)
        .await?;
    let principal = state.accounts.principal_for(user).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserProfile::from_principal(&principal)?),
    ))
}

pub async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<Json<AuthToken>> {
    let user = state
        .accounts
        .authenticate(&request.email, &request.password)
        .await?;
    Ok(Json(state.accounts.issue_auth_token(&user)?))
}

pub async fn confirm(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<TokenRequest>,
) -> AppResult<Json<UserProfile>> {
    let user = current_user(&principal)?;
    let user = state
        .accounts
        .confirm(user, &request.token)
        .await
        .map_err(AppError::from_account_token)?;

    Ok(Json(UserProfile::new(&user, principal.role())))
}

pub async fn resend_confirmation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AppResult<StatusCode> {
    let user = current_user(&principal)?;
    state.accounts.resend_confirmation(user).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = current_user(&principal)?;
    state
        .accounts
        .change_password(user, &request.old_password, &request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Always accepted, whether or not the address belongs to an account.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> AppResult<StatusCode> {
    state.accounts.request_password_reset(&request.email).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .accounts
        .reset_password(&request.email, &request.token, &request.new_password)
        .await
        .map_err(AppError::from_account_token)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn request_email_change(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<ChangeEmailRequest>,
) -> AppResult<StatusCode> {
    let user = current_user(&principal)?;
    state
        .accounts
        .request_email_change(user, &request.new_email, &request.password)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn change_email(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<TokenRequest>,
) -> AppResult<Json<UserProfile>> {
    let user = current_user(&principal)?;
    let user = state
        .accounts
        .change_email(user, &request.token)
        .await
        .map_err(AppError::from_account_token)?;

    Ok(Json(UserProfile::new(&user, principal.role())))
}
