//! Registration, login and the token-gated account actions.
//!
//! Every action that changes an account through a mailed link follows the
//! same shape: mint a purpose-specific claim, hand it to the notifier, and
//! later verify it *and* check that the embedded id is the account being
//! changed. A valid token for somebody else is a `TokenMismatch`.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use reelshelf_model::{DEFAULT_BORROW_QUOTA, Role, User, UserID, roles};

use crate::{
    application::unit_of_work::AppUnitOfWork,
    auth::{
        AuthClaim, AuthCrypto, ChangeEmailClaim, ConfirmClaim, ResetClaim,
        TokenCodec,
    },
    error::{Result, ShelfError},
    rbac::Principal,
};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_EMAIL_LEN: usize = 64;
pub const MAX_USERNAME_LEN: usize = 32;

/// A message the account owner has to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountNotice {
    Confirm {
        to: String,
        username: String,
        token: String,
    },
    ResetPassword {
        to: String,
        username: String,
        token: String,
    },
    ChangeEmail {
        to: String,
        username: String,
        token: String,
    },
}

impl AccountNotice {
    pub fn recipient(&self) -> &str {
        match self {
            AccountNotice::Confirm { to, .. }
            | AccountNotice::ResetPassword { to, .. }
            | AccountNotice::ChangeEmail { to, .. } => to,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            AccountNotice::Confirm { username, .. }
            | AccountNotice::ResetPassword { username, .. }
            | AccountNotice::ChangeEmail { username, .. } => username,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            AccountNotice::Confirm { token, .. }
            | AccountNotice::ResetPassword { token, .. }
            | AccountNotice::ChangeEmail { token, .. } => token,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            AccountNotice::Confirm { .. } => "Confirm your account",
            AccountNotice::ResetPassword { .. } => "Reset your password",
            AccountNotice::ChangeEmail { .. } => "Confirm your email address",
        }
    }
}

/// Delivery channel for [`AccountNotice`]s.
#[async_trait]
pub trait AccountNotifier: Send + Sync {
    async fn notify(&self, notice: AccountNotice) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Lifetime of confirmation, reset and email-change tokens.
    pub token_ttl: Duration,
    pub auth_token_ttl: Duration,
    /// Registrations with this address become administrators.
    pub admin_email: Option<String>,
    /// Quota every new account starts with.
    pub max_borrowed: i32,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(3600),
            auth_token_ttl: Duration::from_secs(3600),
            admin_email: None,
            max_borrowed: DEFAULT_BORROW_QUOTA,
        }
    }
}

/// Bearer token handed out by [`AccountService::issue_auth_token`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthToken {
    pub token: String,
    /// Lifetime in seconds.
    pub expiration: u64,
}

pub struct AccountService {
    uow: Arc<AppUnitOfWork>,
    crypto: Arc<AuthCrypto>,
    tokens: Arc<TokenCodec>,
    notifier: Arc<dyn AccountNotifier>,
    settings: AccountSettings,
}

impl fmt::Debug for AccountService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService")
            .field("uow", &self.uow)
            .field("notifier", &"Arc<dyn AccountNotifier>")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(
        uow: Arc<AppUnitOfWork>,
        crypto: Arc<AuthCrypto>,
        tokens: Arc<TokenCodec>,
        notifier: Arc<dyn AccountNotifier>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            uow,
            crypto,
            tokens,
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &AccountSettings {
        &self.settings
    }

    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User> {
        let email = normalize_email(email)?;
        let username = validate_username(username)?;
        validate_password(password)?;

        let role = self.role_for_new_account(&email).await?;
        let password_hash = self.crypto.hash_password(password)?;
        let user = User::new(
            email,
            username,
            password_hash,
            role.map(|role| role.id),
            self.settings.max_borrowed,
        );

        self.uow.users.create_user(&user).await?;
        info!(user_id = %user.id, username = %user.username, "Registered account");

        // The account exists either way; `resend_confirmation` recovers.
        if let Err(err) = self.send_confirmation(&user).await {
            warn!(user_id = %user.id, error = %err, "Confirmation notice not sent");
        }
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let user = self
            .uow
            .users
            .get_user_by_email(&email)
            .await?
            .ok_or(ShelfError::InvalidCredentials)?;

        if !self.crypto.verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(ShelfError::InvalidCredentials);
        }
        Ok(user)
    }

    pub fn issue_auth_token(&self, user: &User) -> Result<AuthToken> {
        let token = self
            .tokens
            .issue(&AuthClaim { id: user.id }, self.settings.auth_token_ttl)?;
        Ok(AuthToken {
            token,
            expiration: self.settings.auth_token_ttl.as_secs(),
        })
    }

    /// Resolve a bearer token to its account. Tokens for deleted accounts
    /// are `InvalidCredentials`.
    pub async fn resolve_auth_token(&self, token: &str) -> Result<User> {
        self.resolve_auth_token_at(token, Utc::now()).await
    }

    pub async fn resolve_auth_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let claim: AuthClaim = self.tokens.verify_at(token, now)?;
        self.uow
            .users
            .get_user_by_id(claim.id)
            .await?
            .ok_or(ShelfError::InvalidCredentials)
    }

    /// Pair an account with its role.
    pub async fn principal_for(&self, user: User) -> Result<Principal> {
        let role = match user.role_id {
            Some(role_id) => self.uow.roles.get_role(role_id).await?,
            None => None,
        };
        Ok(Principal::authenticated(user, role))
    }

    pub async fn resend_confirmation(&self, user: &User) -> Result<()> {
        let user = self.reload(user.id).await?;
        if user.confirmed {
            return Ok(());
        }
        self.send_confirmation(&user).await
    }

    /// Mark the account confirmed. Already confirmed accounts succeed
    /// without looking at the token.
    pub async fn confirm(&self, user: &User, token: &str) -> Result<User> {
        let mut user = self.reload(user.id).await?;
        if user.confirmed {
            return Ok(user);
        }

        let claim: ConfirmClaim = self.tokens.verify(token)?;
        if claim.confirm != user.id {
            return Err(ShelfError::TokenMismatch);
        }

        user.confirmed = true;
        self.uow.users.update_user(&user).await?;
        info!(user_id = %user.id, "Confirmed account");
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user: &User,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut user = self.reload(user.id).await?;
        if !self.crypto.verify_password(old_password, &user.password_hash)? {
            return Err(ShelfError::InvalidCredentials);
        }
        validate_password(new_password)?;

        user.password_hash = self.crypto.hash_password(new_password)?;
        self.uow.users.update_user(&user).await?;
        info!(user_id = %user.id, "Changed password");
        Ok(())
    }

    /// Unknown addresses succeed silently so the endpoint cannot be used to
    /// probe for accounts.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.uow.users.get_user_by_email(&email).await? else {
            debug!("Password reset requested for unknown address");
            return Ok(());
        };

        let token = self
            .tokens
            .issue(&ResetClaim { reset: user.id }, self.settings.token_ttl)?;
        self.notifier
            .notify(AccountNotice::ResetPassword {
                to: user.email.clone(),
                username: user.username.clone(),
                token,
            })
            .await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<()> {
        let email = email.trim().to_lowercase();
        let claim: ResetClaim = self.tokens.verify(token)?;
        let mut user = self
            .uow
            .users
            .get_user_by_email(&email)
            .await?
            .ok_or(ShelfError::TokenMismatch)?;
        if claim.reset != user.id {
            return Err(ShelfError::TokenMismatch);
        }
        validate_password(new_password)?;

        user.password_hash = self.crypto.hash_password(new_password)?;
        self.uow.users.update_user(&user).await?;
        info!(user_id = %user.id, "Reset password");
        Ok(())
    }

    pub async fn request_email_change(
        &self,
        user: &User,
        new_email: &str,
        password: &str,
    ) -> Result<()> {
        let user = self.reload(user.id).await?;
        if !self.crypto.verify_password(password, &user.password_hash)? {
            return Err(ShelfError::InvalidCredentials);
        }
        let new_email = normalize_email(new_email)?;
        self.ensure_email_unused(&new_email, user.id).await?;

        let claim = ChangeEmailClaim {
            change_email: user.id,
            new_email: new_email.clone(),
        };
        let token = self.tokens.issue(&claim, self.settings.token_ttl)?;
        self.notifier
            .notify(AccountNotice::ChangeEmail {
                to: new_email,
                username: user.username.clone(),
                token,
            })
            .await
    }

    /// Apply the address embedded in an email-change token.
    pub async fn change_email(&self, user: &User, token: &str) -> Result<User> {
        let mut user = self.reload(user.id).await?;
        let claim: ChangeEmailClaim = self.tokens.verify(token)?;
        if claim.change_email != user.id {
            return Err(ShelfError::TokenMismatch);
        }
        self.ensure_email_unused(&claim.new_email, user.id).await?;

        user.email = claim.new_email;
        self.uow.users.update_user(&user).await?;
        info!(user_id = %user.id, "Changed email address");
        Ok(user)
    }

    async fn reload(&self, id: UserID) -> Result<User> {
        self.uow
            .users
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ShelfError::NotFound(format!("user {id}")))
    }

    async fn ensure_email_unused(&self, email: &str, owner: UserID) -> Result<()> {
        match self.uow.users.get_user_by_email(email).await? {
            Some(existing) if existing.id != owner => {
                Err(ShelfError::Conflict("email already registered".into()))
            }
            _ => Ok(()),
        }
    }

    async fn role_for_new_account(&self, email: &str) -> Result<Option<Role>> {
        let is_admin = self
            .settings
            .admin_email
            .as_deref()
            .is_some_and(|admin| admin.trim().eq_ignore_ascii_case(email));

        let role = if is_admin {
            self.uow.roles.get_role_by_name(roles::ADMINISTRATOR).await?
        } else {
            self.uow.roles.get_default_role().await?
        };
        if role.is_none() {
            warn!("No role available for new account; were roles seeded?");
        }
        Ok(role)
    }

    async fn send_confirmation(&self, user: &User) -> Result<()> {
        let token = self
            .tokens
            .issue(&ConfirmClaim { confirm: user.id }, self.settings.token_ttl)?;
        self.notifier
            .notify(AccountNotice::Confirm {
                to: user.email.clone(),
                username: user.username.clone(),
                token,
            })
            .await
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(ShelfError::Validation(format!(
            "email must be 1 to {MAX_EMAIL_LEN} characters"
        )));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ShelfError::Validation(format!("invalid email address {email}")));
    }
    Ok(email)
}

fn validate_username(username: &str) -> Result<String> {
    let username = username.trim();
    let mut chars = username.chars();
    let valid = username.len() <= MAX_USERNAME_LEN
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ShelfError::Validation(format!(
            "username must start with a letter and contain only letters, \
             digits or underscores (at most {MAX_USERNAME_LEN})"
        )));
    }
    Ok(username.to_string())
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ShelfError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
