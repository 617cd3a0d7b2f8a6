//! Registration and token-gated account actions.

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use reelshelf_core::ShelfError;
use reelshelf_core::application::{
    AccountNotice, AccountNotifier, AccountService, AccountSettings,
};
use reelshelf_core::auth::{AuthClaim, AuthCrypto, ChangeEmailClaim, TokenError};
use reelshelf_model::{Permissions, roles};
use support::{ADMIN_EMAIL, TEST_PASSWORD, TestShelf};

#[tokio::test]
async fn registration_sends_a_confirmation_token() -> Result<()> {
    let shelf = TestShelf::new().await?;

    let user = shelf
        .accounts
        .register("Reader@Example.com", "reader", TEST_PASSWORD)
        .await?;

    assert_eq!(user.email, "reader@example.com");
    assert!(!user.confirmed);
    assert_eq!(user.remaining_quota, 7);

    let notice = shelf.notifier.last().expect("confirmation notice");
    assert!(matches!(notice, AccountNotice::Confirm { .. }));
    assert_eq!(notice.recipient(), "reader@example.com");

    let confirmed = shelf.accounts.confirm(&user, notice.token()).await?;
    assert!(confirmed.confirmed);
    assert!(shelf.reload_user(&user).await?.confirmed);
    Ok(())
}

#[tokio::test]
async fn roles_follow_the_admin_address() -> Result<()> {
    let shelf = TestShelf::new().await?;

    let admin = shelf.admin().await?;
    assert!(admin.is_administrator());

    let reader = shelf.confirmed_user("reader@example.com", "reader").await?;
    let reader = shelf.principal(&reader).await?;
    assert_eq!(reader.role().map(|role| role.name.as_str()), Some(roles::USER));
    assert!(reader.can(Permissions::BORROW | Permissions::RETURN));
    assert!(!reader.can(Permissions::MODERATE_MOVIE));
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let shelf = TestShelf::new().await?;
    shelf
        .accounts
        .register("reader@example.com", "reader", TEST_PASSWORD)
        .await?;

    let same_email = shelf
        .accounts
        .register("READER@example.com", "other", TEST_PASSWORD)
        .await
        .unwrap_err();
    let same_name = shelf
        .accounts
        .register("other@example.com", "reader", TEST_PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(same_email, ShelfError::Conflict(_)));
    assert!(matches!(same_name, ShelfError::Conflict(_)));
    Ok(())
}

#[tokio::test]
async fn confirmation_token_is_bound_to_its_account() -> Result<()> {
    let shelf = TestShelf::new().await?;
    let _alice = shelf
        .accounts
        .register("alice@example.com", "alice", TEST_PASSWORD)
        .await?;
    let alices_token = shelf.notifier.last().expect("notice").token().to_string();
    let bob = shelf
        .accounts
        .register("bob@example.com", "bob", TEST_PASSWORD)
        .await?;

    let err = shelf.accounts.confirm(&bob, &alices_token).await.unwrap_err();

    assert!(matches!(err, ShelfError::TokenMismatch));
    assert!(!shelf.reload_user(&bob).await?.confirmed);
    Ok(())
}

#[tokio::test]
async fn tampered_confirmation_token_is_rejected() -> Result<()> {
    let shelf = TestShelf::new().await?;
    let user = shelf
        .accounts
        .register("reader@example.com", "reader", TEST_PASSWORD)
        .await?;
    let token = shelf.notifier.last().expect("notice").token().to_string();
    let tampered = format!("x{}", &token[1..]);

    let err = shelf.accounts.confirm(&user, &tampered).await.unwrap_err();

    assert!(matches!(err, ShelfError::Token(TokenError::BadSignature)));
    Ok(())
}

#[tokio::test]
async fn login_and_bearer_tokens() -> Result<()> {
    let shelf = TestShelf::new().await?;
    let user = shelf.confirmed_user("reader@example.com", "reader").await?;

    let wrong = shelf
        .accounts
        .authenticate("reader@example.com", "not the password")
        .await
        .unwrap_err();
    assert!(matches!(wrong, ShelfError::InvalidCredentials));

    let unknown = shelf
        .accounts
        .authenticate("ghost@example.com", TEST_PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(unknown, ShelfError::InvalidCredentials));

    let authed = shelf
        .accounts
        .authenticate("READER@example.com", TEST_PASSWORD)
        .await?;
    let token = shelf.accounts.issue_auth_token(&authed)?;
    assert_eq!(token.expiration, 3600);

    let resolved = shelf.accounts.resolve_auth_token(&token.token).await?;
    assert_eq!(resolved.id, user.id);

    let later = Utc::now() + chrono::Duration::seconds(3601);
    let expired = shelf
        .accounts
        .resolve_auth_token_at(&token.token, later)
        .await
        .unwrap_err();
    assert!(matches!(expired, ShelfError::Token(TokenError::Expired)));
    Ok(())
}

#[tokio::test]
async fn bearer_token_for_missing_account_is_invalid() -> Result<()> {
    let shelf = TestShelf::new().await?;
    let ghost = shelf.tokens.issue(
        &AuthClaim {
            id: reelshelf_model::UserID::new(),
        },
        Duration::from_secs(60),
    )?;

    let err = shelf.accounts.resolve_auth_token(&ghost).await.unwrap_err();
    assert!(matches!(err, ShelfError::InvalidCredentials));
    Ok(())
}

#[tokio::test]
async fn password_change_requires_the_old_password() -> Result<()> {
    let shelf = TestShelf::new().await?;
    let user = shelf.confirmed_user("reader@example.com", "reader").await?;

    let err = shelf
        .accounts
        .change_password(&user, "wrong password", "brand new secret")
        .await
        .unwrap_err();
    assert!(matches!(err, ShelfError::InvalidCredentials));

    shelf
        .accounts
        .change_password(&user, TEST_PASSWORD, "brand new secret")
        .await?;
    shelf
        .accounts
        .authenticate("reader@example.com", "brand new secret")
        .await?;
    Ok(())
}

#[tokio::test]
async fn password_reset_flow() -> Result<()> {
    let shelf = TestShelf::new().await?;
    shelf.confirmed_user("reader@example.com", "reader").await?;
    let before = shelf.notifier.count();

    shelf
        .accounts
        .request_password_reset("nobody@example.com")
        .await?;
    assert_eq!(shelf.notifier.count(), before, "unknown addresses are silent");

    shelf
        .accounts
        .request_password_reset("reader@example.com")
        .await?;
    let notice = shelf.notifier.last().expect("reset notice");
    assert!(matches!(notice, AccountNotice::ResetPassword { .. }));

    let mismatch = shelf
        .accounts
        .reset_password(ADMIN_EMAIL, notice.token(), "new password!")
        .await
        .unwrap_err();
    assert!(matches!(mismatch, ShelfError::TokenMismatch));

    shelf
        .accounts
        .reset_password("reader@example.com", notice.token(), "new password!")
        .await?;
    shelf
        .accounts
        .authenticate("reader@example.com", "new password!")
        .await?;
    Ok(())
}

#[tokio::test]
async fn email_change_applies_the_embedded_address() -> Result<()> {
    let shelf = TestShelf::new().await?;
    let user = shelf.confirmed_user("reader@example.com", "reader").await?;

    let wrong_password = shelf
        .accounts
        .request_email_change(&user, "new@example.com", "nope nope")
        .await
        .unwrap_err();
    assert!(matches!(wrong_password, ShelfError::InvalidCredentials));

    shelf
        .accounts
        .request_email_change(&user, "New@Example.com", TEST_PASSWORD)
        .await?;
    let notice = shelf.notifier.last().expect("change notice");
    assert_eq!(notice.recipient(), "new@example.com");

    let claim: ChangeEmailClaim = shelf.tokens.verify(notice.token())?;
    assert_eq!(claim.change_email, user.id);

    let updated = shelf.accounts.change_email(&user, notice.token()).await?;
    assert_eq!(updated.email, "new@example.com");
    assert!(
        shelf
            .uow
            .users
            .get_user_by_email("reader@example.com")
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn email_change_rechecks_uniqueness_on_apply() -> Result<()> {
    let shelf = TestShelf::new().await?;
    let user = shelf.confirmed_user("reader@example.com", "reader").await?;
    shelf
        .accounts
        .request_email_change(&user, "taken@example.com", TEST_PASSWORD)
        .await?;
    let token = shelf.notifier.last().expect("notice").token().to_string();

    shelf.confirmed_user("taken@example.com", "taken").await?;

    let err = shelf.accounts.change_email(&user, &token).await.unwrap_err();
    assert!(matches!(err, ShelfError::Conflict(_)));
    Ok(())
}

/// Mail relay that is down for the first `outages` deliveries.
#[derive(Debug)]
struct FlakyNotifier {
    outages: usize,
    attempts: AtomicUsize,
    delivered: std::sync::Mutex<Vec<AccountNotice>>,
}

#[async_trait]
impl AccountNotifier for FlakyNotifier {
    async fn notify(&self, notice: AccountNotice) -> reelshelf_core::Result<()> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) < self.outages {
            return Err(ShelfError::Internal("mail relay unavailable".into()));
        }
        self.delivered.lock().unwrap().push(notice);
        Ok(())
    }
}

#[tokio::test]
async fn registration_survives_a_notifier_outage() -> Result<()> {
    let shelf = TestShelf::new().await?;
    let notifier = Arc::new(FlakyNotifier {
        outages: 1,
        attempts: AtomicUsize::new(0),
        delivered: std::sync::Mutex::new(Vec::new()),
    });
    let accounts = AccountService::new(
        shelf.uow.clone(),
        Arc::new(AuthCrypto::insecure_fast("test-pepper")?),
        shelf.tokens.clone(),
        notifier.clone(),
        AccountSettings {
            token_ttl: Duration::from_secs(3600),
            auth_token_ttl: Duration::from_secs(3600),
            admin_email: None,
            max_borrowed: 7,
        },
    );

    let user = accounts
        .register("reader@example.com", "reader", TEST_PASSWORD)
        .await?;
    assert!(!user.confirmed);
    assert!(shelf.reload_user(&user).await.is_ok());
    assert!(notifier.delivered.lock().unwrap().is_empty());

    accounts.resend_confirmation(&user).await?;
    let token = notifier.delivered.lock().unwrap()[0].token().to_string();
    assert!(accounts.confirm(&user, &token).await?.confirmed);
    Ok(())
}
