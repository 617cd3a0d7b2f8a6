#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use reelshelf_core::application::{
    AccountNotice, AccountNotifier, AccountService, AccountSettings,
    AppUnitOfWork, CatalogService, LendingService, RbacBootstrapService,
};
use reelshelf_core::auth::{AuthCrypto, TokenCodec};
use reelshelf_core::rbac::Principal;
use reelshelf_model::{Movie, NewMovie, User, roles};

pub const TEST_PASSWORD: &str = "correct horse battery";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const SECRET: &str = "test-secret-key";

/// Collects notices instead of delivering them.
#[derive(Debug, Default)]
pub struct CapturingNotifier {
    notices: Mutex<Vec<AccountNotice>>,
}

impl CapturingNotifier {
    pub fn last(&self) -> Option<AccountNotice> {
        self.notices.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountNotifier for CapturingNotifier {
    async fn notify(&self, notice: AccountNotice) -> reelshelf_core::Result<()> {
        self.notices.lock().unwrap().push(notice);
        Ok(())
    }
}

/// In-memory service graph with roles already seeded.
pub struct TestShelf {
    pub uow: Arc<AppUnitOfWork>,
    pub accounts: AccountService,
    pub catalog: CatalogService,
    pub lending: LendingService,
    pub notifier: Arc<CapturingNotifier>,
    pub tokens: Arc<TokenCodec>,
}

impl TestShelf {
    pub async fn new() -> Result<Self> {
        Self::with_quota(7).await
    }

    pub async fn with_quota(max_borrowed: i32) -> Result<Self> {
        let uow = Arc::new(AppUnitOfWork::in_memory());
        RbacBootstrapService::new(uow.roles.clone())
            .ensure_defaults()
            .await?;

        let crypto = Arc::new(AuthCrypto::insecure_fast("test-pepper")?);
        let tokens = Arc::new(TokenCodec::new(SECRET)?);
        let notifier = Arc::new(CapturingNotifier::default());
        let settings = AccountSettings {
            token_ttl: Duration::from_secs(3600),
            auth_token_ttl: Duration::from_secs(3600),
            admin_email: Some(ADMIN_EMAIL.to_string()),
            max_borrowed,
        };

        Ok(Self {
            accounts: AccountService::new(
                uow.clone(),
                crypto,
                tokens.clone(),
                notifier.clone(),
                settings,
            ),
            catalog: CatalogService::new(uow.clone(), 20),
            lending: LendingService::new(uow.clone()),
            uow,
            notifier,
            tokens,
        })
    }

    /// Register and confirm an account through the public flow.
    pub async fn confirmed_user(&self, email: &str, username: &str) -> Result<User> {
        let user = self
            .accounts
            .register(email, username, TEST_PASSWORD)
            .await?;
        let token = self
            .notifier
            .last()
            .map(|notice| notice.token().to_string())
            .unwrap_or_default();
        Ok(self.accounts.confirm(&user, &token).await?)
    }

    pub async fn principal(&self, user: &User) -> Result<Principal> {
        let fresh = self
            .uow
            .users
            .get_user_by_id(user.id)
            .await?
            .expect("user exists");
        Ok(self.accounts.principal_for(fresh).await?)
    }

    pub async fn admin(&self) -> Result<Principal> {
        let admin = self.confirmed_user(ADMIN_EMAIL, "admin").await?;
        let principal = self.principal(&admin).await?;
        assert_eq!(
            principal.role().map(|role| role.name.as_str()),
            Some(roles::ADMINISTRATOR)
        );
        Ok(principal)
    }

    pub async fn stock(&self, title: &str, amount: i32) -> Result<Movie> {
        let movie = new_movie(title, amount).into_movie();
        self.uow.movies.create_movie(&movie).await?;
        Ok(movie)
    }

    pub async fn reload_user(&self, user: &User) -> Result<User> {
        Ok(self
            .uow
            .users
            .get_user_by_id(user.id)
            .await?
            .expect("user exists"))
    }

    pub async fn reload_movie(&self, movie: &Movie) -> Result<Movie> {
        Ok(self
            .uow
            .movies
            .get_movie(movie.id)
            .await?
            .expect("movie exists"))
    }
}

pub fn new_movie(title: &str, amount: i32) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        original_title: format!("{title} (original)"),
        directors: "Someone / Someone Else".into(),
        casts: "Lead".into(),
        genres: "Drama".into(),
        year: 1999,
        rating: 7.5,
        images: None,
        alt: None,
        amount,
    }
}
