#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use reelshelf_core::application::{AccountNotice, AccountNotifier, AppUnitOfWork};
use reelshelf_core::auth::AuthCrypto;
use reelshelf_server::{
    AppState,
    infra::{
        config::{
            AuthConfig, Config, ConfigMetadata, DatabaseConfig, LendingConfig,
            ServerConfig,
        },
        startup,
    },
    routes::{self, paths::v1},
};

pub const TEST_PASSWORD: &str = "correct horse battery";
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Collects notices instead of delivering them.
#[derive(Debug, Default)]
pub struct CapturingNotifier {
    notices: Mutex<Vec<AccountNotice>>,
}

impl CapturingNotifier {
    /// Token of the most recent notice sent to `email`.
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|notice| notice.recipient() == email)
            .map(|notice| notice.token().to_string())
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

pub fn test_config(max_borrowed: i32, json_per_page: u32) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig::default(),
        auth: AuthConfig {
            secret_key: "integration-test-secret-key-0123456789".into(),
            password_pepper: "integration-test-pepper".into(),
            token_ttl_secs: 3600,
            auth_token_ttl_secs: 3600,
        },
        lending: LendingConfig {
            admin_email: Some(ADMIN_EMAIL.into()),
            max_borrowed,
            movies_per_page: 20,
            json_per_page,
        },
        dev_mode: true,
        metadata: ConfigMetadata::default(),
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub notifier: Arc<CapturingNotifier>,
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_config(test_config(7, 20)).await
    }

    pub async fn with_config(config: Config) -> Result<Self> {
        let uow = Arc::new(AppUnitOfWork::in_memory());
        startup::seed_roles(&uow).await?;

        let crypto = AuthCrypto::insecure_fast(config.auth.password_pepper.as_bytes())?;
        let notifier = Arc::new(CapturingNotifier::default());
        let state = AppState::with_crypto(config, uow, crypto, notifier.clone())?;

        let server = TestServer::new(routes::app(state.clone()))
            .map_err(|err| anyhow!(err.to_string()))?;

        Ok(Self {
            server,
            state,
            notifier,
        })
    }

    pub async fn register(&self, email: &str, username: &str) -> Value {
        let response = self
            .server
            .post(v1::auth::REGISTER)
            .json(&json!({
                "email": email,
                "username": username,
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post(v1::auth::TOKEN)
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["token"].as_str().expect("token present").to_string()
    }

    /// Register, log in and confirm; returns the bearer token.
    pub async fn confirmed_user(&self, email: &str, username: &str) -> String {
        self.register(email, username).await;
        let token = self.login(email, TEST_PASSWORD).await;
        let confirm = self
            .notifier
            .last_token_for(email)
            .expect("confirmation notice sent");

        self.server
            .post(v1::auth::CONFIRM)
            .add_header("Authorization", bearer(&token))
            .json(&json!({ "token": confirm }))
            .await
            .assert_status_ok();
        token
    }

    pub async fn admin(&self) -> String {
        self.confirmed_user(ADMIN_EMAIL, "admin").await
    }

    /// Add a movie as `token` and return its id.
    pub async fn add_movie(
        &self,
        token: &str,
        title: &str,
        rating: f64,
        amount: i32,
    ) -> String {
        let response = self
            .server
            .post(v1::movies::COLLECTION)
            .add_header("Authorization", bearer(token))
            .json(&json!({
                "title": title,
                "original_title": format!("{title} (original)"),
                "directors": "Somebody",
                "casts": "One / Two",
                "genres": "Drama",
                "year": 2001,
                "rating": rating,
                "amount": amount,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["id"].as_str().expect("movie id").to_string()
    }
}

pub fn movie_path(id: &str) -> String {
    routes::paths::replace_param(v1::movies::ITEM, "{id}", id)
}

pub fn borrow_path(id: &str) -> String {
    routes::paths::replace_param(v1::movies::BORROW, "{id}", id)
}

pub fn return_path(id: &str) -> String {
    routes::paths::replace_param(v1::movies::RETURN, "{id}", id)
}
