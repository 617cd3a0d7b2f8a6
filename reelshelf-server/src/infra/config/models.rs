use std::{path::PathBuf, time::Duration};

use reelshelf_core::application::AccountSettings;

use crate::infra::constants::{DEFAULT_PASSWORD_PEPPER, DEFAULT_SECRET_KEY};

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub lending: LendingConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// `None` runs the service on the in-memory store.
    pub url: Option<String>,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub password_pepper: String,
    pub token_ttl_secs: u64,
    pub auth_token_ttl_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("auth_token_ttl_secs", &self.auth_token_ttl_secs)
            .finish()
    }
}

impl AuthConfig {
    pub fn is_default_secret_key(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    pub fn is_default_pepper(&self) -> bool {
        self.password_pepper == DEFAULT_PASSWORD_PEPPER
    }
}

#[derive(Debug, Clone)]
pub struct LendingConfig {
    /// Registrations with this address become administrators.
    pub admin_email: Option<String>,
    pub max_borrowed: i32,
    /// Page size for listings printed by the command line.
    pub movies_per_page: u32,
    /// Page size of the JSON catalog endpoint.
    pub json_per_page: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn account_settings(&self) -> AccountSettings {
        AccountSettings {
            token_ttl: Duration::from_secs(self.auth.token_ttl_secs),
            auth_token_ttl: Duration::from_secs(self.auth.auth_token_ttl_secs),
            admin_email: self.lending.admin_email.clone(),
            max_borrowed: self.lending.max_borrowed,
        }
    }
}
