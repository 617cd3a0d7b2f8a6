use std::{fmt, sync::Arc};

use anyhow::Context;

use reelshelf_core::{
    application::{
        AccountNotifier, AccountService, AppUnitOfWork, CatalogService,
        LendingService,
    },
    auth::{AuthCrypto, TokenCodec},
};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub unit_of_work: Arc<AppUnitOfWork>,
    pub accounts: Arc<AccountService>,
    pub catalog: Arc<CatalogService>,
    pub lending: Arc<LendingService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the services with production Argon2 parameters.
    pub fn new(
        config: Config,
        unit_of_work: Arc<AppUnitOfWork>,
        notifier: Arc<dyn AccountNotifier>,
    ) -> anyhow::Result<Self> {
        let crypto = AuthCrypto::new(config.auth.password_pepper.as_bytes())
            .context("failed to initialise password hashing")?;
        Self::with_crypto(config, unit_of_work, crypto, notifier)
    }

    pub fn with_crypto(
        config: Config,
        unit_of_work: Arc<AppUnitOfWork>,
        crypto: AuthCrypto,
        notifier: Arc<dyn AccountNotifier>,
    ) -> anyhow::Result<Self> {
        let tokens = TokenCodec::new(config.auth.secret_key.as_bytes())
            .context("failed to initialise token signing")?;

        let accounts = AccountService::new(
            Arc::clone(&unit_of_work),
            Arc::new(crypto),
            Arc::new(tokens),
            notifier,
            config.account_settings(),
        );
        let catalog =
            CatalogService::new(Arc::clone(&unit_of_work), config.lending.json_per_page);
        let lending = LendingService::new(Arc::clone(&unit_of_work));

        Ok(Self {
            config: Arc::new(config),
            unit_of_work,
            accounts: Arc::new(accounts),
            catalog: Arc::new(catalog),
            lending: Arc::new(lending),
        })
    }
}
