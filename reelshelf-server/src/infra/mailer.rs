//! Account notice delivery.
//!
//! There is no SMTP transport; notices are written to the log so an
//! operator (or a developer) can follow the link by hand.

use async_trait::async_trait;
use tracing::info;

use reelshelf_core::{
    Result,
    application::{AccountNotice, AccountNotifier},
};

use crate::routes::paths::v1;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl AccountNotifier for LogNotifier {
    async fn notify(&self, notice: AccountNotice) -> Result<()> {
        info!(
            to = %notice.recipient(),
            username = %notice.username(),
            subject = notice.subject(),
            endpoint = action_endpoint(&notice),
            token = %notice.token(),
            "Account notice"
        );
        Ok(())
    }
}

/// Endpoint that consumes the token carried by `notice`.
pub fn action_endpoint(notice: &AccountNotice) -> &'static str {
    match notice {
        AccountNotice::Confirm { .. } => v1::auth::CONFIRM,
        AccountNotice::ResetPassword { .. } => v1::auth::PASSWORD_RESET,
        AccountNotice::ChangeEmail { .. } => v1::auth::EMAIL_CHANGE,
    }
}
