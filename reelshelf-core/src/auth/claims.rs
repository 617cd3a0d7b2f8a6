//! Payloads carried inside account tokens.
//!
//! Each action has its own field name so a token minted for one purpose
//! fails to decode as another.

use reelshelf_model::UserID;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmClaim {
    pub confirm: UserID,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetClaim {
    pub reset: UserID,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEmailClaim {
    pub change_email: UserID,
    pub new_email: String,
}

/// Bearer token identifying the caller of the HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaim {
    pub id: UserID,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::{TokenCodec, TokenError};
    use std::time::Duration;

    #[test]
    fn claims_do_not_cross_purposes() {
        let codec = TokenCodec::new("secret").unwrap();
        let id = UserID::new();
        let token = codec
            .issue(&ConfirmClaim { confirm: id }, Duration::from_secs(60))
            .unwrap();

        assert_eq!(
            codec.verify::<ConfirmClaim>(&token).unwrap().confirm,
            id
        );
        assert!(matches!(
            codec.verify::<ResetClaim>(&token),
            Err(TokenError::Payload(_))
        ));
        assert!(matches!(
            codec.verify::<ChangeEmailClaim>(&token),
            Err(TokenError::Payload(_))
        ));
    }
}
