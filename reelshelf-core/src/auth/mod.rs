//! Password hashing and signed account tokens.

pub mod claims;
pub mod crypto;
pub mod token;

pub use claims::{AuthClaim, ChangeEmailClaim, ConfirmClaim, ResetClaim};
pub use crypto::{AuthCrypto, AuthCryptoError};
pub use token::{TokenCodec, TokenError, VerifiedToken};
