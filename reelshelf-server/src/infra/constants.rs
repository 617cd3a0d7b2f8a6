//! Placeholder secrets used when nothing is configured. Only accepted in
//! dev mode.

pub const DEFAULT_SECRET_KEY: &str = "change-me-reelshelf-secret-key";
pub const DEFAULT_PASSWORD_PEPPER: &str = "change-me-reelshelf-password-pepper";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
pub const DEFAULT_MOVIES_PER_PAGE: u32 = 20;
pub const DEFAULT_JSONS_PER_PAGE: u32 = 20;
