pub mod auth;
pub mod profile;
pub mod user_handlers;
