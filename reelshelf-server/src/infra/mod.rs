pub mod app_state;
pub mod config;
pub mod constants;
pub mod errors;
pub mod mailer;
pub mod startup;
