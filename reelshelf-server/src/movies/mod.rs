pub mod import;
pub mod loan_handlers;
pub mod movie_handlers;
pub mod views;
