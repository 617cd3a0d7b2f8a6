//! PostgreSQL adapters for the repository ports.

mod loans;
mod movies;
mod roles;
mod rows;
mod users;

pub use loans::PostgresLoansRepository;
pub use movies::PostgresMoviesRepository;
pub use roles::PostgresRolesRepository;
pub use users::PostgresUsersRepository;

use crate::error::ShelfError;

/// Map a failed write to `Conflict` when it tripped one of our unique or
/// foreign-key constraints.
pub(crate) fn map_write_error(err: sqlx::Error, context: &str) -> ShelfError {
    if let Some(db_err) = err.as_database_error() {
        match db_err.constraint() {
            Some("users_email_key") => {
                return ShelfError::Conflict("email already registered".into());
            }
            Some("users_username_key") => {
                return ShelfError::Conflict("username already taken".into());
            }
            Some("movies_title_key") | Some("movies_original_title_key") => {
                return ShelfError::Conflict("movie already exists".into());
            }
            Some("loans_movie_id_fkey") => {
                return ShelfError::Conflict("movie is still on loan".into());
            }
            _ => {}
        }
        if db_err.is_unique_violation() {
            return ShelfError::Conflict(format!("{context}: {}", db_err.message()));
        }
    }
    ShelfError::Database(format!("{context}: {err}"))
}
