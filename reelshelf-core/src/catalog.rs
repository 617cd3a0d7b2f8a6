//! Catalog entry rules shared by the service and the repositories.
//!
//! Edits are applied by the repositories while they hold the same lock the
//! ledger takes on the movie row, so a borrow or return can never be
//! overwritten by a concurrent metadata change.

use reelshelf_model::{Movie, MovieUpdate};

use crate::error::{Result, ShelfError};

pub const MAX_RATING: f64 = 10.0;

pub fn validate_movie(movie: &Movie) -> Result<()> {
    if movie.title.trim().is_empty() || movie.original_title.trim().is_empty() {
        return Err(ShelfError::Validation(
            "title and original title are required".into(),
        ));
    }
    if !(0.0..=MAX_RATING).contains(&movie.rating) {
        return Err(ShelfError::Validation(format!(
            "rating must be between 0 and {MAX_RATING}"
        )));
    }
    if movie.amount < 0 {
        return Err(ShelfError::Validation("amount must not be negative".into()));
    }
    Ok(())
}

/// Apply `update` to a freshly locked copy of the movie and validate the
/// result. `counts` is never touched and `amount` only when supplied.
pub fn apply_update(movie: &mut Movie, update: MovieUpdate) -> Result<()> {
    let counts = movie.counts;
    update.apply_to(movie);
    movie.counts = counts;
    validate_movie(movie)
}

/// Whether `movie` matches a free-text catalog query. Matching is a
/// case-insensitive substring test over titles, directors and casts.
pub fn matches_query(movie: &Movie, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    [
        &movie.title,
        &movie.original_title,
        &movie.directors,
        &movie.casts,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}
