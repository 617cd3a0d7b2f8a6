use async_trait::async_trait;

use reelshelf_model::{Movie, MovieID, MovieUpdate, Page, PageRequest};

use crate::error::Result;

#[async_trait]
pub trait MoviesRepository: Send + Sync {
    /// Insert a catalog entry; a duplicate title or original title is a
    /// `Conflict`.
    async fn create_movie(&self, movie: &Movie) -> Result<()>;
    async fn get_movie(&self, id: MovieID) -> Result<Option<Movie>>;
    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>>;
    /// Movies ordered by rating (highest first), then title.
    async fn list_movies(&self, request: PageRequest) -> Result<Page<Movie>>;
    /// Movies whose title, original title, directors or casts contain
    /// `query` (case-insensitive), in catalog order.
    async fn search_movies(&self, query: &str, request: PageRequest) -> Result<Page<Movie>>;
    /// Apply a partial edit under the lock borrow/return take on the movie
    /// row and return the stored result. `counts` is ledger-owned and never
    /// written; `amount` only when the edit supplies it.
    async fn update_movie(&self, id: MovieID, update: MovieUpdate) -> Result<Movie>;
    /// Remove a movie. Fails with `Conflict` while any loan references it
    /// and `NotFound` when it does not exist.
    async fn delete_movie(&self, id: MovieID) -> Result<()>;
}
