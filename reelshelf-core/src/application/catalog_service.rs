use std::{fmt, sync::Arc};

use serde::Serialize;
use tracing::{info, warn};

use reelshelf_model::{Movie, MovieID, MovieUpdate, NewMovie, Page, PageRequest, Permissions};

use crate::{
    application::unit_of_work::AppUnitOfWork,
    catalog::validate_movie,
    error::{Result, ShelfError},
    rbac::Principal,
};

/// Counts reported by [`CatalogService::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Browsing and moderation of the movie catalog.
pub struct CatalogService {
    uow: Arc<AppUnitOfWork>,
    per_page: u32,
}

impl fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogService")
            .field("uow", &self.uow)
            .field("per_page", &self.per_page)
            .finish()
    }
}

impl CatalogService {
    pub fn new(uow: Arc<AppUnitOfWork>, per_page: u32) -> Self {
        Self {
            uow,
            per_page: per_page.max(1),
        }
    }

    /// 1-based page of the catalog, best rated first. Pages past the end
    /// are empty.
    pub async fn list(&self, page: u32) -> Result<Page<Movie>> {
        self.list_with(page, self.per_page).await
    }

    /// Same as [`list`](Self::list) with an explicit page size.
    pub async fn list_with(&self, page: u32, per_page: u32) -> Result<Page<Movie>> {
        self.uow
            .movies
            .list_movies(PageRequest::new(page, per_page))
            .await
    }

    /// Case-insensitive search over titles, directors and casts. A blank
    /// query yields an empty page.
    pub async fn search(&self, query: &str, page: u32) -> Result<Page<Movie>> {
        let request = PageRequest::new(page, self.per_page);
        let query = query.trim();
        if query.is_empty() {
            return Ok(Page::new(Vec::new(), 0, request));
        }
        self.uow.movies.search_movies(query, request).await
    }

    pub async fn get(&self, id: MovieID) -> Result<Movie> {
        self.uow
            .movies
            .get_movie(id)
            .await?
            .ok_or_else(|| ShelfError::NotFound(format!("movie {id}")))
    }

    pub async fn create(&self, principal: &Principal, movie: NewMovie) -> Result<Movie> {
        let moderator = principal.require(Permissions::MODERATE_MOVIE)?;
        let movie = movie.into_movie();
        validate_movie(&movie)?;

        self.uow.movies.create_movie(&movie).await?;
        info!(movie_id = %movie.id, by = %moderator.username, "Added movie");
        Ok(movie)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: MovieID,
        update: MovieUpdate,
    ) -> Result<Movie> {
        let moderator = principal.require(Permissions::MODERATE_MOVIE)?;
        let movie = self.uow.movies.update_movie(id, update).await?;
        info!(movie_id = %movie.id, by = %moderator.username, "Edited movie");
        Ok(movie)
    }

    pub async fn delete(&self, principal: &Principal, id: MovieID) -> Result<()> {
        let admin = principal.require(Permissions::ADMINISTER)?;
        self.uow.movies.delete_movie(id).await?;
        info!(movie_id = %id, by = %admin.username, "Removed movie");
        Ok(())
    }

    /// Bulk insert used by the command line. Titles already present, and
    /// entries that fail validation, are skipped.
    pub async fn import(&self, movies: Vec<NewMovie>) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        for new_movie in movies {
            if self
                .uow
                .movies
                .find_movie_by_title(&new_movie.title)
                .await?
                .is_some()
            {
                report.skipped += 1;
                continue;
            }

            let movie = new_movie.into_movie();
            if let Err(err) = validate_movie(&movie) {
                warn!(title = %movie.title, error = %err, "Skipping invalid movie");
                report.skipped += 1;
                continue;
            }

            match self.uow.movies.create_movie(&movie).await {
                Ok(()) => report.inserted += 1,
                Err(ShelfError::Conflict(_)) => report.skipped += 1,
                Err(err) => return Err(err),
            }
        }

        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "Catalog import finished"
        );
        Ok(report)
    }
}
