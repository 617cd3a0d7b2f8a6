use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use reelshelf_model::{Movie, MovieID, MovieUpdate, Page, PageRequest};

use super::{
    map_write_error,
    rows::{MOVIE_COLUMNS, MovieRow},
};
use crate::{
    catalog,
    database::ports::MoviesRepository,
    error::{Result, ShelfError},
};

/// PostgreSQL-backed implementation of the `MoviesRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresMoviesRepository {
    pool: PgPool,
}

impl PostgresMoviesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MoviesRepository for PostgresMoviesRepository {
    async fn create_movie(&self, movie: &Movie) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO movies (
                id, title, original_title, directors, casts, genres,
                year, rating, images, alt, amount, counts, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(movie.id.to_uuid())
        .bind(&movie.title)
        .bind(&movie.original_title)
        .bind(&movie.directors)
        .bind(&movie.casts)
        .bind(&movie.genres)
        .bind(movie.year)
        .bind(movie.rating)
        .bind(&movie.images)
        .bind(&movie.alt)
        .bind(movie.amount)
        .bind(movie.counts)
        .bind(movie.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_write_error(e, "Failed to create movie"))?;

        info!("Created movie: {} ({})", movie.title, movie.id);
        Ok(())
    }

    async fn get_movie(&self, id: MovieID) -> Result<Option<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1");
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE title = $1");
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(title)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn list_movies(&self, request: PageRequest) -> Result<Page<Movie>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(self.pool())
            .await?;

        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             ORDER BY rating DESC, title ASC \
             LIMIT $1 OFFSET $2"
        );
        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(i64::from(request.per_page))
            .bind(offset)
            .fetch_all(self.pool())
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Movie::from).collect(),
            u64::try_from(total).unwrap_or_default(),
            request,
        ))
    }

    async fn search_movies(&self, query: &str, request: PageRequest) -> Result<Page<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Page::new(Vec::new(), 0, request));
        }
        let pattern = format!("%{}%", escape_like(query));

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM movies WHERE {SEARCH_PREDICATE}"
        ))
        .bind(&pattern)
        .fetch_one(self.pool())
        .await?;

        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             WHERE {SEARCH_PREDICATE} \
             ORDER BY rating DESC, title ASC \
             LIMIT $2 OFFSET $3"
        );
        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(&pattern)
            .bind(i64::from(request.per_page))
            .bind(offset)
            .fetch_all(self.pool())
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Movie::from).collect(),
            u64::try_from(total).unwrap_or_default(),
            request,
        ))
    }

    async fn update_movie(&self, id: MovieID, update: MovieUpdate) -> Result<Movie> {
        let mut tx = self.pool().begin().await?;

        // Same row lock borrow/return take, so stock changes serialize.
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1 FOR UPDATE");
        let mut movie: Movie = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id.to_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .map(Movie::from)
            .ok_or_else(|| ShelfError::NotFound(format!("movie {id}")))?;

        let amount = update.amount;
        catalog::apply_update(&mut movie, update)?;

        sqlx::query(
            r#"
            UPDATE movies
            SET title = $2, original_title = $3, directors = $4, casts = $5,
                genres = $6, year = $7, rating = $8, images = $9, alt = $10,
                amount = COALESCE($11, amount)
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .bind(&movie.title)
        .bind(&movie.original_title)
        .bind(&movie.directors)
        .bind(&movie.casts)
        .bind(&movie.genres)
        .bind(movie.year)
        .bind(movie.rating)
        .bind(&movie.images)
        .bind(&movie.alt)
        .bind(amount)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to update movie"))?;

        tx.commit().await?;

        info!("Updated movie: {} ({})", movie.title, id);
        Ok(movie)
    }

    async fn delete_movie(&self, id: MovieID) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        let title: Option<String> =
            sqlx::query_scalar("SELECT title FROM movies WHERE id = $1 FOR UPDATE")
                .bind(id.to_uuid())
                .fetch_optional(&mut *tx)
                .await?;
        let title = title.ok_or_else(|| ShelfError::NotFound(format!("movie {id}")))?;

        let outstanding: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE movie_id = $1")
                .bind(id.to_uuid())
                .fetch_one(&mut *tx)
                .await?;
        if outstanding > 0 {
            return Err(ShelfError::Conflict(format!(
                "movie {title} is still on loan"
            )));
        }

        sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id.to_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "Failed to delete movie"))?;

        tx.commit().await?;

        info!("Deleted movie: {} ({})", title, id);
        Ok(())
    }
}

const SEARCH_PREDICATE: &str = "(title ILIKE $1 OR original_title ILIKE $1 \
     OR directors ILIKE $1 OR casts ILIKE $1)";

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
