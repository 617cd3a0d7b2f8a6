use serde::Serialize;
use url::form_urlencoded;
use uuid::Uuid;

use reelshelf_model::{Movie, Page};

use crate::routes::paths::{replace_param, v1, with_query};

/// Catalog entry as exposed over HTTP, with the delimited columns split.
#[derive(Debug, Clone, Serialize)]
pub struct MovieView {
    pub id: Uuid,
    pub title: String,
    pub original_title: String,
    pub directors: Vec<String>,
    pub casts: Vec<String>,
    pub genres: Vec<String>,
    pub year: i32,
    pub rating: f64,
    pub images: Option<String>,
    pub alt: Option<String>,
    pub amount: i32,
    pub counts: i32,
    pub api: String,
    /// Only present for authenticated callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrowed_by_me: Option<bool>,
}

impl From<&Movie> for MovieView {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id.to_uuid(),
            title: movie.title.clone(),
            original_title: movie.original_title.clone(),
            directors: movie.director_list(),
            casts: movie.cast_list(),
            genres: movie.genre_list(),
            year: movie.year,
            rating: movie.rating,
            images: movie.images.clone(),
            alt: movie.alt.clone(),
            amount: movie.amount,
            counts: movie.counts,
            api: replace_param(v1::movies::ITEM, "{id}", movie.id.to_string()),
            borrowed_by_me: None,
        }
    }
}

/// One page of the catalog with navigation links. `count` is the page
/// size, not the number of movies on this page.
#[derive(Debug, Clone, Serialize)]
pub struct MoviePage {
    pub count: u32,
    pub start: u64,
    pub total: u64,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub movies: Vec<MovieView>,
}

impl MoviePage {
    fn with_links(page: Page<Movie>, link: impl Fn(u32) -> String) -> Self {
        Self {
            count: page.per_page,
            start: page.start(),
            total: page.total,
            prev: page.has_prev().then(|| link(page.page - 1)),
            next: page.has_next().then(|| link(page.page + 1)),
            movies: page.items.iter().map(MovieView::from).collect(),
        }
    }

    /// Search results; the navigation links repeat the query.
    pub fn search(page: Page<Movie>, query: &str) -> Self {
        Self::with_links(page, |number| {
            let params = form_urlencoded::Serializer::new(String::new())
                .append_pair("q", query)
                .append_pair("page", &number.to_string())
                .finish();
            format!("{}?{params}", v1::movies::SEARCH)
        })
    }
}

impl From<Page<Movie>> for MoviePage {
    fn from(page: Page<Movie>) -> Self {
        Self::with_links(page, |number| {
            with_query(v1::movies::COLLECTION, "page", number)
        })
    }
}
