use chrono::{DateTime, Utc};

use crate::ids::MovieID;

/// Separator used by the delimited director/cast/genre columns.
pub const LIST_SEPARATOR: &str = " / ";

/// Copies a new catalog entry starts with unless told otherwise.
pub const DEFAULT_STOCK: i32 = 200;

/// A catalog entry together with its lending counters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Movie {
    pub id: MovieID,
    pub title: String,
    pub original_title: String,
    /// `" / "`-delimited director names
    pub directors: String,
    /// `" / "`-delimited cast names
    pub casts: String,
    /// `" / "`-delimited genres
    pub genres: String,
    pub year: i32,
    pub rating: f64,
    /// Cover image URL
    pub images: Option<String>,
    /// External reference page
    pub alt: Option<String>,
    /// Copies currently on the shelf
    pub amount: i32,
    /// Number of times the movie was lent out
    pub counts: i32,
    pub created_at: DateTime<Utc>,
}

impl Movie {
    /// Whether at least one copy is on the shelf.
    pub fn is_available(&self) -> bool {
        self.amount > 0
    }

    pub fn director_list(&self) -> Vec<String> {
        split_list(&self.directors)
    }

    pub fn cast_list(&self) -> Vec<String> {
        split_list(&self.casts)
    }

    pub fn genre_list(&self) -> Vec<String> {
        split_list(&self.genres)
    }
}

/// Metadata for a catalog entry that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewMovie {
    pub title: String,
    pub original_title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub directors: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub casts: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub genres: String,
    pub year: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rating: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub images: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub alt: Option<String>,
    #[cfg_attr(feature = "serde", serde(default = "default_stock"))]
    pub amount: i32,
}

#[cfg(feature = "serde")]
fn default_stock() -> i32 {
    DEFAULT_STOCK
}

impl NewMovie {
    pub fn into_movie(self) -> Movie {
        Movie {
            id: MovieID::new(),
            title: self.title,
            original_title: self.original_title,
            directors: self.directors,
            casts: self.casts,
            genres: self.genres,
            year: self.year,
            rating: self.rating,
            images: self.images,
            alt: self.alt,
            amount: self.amount,
            counts: 0,
            created_at: Utc::now(),
        }
    }
}

/// Partial edit of a catalog entry; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub directors: Option<String>,
    pub casts: Option<String>,
    pub genres: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub images: Option<String>,
    pub alt: Option<String>,
    pub amount: Option<i32>,
}

impl MovieUpdate {
    pub fn apply_to(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(original_title) = self.original_title {
            movie.original_title = original_title;
        }
        if let Some(directors) = self.directors {
            movie.directors = directors;
        }
        if let Some(casts) = self.casts {
            movie.casts = casts;
        }
        if let Some(genres) = self.genres {
            movie.genres = genres;
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(rating) = self.rating {
            movie.rating = rating;
        }
        if let Some(images) = self.images {
            movie.images = Some(images);
        }
        if let Some(alt) = self.alt {
            movie.alt = Some(alt);
        }
        if let Some(amount) = self.amount {
            movie.amount = amount;
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
