use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use reelshelf_model::{Loan, Movie, Permissions, Role, User};

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    role_id: Option<Uuid>,
    confirmed: bool,
    remaining_quota: i32,
    avatar_url: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id.into(),
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            role_id: row.role_id.map(Into::into),
            confirmed: row.confirmed,
            remaining_quota: row.remaining_quota,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct RoleRow {
    id: Uuid,
    name: String,
    is_default: bool,
    permissions: i32,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: row.id.into(),
            name: row.name,
            is_default: row.is_default,
            permissions: Permissions::from_bits(row.permissions),
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct MovieRow {
    id: Uuid,
    title: String,
    original_title: String,
    directors: String,
    casts: String,
    genres: String,
    year: i32,
    rating: f64,
    images: Option<String>,
    alt: Option<String>,
    amount: i32,
    counts: i32,
    created_at: DateTime<Utc>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id.into(),
            title: row.title,
            original_title: row.original_title,
            directors: row.directors,
            casts: row.casts,
            genres: row.genres,
            year: row.year,
            rating: row.rating,
            images: row.images,
            alt: row.alt,
            amount: row.amount,
            counts: row.counts,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct LoanRow {
    user_id: Uuid,
    movie_id: Uuid,
    borrowed_at: DateTime<Utc>,
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Loan {
            user_id: row.user_id.into(),
            movie_id: row.movie_id.into(),
            borrowed_at: row.borrowed_at,
        }
    }
}

pub(super) const USER_COLUMNS: &str = "id, email, username, password_hash, role_id, \
     confirmed, remaining_quota, avatar_url, created_at";

pub(super) const MOVIE_COLUMNS: &str = "id, title, original_title, directors, casts, \
     genres, year, rating, images, alt, amount, counts, created_at";
