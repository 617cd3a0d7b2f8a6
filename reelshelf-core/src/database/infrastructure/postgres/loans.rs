use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use reelshelf_model::{Loan, Movie, MovieID, User, UserID};

use super::{
    map_write_error,
    rows::{LoanRow, MOVIE_COLUMNS, MovieRow, USER_COLUMNS, UserRow},
};
use crate::{
    database::ports::LoansRepository,
    error::{Result, ShelfError},
    ledger::{self, BorrowOutcome, LedgerReceipt, ReturnOutcome},
};

/// PostgreSQL-backed implementation of the `LoansRepository` port.
///
/// Both ledger operations lock the user row first and the movie row second,
/// so concurrent borrows of the last copy serialize on the movie row and
/// the loser observes the decremented stock.
#[derive(Clone, Debug)]
pub struct PostgresLoansRepository {
    pool: PgPool,
}

struct Locked {
    user: User,
    movie: Movie,
    borrowing: bool,
}

impl PostgresLoansRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn lock_pair(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserID,
        movie_id: MovieID,
    ) -> Result<Locked> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        let user = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.to_uuid())
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| ShelfError::NotFound(format!("user {user_id}")))?;

        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1 FOR UPDATE");
        let movie = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(movie_id.to_uuid())
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| ShelfError::NotFound(format!("movie {movie_id}")))?;

        let borrowing: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM loans WHERE user_id = $1 AND movie_id = $2)",
        )
        .bind(user_id.to_uuid())
        .bind(movie_id.to_uuid())
        .fetch_one(&mut **tx)
        .await?;

        Ok(Locked {
            user: user.into(),
            movie: movie.into(),
            borrowing,
        })
    }

    async fn write_counters(
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
        movie: &Movie,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET remaining_quota = $2 WHERE id = $1")
            .bind(user.id.to_uuid())
            .bind(user.remaining_quota)
            .execute(&mut **tx)
            .await?;
        sqlx::query("UPDATE movies SET amount = $2, counts = $3 WHERE id = $1")
            .bind(movie.id.to_uuid())
            .bind(movie.amount)
            .bind(movie.counts)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LoansRepository for PostgresLoansRepository {
    async fn borrow(
        &self,
        user_id: UserID,
        movie_id: MovieID,
    ) -> Result<LedgerReceipt<BorrowOutcome>> {
        let mut tx = self.pool().begin().await?;
        let Locked {
            mut user,
            mut movie,
            borrowing,
        } = Self::lock_pair(&mut tx, user_id, movie_id).await?;

        let outcome = ledger::apply_borrow(&mut user, &mut movie, borrowing)?;
        if let BorrowOutcome::Borrowed { loan } = &outcome {
            sqlx::query(
                "INSERT INTO loans (user_id, movie_id, borrowed_at) VALUES ($1, $2, $3)",
            )
            .bind(loan.user_id.to_uuid())
            .bind(loan.movie_id.to_uuid())
            .bind(loan.borrowed_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "Failed to record loan"))?;
            Self::write_counters(&mut tx, &user, &movie).await?;
        }
        tx.commit().await?;

        debug!(%user_id, %movie_id, ?outcome, "Borrow processed");
        Ok(LedgerReceipt {
            outcome,
            user,
            movie,
        })
    }

    async fn return_movie(
        &self,
        user_id: UserID,
        movie_id: MovieID,
    ) -> Result<LedgerReceipt<ReturnOutcome>> {
        let mut tx = self.pool().begin().await?;
        let Locked {
            mut user,
            mut movie,
            borrowing,
        } = Self::lock_pair(&mut tx, user_id, movie_id).await?;

        let outcome = ledger::apply_return(&mut user, &mut movie, borrowing);
        if outcome == ReturnOutcome::Returned {
            sqlx::query("DELETE FROM loans WHERE user_id = $1 AND movie_id = $2")
                .bind(user_id.to_uuid())
                .bind(movie_id.to_uuid())
                .execute(&mut *tx)
                .await?;
            Self::write_counters(&mut tx, &user, &movie).await?;
        }
        tx.commit().await?;

        debug!(%user_id, %movie_id, ?outcome, "Return processed");
        Ok(LedgerReceipt {
            outcome,
            user,
            movie,
        })
    }

    async fn is_borrowing(&self, user_id: UserID, movie_id: MovieID) -> Result<bool> {
        let borrowing = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM loans WHERE user_id = $1 AND movie_id = $2)",
        )
        .bind(user_id.to_uuid())
        .bind(movie_id.to_uuid())
        .fetch_one(self.pool())
        .await?;
        Ok(borrowing)
    }

    async fn borrowed_movies(&self, user_id: UserID) -> Result<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(
            r#"
            SELECT m.id, m.title, m.original_title, m.directors, m.casts,
                   m.genres, m.year, m.rating, m.images, m.alt, m.amount,
                   m.counts, m.created_at
            FROM loans l
            INNER JOIN movies m ON m.id = l.movie_id
            WHERE l.user_id = $1
            ORDER BY l.borrowed_at DESC
            "#,
        )
        .bind(user_id.to_uuid())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn loans_for_user(&self, user_id: UserID) -> Result<Vec<Loan>> {
        let rows = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT user_id, movie_id, borrowed_at
            FROM loans
            WHERE user_id = $1
            ORDER BY borrowed_at DESC
            "#,
        )
        .bind(user_id.to_uuid())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Loan::from).collect())
    }

    async fn count_loans_for_movie(&self, movie_id: MovieID) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE movie_id = $1")
            .bind(movie_id.to_uuid())
            .fetch_one(self.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
