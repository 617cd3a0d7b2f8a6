use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "database")]
use sqlx::PgPool;

use crate::database::{
    infrastructure::memory::InMemoryStore,
    ports::{LoansRepository, MoviesRepository, RolesRepository, UsersRepository},
};
#[cfg(feature = "database")]
use crate::database::infrastructure::postgres::{
    PostgresLoansRepository, PostgresMoviesRepository, PostgresRolesRepository,
    PostgresUsersRepository,
};

/// Aggregates every repository port used by the application services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub users: Arc<dyn UsersRepository>,
    pub roles: Arc<dyn RolesRepository>,
    pub movies: Arc<dyn MoviesRepository>,
    pub loans: Arc<dyn LoansRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("roles", &type_name_of_val(self.roles.as_ref()))
            .field("movies", &type_name_of_val(self.movies.as_ref()))
            .field("loans", &type_name_of_val(self.loans.as_ref()))
            .finish()
    }
}

#[derive(Default)]
pub struct AppUnitOfWorkBuilder {
    users: Option<Arc<dyn UsersRepository>>,
    roles: Option<Arc<dyn RolesRepository>>,
    movies: Option<Arc<dyn MoviesRepository>>,
    loans: Option<Arc<dyn LoansRepository>>,
}

impl fmt::Debug for AppUnitOfWorkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWorkBuilder")
            .field("users", &self.users.is_some())
            .field("roles", &self.roles.is_some())
            .field("movies", &self.movies.is_some())
            .field("loans", &self.loans.is_some())
            .finish()
    }
}

impl AppUnitOfWorkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(mut self, repo: Arc<dyn UsersRepository>) -> Self {
        self.users = Some(repo);
        self
    }
    pub fn with_roles(mut self, repo: Arc<dyn RolesRepository>) -> Self {
        self.roles = Some(repo);
        self
    }
    pub fn with_movies(mut self, repo: Arc<dyn MoviesRepository>) -> Self {
        self.movies = Some(repo);
        self
    }
    pub fn with_loans(mut self, repo: Arc<dyn LoansRepository>) -> Self {
        self.loans = Some(repo);
        self
    }

    /// Point every port at one in-memory store.
    pub fn with_memory(self, store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        self.with_users(store.clone())
            .with_roles(store.clone())
            .with_movies(store.clone())
            .with_loans(store)
    }

    pub fn build(self) -> Result<AppUnitOfWork, String> {
        Ok(AppUnitOfWork {
            users: self
                .users
                .ok_or_else(|| "missing UsersRepository".to_string())?,
            roles: self
                .roles
                .ok_or_else(|| "missing RolesRepository".to_string())?,
            movies: self
                .movies
                .ok_or_else(|| "missing MoviesRepository".to_string())?,
            loans: self
                .loans
                .ok_or_else(|| "missing LoansRepository".to_string())?,
        })
    }
}

#[cfg(feature = "database")]
impl AppUnitOfWorkBuilder {
    /// Populate the builder with Postgres-backed repository adapters.
    pub fn with_postgres(self, pool: PgPool) -> Self {
        self.with_users(Arc::new(PostgresUsersRepository::new(pool.clone())))
            .with_roles(Arc::new(PostgresRolesRepository::new(pool.clone())))
            .with_movies(Arc::new(PostgresMoviesRepository::new(pool.clone())))
            .with_loans(Arc::new(PostgresLoansRepository::new(pool)))
    }
}

impl AppUnitOfWork {
    pub fn builder() -> AppUnitOfWorkBuilder {
        AppUnitOfWorkBuilder::new()
    }

    /// All ports backed by a fresh [`InMemoryStore`].
    pub fn in_memory() -> Self {
        Self::from_memory(InMemoryStore::new())
    }

    pub fn from_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            roles: store.clone(),
            movies: store.clone(),
            loans: store,
        }
    }

    #[cfg(feature = "database")]
    pub fn from_postgres(pool: PgPool) -> Result<Self, String> {
        AppUnitOfWorkBuilder::new().with_postgres(pool).build()
    }
}
