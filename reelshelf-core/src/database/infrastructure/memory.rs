//! Process-local store implementing every repository port.
//!
//! All tables sit behind one async mutex, so each port call is atomic with
//! respect to every other call. The server falls back to this store when no
//! database is configured, and the integration tests run against it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use reelshelf_model::{
    Loan, Movie, MovieID, MovieUpdate, Page, PageRequest, Role, RoleID, User,
    UserID,
};

use crate::{
    catalog,
    database::ports::{
        LoansRepository, MoviesRepository, RolesRepository, UsersRepository,
    },
    error::{Result, ShelfError},
    ledger::{self, BorrowOutcome, LedgerReceipt, ReturnOutcome},
    rbac::{RoleSeed, validate_seeds},
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserID, User>,
    roles: HashMap<RoleID, Role>,
    movies: HashMap<MovieID, Movie>,
    loans: HashMap<(UserID, MovieID), Loan>,
}

impl Tables {
    fn user(&self, id: UserID) -> Result<User> {
        self.users
            .get(&id)
            .cloned()
            .ok_or_else(|| ShelfError::NotFound(format!("user {id}")))
    }

    fn movie(&self, id: MovieID) -> Result<Movie> {
        self.movies
            .get(&id)
            .cloned()
            .ok_or_else(|| ShelfError::NotFound(format!("movie {id}")))
    }

    fn check_user_unique(&self, user: &User) -> Result<()> {
        for other in self.users.values().filter(|other| other.id != user.id) {
            if other.email == user.email {
                return Err(ShelfError::Conflict(
                    "email already registered".into(),
                ));
            }
            if other.username == user.username {
                return Err(ShelfError::Conflict("username already taken".into()));
            }
        }
        Ok(())
    }

    fn check_movie_unique(&self, movie: &Movie) -> Result<()> {
        let clash = self.movies.values().any(|other| {
            other.id != movie.id
                && (other.title == movie.title
                    || other.original_title == movie.original_title)
        });
        if clash {
            return Err(ShelfError::Conflict(format!(
                "movie {} already exists",
                movie.title
            )));
        }
        Ok(())
    }
}

/// Sort by rating (highest first), then title, and cut out one page.
fn catalog_page(mut movies: Vec<&Movie>, request: PageRequest) -> Page<Movie> {
    movies.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| a.title.cmp(&b.title))
    });

    let total = movies.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let items = movies
        .into_iter()
        .skip(offset)
        .take(request.per_page as usize)
        .cloned()
        .collect();

    Page::new(items, total, request)
}

/// Shared handle; clones see the same tables.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersRepository for InMemoryStore {
    async fn create_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.users.contains_key(&user.id) {
            return Err(ShelfError::Conflict(format!("user {} exists", user.id)));
        }
        tables.check_user_unique(user)?;
        tables.users.insert(user.id, user.clone());

        info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(())
    }

    async fn get_user_by_id(&self, id: UserID) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let quota = tables.user(user.id)?.remaining_quota;
        tables.check_user_unique(user)?;

        let mut stored = user.clone();
        stored.remaining_quota = quota;
        tables.users.insert(user.id, stored);
        Ok(())
    }
}

#[async_trait]
impl RolesRepository for InMemoryStore {
    async fn reconcile_roles(&self, seeds: &[RoleSeed]) -> Result<Vec<Role>> {
        validate_seeds(seeds)?;
        let mut tables = self.tables.lock().await;

        for role in tables.roles.values_mut() {
            role.is_default = false;
        }

        let mut reconciled = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let existing = tables
                .roles
                .values_mut()
                .find(|role| role.name == seed.name);
            let role = match existing {
                Some(role) => {
                    role.permissions = seed.permissions;
                    role.is_default = seed.is_default;
                    role.clone()
                }
                None => {
                    let role = Role {
                        id: RoleID::new(),
                        name: seed.name.clone(),
                        is_default: seed.is_default,
                        permissions: seed.permissions,
                    };
                    tables.roles.insert(role.id, role.clone());
                    role
                }
            };
            reconciled.push(role);
        }

        debug!(count = reconciled.len(), "Reconciled roles");
        Ok(reconciled)
    }

    async fn get_role(&self, id: RoleID) -> Result<Option<Role>> {
        Ok(self.tables.lock().await.roles.get(&id).cloned())
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let tables = self.tables.lock().await;
        Ok(tables.roles.values().find(|role| role.name == name).cloned())
    }

    async fn get_default_role(&self) -> Result<Option<Role>> {
        let tables = self.tables.lock().await;
        Ok(tables.roles.values().find(|role| role.is_default).cloned())
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        let tables = self.tables.lock().await;
        let mut roles: Vec<Role> = tables.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }
}

#[async_trait]
impl MoviesRepository for InMemoryStore {
    async fn create_movie(&self, movie: &Movie) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.check_movie_unique(movie)?;
        tables.movies.insert(movie.id, movie.clone());

        info!(movie_id = %movie.id, title = %movie.title, "Created movie");
        Ok(())
    }

    async fn get_movie(&self, id: MovieID) -> Result<Option<Movie>> {
        Ok(self.tables.lock().await.movies.get(&id).cloned())
    }

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .movies
            .values()
            .find(|movie| movie.title == title)
            .cloned())
    }

    async fn list_movies(&self, request: PageRequest) -> Result<Page<Movie>> {
        let tables = self.tables.lock().await;
        Ok(catalog_page(tables.movies.values().collect(), request))
    }

    async fn search_movies(&self, query: &str, request: PageRequest) -> Result<Page<Movie>> {
        let tables = self.tables.lock().await;
        let hits = tables
            .movies
            .values()
            .filter(|movie| catalog::matches_query(movie, query))
            .collect();
        Ok(catalog_page(hits, request))
    }

    async fn update_movie(&self, id: MovieID, update: MovieUpdate) -> Result<Movie> {
        let mut tables = self.tables.lock().await;
        let mut movie = tables.movie(id)?;
        catalog::apply_update(&mut movie, update)?;
        tables.check_movie_unique(&movie)?;

        tables.movies.insert(id, movie.clone());
        debug!(movie_id = %id, amount = movie.amount, "Updated movie");
        Ok(movie)
    }

    async fn delete_movie(&self, id: MovieID) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let movie = tables.movie(id)?;
        if tables.loans.keys().any(|(_, movie_id)| *movie_id == id) {
            return Err(ShelfError::Conflict(format!(
                "movie {} is still on loan",
                movie.title
            )));
        }
        tables.movies.remove(&id);

        info!(movie_id = %id, title = %movie.title, "Deleted movie");
        Ok(())
    }
}

#[async_trait]
impl LoansRepository for InMemoryStore {
    async fn borrow(
        &self,
        user_id: UserID,
        movie_id: MovieID,
    ) -> Result<LedgerReceipt<BorrowOutcome>> {
        let mut tables = self.tables.lock().await;
        let mut user = tables.user(user_id)?;
        let mut movie = tables.movie(movie_id)?;
        let borrowing = tables.loans.contains_key(&(user_id, movie_id));

        let outcome = ledger::apply_borrow(&mut user, &mut movie, borrowing)?;
        if let BorrowOutcome::Borrowed { loan } = &outcome {
            tables.loans.insert((user_id, movie_id), loan.clone());
            tables.users.insert(user_id, user.clone());
            tables.movies.insert(movie_id, movie.clone());
            debug!(%user_id, %movie_id, amount = movie.amount, "Borrowed movie");
        }

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
        let mut tables = self.tables.lock().await;
        let mut user = tables.user(user_id)?;
        let mut movie = tables.movie(movie_id)?;
        let borrowing = tables.loans.contains_key(&(user_id, movie_id));

        let outcome = ledger::apply_return(&mut user, &mut movie, borrowing);
        if outcome == ReturnOutcome::Returned {
            tables.loans.remove(&(user_id, movie_id));
            tables.users.insert(user_id, user.clone());
            tables.movies.insert(movie_id, movie.clone());
            debug!(%user_id, %movie_id, amount = movie.amount, "Returned movie");
        }

        Ok(LedgerReceipt {
            outcome,
            user,
            movie,
        })
    }

    async fn is_borrowing(&self, user_id: UserID, movie_id: MovieID) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.loans.contains_key(&(user_id, movie_id)))
    }

    async fn borrowed_movies(&self, user_id: UserID) -> Result<Vec<Movie>> {
        let tables = self.tables.lock().await;
        let mut loans: Vec<&Loan> = tables
            .loans
            .values()
            .filter(|loan| loan.user_id == user_id)
            .collect();
        loans.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));

        Ok(loans
            .into_iter()
            .filter_map(|loan| tables.movies.get(&loan.movie_id).cloned())
            .collect())
    }

    async fn loans_for_user(&self, user_id: UserID) -> Result<Vec<Loan>> {
        let tables = self.tables.lock().await;
        let mut loans: Vec<Loan> = tables
            .loans
            .values()
            .filter(|loan| loan.user_id == user_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));
        Ok(loans)
    }

    async fn count_loans_for_movie(&self, movie_id: MovieID) -> Result<u64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .loans
            .keys()
            .filter(|(_, id)| *id == movie_id)
            .count() as u64)
    }
}
