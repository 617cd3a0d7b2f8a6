//! Persistence: repository ports and their implementations.

pub mod infrastructure;
pub mod ports;

pub use infrastructure::memory::InMemoryStore;
#[cfg(feature = "database")]
pub use infrastructure::postgres::{
    PostgresLoansRepository, PostgresMoviesRepository, PostgresRolesRepository,
    PostgresUsersRepository,
};
