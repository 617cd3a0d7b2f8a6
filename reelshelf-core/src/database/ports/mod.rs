//! Repository ports. Services depend on these traits only; the PostgreSQL
//! adapter and the in-memory store both implement every one of them.

pub mod loans;
pub mod movies;
pub mod roles;
pub mod users;

pub use loans::LoansRepository;
pub use movies::MoviesRepository;
pub use roles::RolesRepository;
pub use users::UsersRepository;
