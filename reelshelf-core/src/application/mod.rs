//! Application services composed over the repository ports.

pub mod account_service;
pub mod catalog_service;
pub mod lending_service;
pub mod rbac_bootstrap;
pub mod unit_of_work;

pub use account_service::{
    AccountNotice, AccountNotifier, AccountService, AccountSettings, AuthToken,
};
pub use catalog_service::{CatalogService, ImportReport};
pub use lending_service::LendingService;
pub use rbac_bootstrap::RbacBootstrapService;
pub use unit_of_work::{AppUnitOfWork, AppUnitOfWorkBuilder};
