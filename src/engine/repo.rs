//! Repositories: all database operations, one per table.

mod catalogs;
mod states;
mod tasks;
mod users;

pub use catalogs::CatalogRepo;
pub use states::StateRepo;
pub use tasks::TaskRepo;
pub use users::UserRepo;
