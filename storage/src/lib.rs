//! Storage crate: durable state that must survive a restart.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`sqlite_pool`] – SqlitePoolManager
//! - [`whitelist_repo`] – WhitelistRepository, the SQLite [`dbot_core::Whitelist`]

mod error;
mod sqlite_pool;
mod whitelist_repo;

pub use error::StorageError;
pub use sqlite_pool::SqlitePoolManager;
pub use whitelist_repo::WhitelistRepository;
