//! SQLite implementations of storage interfaces.

mod user_store;

pub use user_store::SqliteUserStore;
