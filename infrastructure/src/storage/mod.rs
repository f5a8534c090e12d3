//! SQLite-backed chat storage.
//!
//! [`Database`] owns the connection; [`SqliteChatStore`] implements the
//! application layer's [`ChatStore`](confab_application::ChatStore) port on
//! top of it.

mod db;
mod migrations;
mod repository;

pub use db::Database;
pub use repository::SqliteChatStore;
