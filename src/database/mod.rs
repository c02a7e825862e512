//! tabhost database layer.
//!
//! Provides SQLite connection management and schema migrations.
//!
//! # Usage
//!
//! ```no_run
//! use tabhost::database::Database;
//!
//! let db = Database::open("tabs.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

use std::sync::{Arc, Mutex};

pub mod connection;
pub mod migrations;

pub use connection::Database;

/// Database handle shared between the registry, bookmarks and background workers.
pub type SharedDatabase = Arc<Mutex<Database>>;

/// Wraps an opened database for sharing.
pub fn shared(db: Database) -> SharedDatabase {
    Arc::new(Mutex::new(db))
}
