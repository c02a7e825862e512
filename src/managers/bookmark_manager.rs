//! Bookmark Manager for tabhost.
//!
//! Stores bookmarks confirmed in the add-bookmark dialog. Writes go through
//! [`BookmarkWriter`] so they run on a background worker and report back on
//! the UI queue.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::params;
use url::Url;
use uuid::Uuid;

use crate::database::SharedDatabase;
use crate::services::background::{BackgroundHandle, UiEvent};
use crate::types::bookmark::Bookmark;
use crate::types::errors::BookmarkError;

/// Trait defining bookmark operations.
pub trait BookmarkManagerTrait {
    fn add_bookmark(&self, url: &str, title: &str) -> Result<String, BookmarkError>;
    fn list_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError>;
}

/// Bookmark manager backed by the shared SQLite database.
#[derive(Clone)]
pub struct BookmarkManager {
    db: SharedDatabase,
}

impl BookmarkManager {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    fn add_bookmark(&self, url: &str, title: &str) -> Result<String, BookmarkError> {
        let valid = Url::parse(url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            return Err(BookmarkError::InvalidUrl(url.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let title = if title.trim().is_empty() { url } else { title };

        let db = self
            .db
            .lock()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        db.connection()
            .execute(
                "INSERT INTO bookmarks (id, url, title, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, url, title, Self::now()],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        Ok(id)
    }

    fn list_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        let db = self
            .db
            .lock()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        let mut stmt = db
            .connection()
            .prepare("SELECT id, url, title, created_at FROM bookmarks ORDER BY created_at ASC, rowid ASC")
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Bookmark {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    title: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        Ok(result)
    }
}

/// Saves bookmarks off the coordinating thread.
#[derive(Clone)]
pub struct BookmarkWriter {
    manager: BookmarkManager,
    background: BackgroundHandle,
}

impl BookmarkWriter {
    pub fn new(manager: BookmarkManager, background: BackgroundHandle) -> Self {
        Self {
            manager,
            background,
        }
    }

    /// Completion arrives as [`UiEvent::BookmarkSaved`] for `tab_id`.
    pub fn save(&self, tab_id: &str, title: &str, url: &str) {
        let manager = self.manager.clone();
        let tab_id = tab_id.to_string();
        let title = title.to_string();
        let url = url.to_string();
        self.background.run(
            move || manager.add_bookmark(&url, &title).map_err(|e| e.to_string()),
            move |result| UiEvent::BookmarkSaved { tab_id, result },
        );
    }
}
