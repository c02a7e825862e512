//! Tab Store for tabhost.
//!
//! Persists the tab list and the current selection in SQLite so the registry
//! can be restored on cold start.

use std::sync::MutexGuard;

use rusqlite::{params, OptionalExtension};

use crate::database::{Database, SharedDatabase};
use crate::types::errors::StoreError;
use crate::types::tab::TabEntity;

/// Trait defining tab persistence operations.
pub trait TabStoreTrait {
    fn insert(&self, tab: &TabEntity) -> Result<(), StoreError>;
    fn update(&self, tab: &TabEntity) -> Result<(), StoreError>;
    fn delete(&self, tab_id: &str) -> Result<(), StoreError>;
    fn load(&self, tab_id: &str) -> Result<Option<TabEntity>, StoreError>;
    fn load_all(&self) -> Result<Vec<TabEntity>, StoreError>;
    fn set_selection(&self, tab_id: Option<&str>) -> Result<(), StoreError>;
    fn load_selection(&self) -> Result<Option<String>, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Tab store backed by the shared SQLite database.
#[derive(Clone)]
pub struct TabStore {
    db: SharedDatabase,
}

impl TabStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, StoreError> {
        self.db.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::DatabaseError(e.to_string())
}

fn row_to_tab(row: &rusqlite::Row<'_>) -> rusqlite::Result<TabEntity> {
    Ok(TabEntity {
        tab_id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        sequence: row.get::<_, i64>(3)? as u64,
    })
}

impl TabStoreTrait for TabStore {
    fn insert(&self, tab: &TabEntity) -> Result<(), StoreError> {
        self.lock()?
            .connection()
            .execute(
                "INSERT OR REPLACE INTO tabs (tab_id, url, title, sequence) VALUES (?1, ?2, ?3, ?4)",
                params![tab.tab_id, tab.url, tab.title, tab.sequence as i64],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn update(&self, tab: &TabEntity) -> Result<(), StoreError> {
        self.lock()?
            .connection()
            .execute(
                "UPDATE tabs SET url = ?1, title = ?2 WHERE tab_id = ?3",
                params![tab.url, tab.title, tab.tab_id],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn delete(&self, tab_id: &str) -> Result<(), StoreError> {
        let db = self.lock()?;
        let conn = db.connection();
        conn.execute(
            "UPDATE tab_selection SET tab_id = NULL WHERE tab_id = ?1",
            params![tab_id],
        )
        .map_err(db_err)?;
        conn.execute("DELETE FROM tabs WHERE tab_id = ?1", params![tab_id])
            .map_err(db_err)?;
        Ok(())
    }

    fn load(&self, tab_id: &str) -> Result<Option<TabEntity>, StoreError> {
        self.lock()?
            .connection()
            .query_row(
                "SELECT tab_id, url, title, sequence FROM tabs WHERE tab_id = ?1",
                params![tab_id],
                row_to_tab,
            )
            .optional()
            .map_err(db_err)
    }

    fn load_all(&self) -> Result<Vec<TabEntity>, StoreError> {
        let db = self.lock()?;
        let mut stmt = db
            .connection()
            .prepare("SELECT tab_id, url, title, sequence FROM tabs ORDER BY sequence ASC")
            .map_err(db_err)?;
        let rows = stmt.query_map([], row_to_tab).map_err(db_err)?;

        let mut tabs = Vec::new();
        for row in rows {
            tabs.push(row.map_err(db_err)?);
        }
        Ok(tabs)
    }

    fn set_selection(&self, tab_id: Option<&str>) -> Result<(), StoreError> {
        self.lock()?
            .connection()
            .execute(
                "INSERT INTO tab_selection (id, tab_id) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET tab_id = excluded.tab_id",
                params![tab_id],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn load_selection(&self) -> Result<Option<String>, StoreError> {
        let selection: Option<Option<String>> = self
            .lock()?
            .connection()
            .query_row("SELECT tab_id FROM tab_selection WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(db_err)?;
        Ok(selection.flatten())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let db = self.lock()?;
        let conn = db.connection();
        conn.execute("DELETE FROM tab_selection", []).map_err(db_err)?;
        conn.execute("DELETE FROM tabs", []).map_err(db_err)?;
        Ok(())
    }
}
