//! Tab Registry for tabhost.
//!
//! Owns the ordered set of open tabs and the current selection. Every mutation
//! publishes the full [`TabsSnapshot`] on a watch channel so observers can
//! re-render from an authoritative state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::managers::tab_store::TabStoreTrait;
use crate::types::errors::{StoreError, TabError};
use crate::types::tab::{TabEntity, TabsSnapshot};

/// Registry handle shared by the browser shell and the tab switcher.
/// The mutex serialises add/select/delete.
pub type SharedTabRegistry = Arc<Mutex<TabRegistry>>;

/// Locks a shared registry. A panic while holding the lock never leaves the
/// tab list half-mutated, so a poisoned lock is recovered.
pub fn lock(registry: &SharedTabRegistry) -> MutexGuard<'_, TabRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Trait defining the tab registry interface.
pub trait TabRegistryTrait {
    fn add_new_and_select(&mut self) -> String;
    fn select(&mut self, tab_id: &str) -> bool;
    fn delete(&mut self, tab_id: &str) -> bool;
    fn load_data(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn update_tab(&mut self, tab_id: &str, url: Option<&str>, title: Option<&str>) -> Result<(), TabError>;
    fn tabs(&self) -> &[TabEntity];
    fn current_tab_id(&self) -> Option<&str>;
    fn tab_count(&self) -> usize;
    fn snapshot(&self) -> TabsSnapshot;
    fn subscribe(&self) -> watch::Receiver<TabsSnapshot>;
}

/// In-memory tab registry, optionally mirrored to a persistent store.
pub struct TabRegistry {
    tabs: Vec<TabEntity>,
    current: Option<String>,
    next_sequence: u64,
    store: Option<Box<dyn TabStoreTrait + Send>>,
    notifier: watch::Sender<TabsSnapshot>,
}

impl TabRegistry {
    pub fn new() -> Self {
        let (notifier, _) = watch::channel(TabsSnapshot::default());
        Self {
            tabs: Vec::new(),
            current: None,
            next_sequence: 0,
            store: None,
            notifier,
        }
    }

    /// Starts empty, discarding whatever `store` held, and writes through
    /// to it from now on.
    pub fn with_store(store: Box<dyn TabStoreTrait + Send>) -> Result<Self, StoreError> {
        store.clear()?;
        let mut registry = Self::new();
        registry.store = Some(store);
        Ok(registry)
    }

    /// Restores the registry from a store and keeps writing through to it.
    ///
    /// A persisted selection that does not reference a restored tab is
    /// discarded rather than published.
    pub fn restore(store: Box<dyn TabStoreTrait + Send>) -> Result<Self, StoreError> {
        let tabs = store.load_all()?;
        let mut current = store.load_selection()?;

        let dangling = current
            .as_deref()
            .is_some_and(|id| !tabs.iter().any(|t| t.tab_id == id));
        if dangling {
            if let Some(id) = current.take() {
                warn!(error = %TabError::DanglingSelection(id), "discarding persisted selection");
            }
            store.set_selection(None)?;
        }

        let next_sequence = tabs.iter().map(|t| t.sequence + 1).max().unwrap_or(0);
        debug!(tabs = tabs.len(), current = ?current, "restored tab registry");

        let snapshot = TabsSnapshot {
            tabs: tabs.clone(),
            current_key: current.clone(),
        };
        let (notifier, _) = watch::channel(snapshot);

        Ok(Self {
            tabs,
            current,
            next_sequence,
            store: Some(store),
            notifier,
        })
    }

    /// Wraps the registry for sharing across the shell.
    pub fn into_shared(self) -> SharedTabRegistry {
        Arc::new(Mutex::new(self))
    }

    fn find_index(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.tab_id == tab_id)
    }

    fn publish(&self) {
        self.notifier.send_replace(self.snapshot());
    }

    /// Runs a write against the store; failures keep the in-memory state.
    fn persist<F>(&self, op: &str, write: F)
    where
        F: FnOnce(&dyn TabStoreTrait) -> Result<(), StoreError>,
    {
        if let Some(store) = self.store.as_deref() {
            if let Err(e) = write(store) {
                warn!(op, error = %e, "tab store write failed");
            }
        }
    }
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TabRegistryTrait for TabRegistry {
    /// Appends a fresh tab and makes it current. Returns the new tab's ID.
    fn add_new_and_select(&mut self) -> String {
        let tab = TabEntity::new(Uuid::new_v4().to_string(), self.next_sequence);
        self.next_sequence += 1;
        let id = tab.tab_id.clone();

        self.persist("insert", |s| s.insert(&tab));
        self.tabs.push(tab);
        self.current = Some(id.clone());
        self.persist("select", |s| s.set_selection(Some(&id)));

        debug!(tab_id = %id, count = self.tabs.len(), "added tab");
        self.publish();
        id
    }

    /// Makes `tab_id` current. Unknown IDs are ignored and return `false`.
    fn select(&mut self, tab_id: &str) -> bool {
        if self.find_index(tab_id).is_none() {
            debug!(tab_id, "select ignored: no such tab");
            return false;
        }
        if self.current.as_deref() == Some(tab_id) {
            return true;
        }

        self.current = Some(tab_id.to_string());
        self.persist("select", |s| s.set_selection(Some(tab_id)));
        self.publish();
        true
    }

    /// Removes a tab. If it was current, the most recently added remaining
    /// tab becomes current, or nothing when the registry is empty.
    fn delete(&mut self, tab_id: &str) -> bool {
        let Some(idx) = self.find_index(tab_id) else {
            debug!(tab_id, "delete ignored: no such tab");
            return false;
        };

        self.tabs.remove(idx);
        self.persist("delete", |s| s.delete(tab_id));

        if self.current.as_deref() == Some(tab_id) {
            self.current = self
                .tabs
                .iter()
                .max_by_key(|t| t.sequence)
                .map(|t| t.tab_id.clone());
            let current = self.current.clone();
            self.persist("select", |s| s.set_selection(current.as_deref()));
        }

        debug!(tab_id, current = ?self.current, "deleted tab");
        self.publish();
        true
    }

    /// Refreshes a tab's url/title from the store before it is shown.
    fn load_data(&mut self, tab_id: &str) -> Result<(), TabError> {
        let idx = self
            .find_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        let Some(store) = self.store.as_deref() else {
            return Ok(());
        };

        match store.load(tab_id) {
            Ok(Some(stored)) => {
                let tab = &mut self.tabs[idx];
                if tab.url != stored.url || tab.title != stored.title {
                    tab.url = stored.url;
                    tab.title = stored.title;
                    self.publish();
                }
            }
            Ok(None) => debug!(tab_id, "no stored data for tab"),
            Err(e) => warn!(tab_id, error = %e, "failed to load tab data"),
        }
        Ok(())
    }

    /// Records the latest url/title of a tab.
    fn update_tab(&mut self, tab_id: &str, url: Option<&str>, title: Option<&str>) -> Result<(), TabError> {
        let idx = self
            .find_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        let tab = &mut self.tabs[idx];
        let url = url.map(str::to_string);
        let title = title.map(str::to_string);
        if tab.url == url && tab.title == title {
            return Ok(());
        }
        tab.url = url;
        tab.title = title;

        let updated = tab.clone();
        self.persist("update", |s| s.update(&updated));
        self.publish();
        Ok(())
    }

    fn tabs(&self) -> &[TabEntity] {
        &self.tabs
    }

    fn current_tab_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn snapshot(&self) -> TabsSnapshot {
        TabsSnapshot {
            tabs: self.tabs.clone(),
            current_key: self.current.clone(),
        }
    }

    fn subscribe(&self) -> watch::Receiver<TabsSnapshot> {
        self.notifier.subscribe()
    }
}
