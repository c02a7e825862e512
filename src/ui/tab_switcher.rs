//! Tab Switcher for tabhost.
//!
//! Lists open tabs and lets the user add, select or delete one. It works on
//! the shared registry; the visible tab follows from the snapshot the
//! registry publishes afterwards.

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::managers::tab_registry::{self, SharedTabRegistry, TabRegistryTrait};
use crate::types::tab::{TabEntity, TabsSnapshot};

/// What the switcher screen should do after handling an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitcherOutcome {
    Close,
    Stay,
}

pub struct TabSwitcher {
    registry: SharedTabRegistry,
    updates: watch::Receiver<TabsSnapshot>,
    listing: TabsSnapshot,
    close_on_delete: bool,
}

impl TabSwitcher {
    pub fn new(registry: SharedTabRegistry, close_on_delete: bool) -> Self {
        let (updates, listing) = {
            let guard = tab_registry::lock(&registry);
            (guard.subscribe(), guard.snapshot())
        };
        Self {
            registry,
            updates,
            listing,
            close_on_delete,
        }
    }

    /// Picks up the latest registry snapshot. Returns whether it changed.
    pub fn refresh(&mut self) -> bool {
        if !self.updates.has_changed().unwrap_or(false) {
            return false;
        }
        self.listing = self.updates.borrow_and_update().clone();
        true
    }

    pub fn tabs(&self) -> &[TabEntity] {
        &self.listing.tabs
    }

    pub fn current_tab_id(&self) -> Option<&str> {
        self.listing.current_key.as_deref()
    }

    pub fn on_new(&mut self) -> SwitcherOutcome {
        let id = tab_registry::lock(&self.registry).add_new_and_select();
        debug!(tab_id = %id, "new tab from switcher");
        self.refresh();
        SwitcherOutcome::Close
    }

    pub fn on_select(&mut self, tab_id: &str) -> SwitcherOutcome {
        let loaded = {
            let mut registry = tab_registry::lock(&self.registry);
            registry.load_data(tab_id).map(|()| registry.select(tab_id))
        };
        self.refresh();
        match loaded {
            Ok(_) => SwitcherOutcome::Close,
            Err(e) => {
                warn!(tab_id, error = %e, "cannot select tab");
                SwitcherOutcome::Stay
            }
        }
    }

    pub fn on_delete(&mut self, tab_id: &str) -> SwitcherOutcome {
        let deleted = tab_registry::lock(&self.registry).delete(tab_id);
        self.refresh();
        if deleted && self.close_on_delete {
            SwitcherOutcome::Close
        } else {
            SwitcherOutcome::Stay
        }
    }
}
