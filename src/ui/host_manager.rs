//! Host Manager for tabhost.
//!
//! Explicit map from tab id to its [`SessionHost`]. Registry snapshots are
//! reconciled into it: unknown tabs get a host, removed tabs have theirs
//! destroyed, and exactly one host (the current tab's) is shown.

use std::collections::HashMap;

use tracing::debug;

use crate::types::tab::{TabEntity, TabsSnapshot};
use crate::ui::session_host::SessionHost;

/// Builds the host for a newly seen tab.
pub trait HostFactory {
    fn create_host(&mut self, tab: &TabEntity) -> SessionHost;
}

pub struct HostManager {
    factory: Box<dyn HostFactory>,
    hosts: HashMap<String, SessionHost>,
    current: Option<String>,
    last_applied: Option<TabsSnapshot>,
}

impl HostManager {
    pub fn new(factory: Box<dyn HostFactory>) -> Self {
        Self {
            factory,
            hosts: HashMap::new(),
            current: None,
            last_applied: None,
        }
    }

    /// Reconciles hosts with `snapshot`. Re-applying the last snapshot is a
    /// no-op. Returns whether anything was applied.
    pub fn apply(&mut self, snapshot: &TabsSnapshot) -> bool {
        if self.last_applied.as_ref() == Some(snapshot) {
            return false;
        }

        let removed: Vec<String> = self
            .hosts
            .keys()
            .filter(|id| !snapshot.contains(id))
            .cloned()
            .collect();
        for id in removed {
            if let Some(mut host) = self.hosts.remove(&id) {
                host.destroy();
            }
            if self.current.as_deref() == Some(id.as_str()) {
                self.current = None;
            }
        }

        for tab in &snapshot.tabs {
            if !self.hosts.contains_key(&tab.tab_id) {
                let mut host = self.factory.create_host(tab);
                host.hide();
                host.attach();
                // Restored tabs reopen their last page.
                if let Some(url) = tab.url.clone() {
                    host.controller_mut().navigate(url);
                }
                self.hosts.insert(tab.tab_id.clone(), host);
            }
        }

        if snapshot.current_key != self.current {
            if let Some(previous) = self.current.take() {
                if let Some(host) = self.hosts.get_mut(&previous) {
                    host.hide();
                }
            }
            if let Some(next) = snapshot.current_key.as_deref() {
                if let Some(host) = self.hosts.get_mut(next) {
                    host.show();
                    self.current = Some(next.to_string());
                }
            }
            debug!(current = ?self.current, "switched visible host");
        }

        self.last_applied = Some(snapshot.clone());
        true
    }

    /// Pumps every attached host; hidden hosts keep receiving state.
    pub fn pump_all(&mut self) {
        for host in self.hosts.values_mut() {
            host.pump();
        }
    }

    pub fn current_tab_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_host(&self) -> Option<&SessionHost> {
        self.current.as_deref().and_then(|id| self.hosts.get(id))
    }

    pub fn current_host_mut(&mut self) -> Option<&mut SessionHost> {
        let id = self.current.as_deref()?;
        self.hosts.get_mut(id)
    }

    pub fn host(&self, tab_id: &str) -> Option<&SessionHost> {
        self.hosts.get(tab_id)
    }

    pub fn host_mut(&mut self, tab_id: &str) -> Option<&mut SessionHost> {
        self.hosts.get_mut(tab_id)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &SessionHost> {
        self.hosts.values()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Process teardown.
    pub fn destroy_all(&mut self) {
        for (_, mut host) in self.hosts.drain() {
            host.destroy();
        }
        self.current = None;
        self.last_applied = None;
    }
}
