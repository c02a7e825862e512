use serde::{Deserialize, Serialize};

/// A browsing tab as owned by the tab registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TabEntity {
    pub tab_id: String,
    pub url: Option<String>,
    pub title: Option<String>,
    /// Monotonic insertion counter; higher means added more recently.
    pub sequence: u64,
}

impl TabEntity {
    pub fn new(tab_id: impl Into<String>, sequence: u64) -> Self {
        Self {
            tab_id: tab_id.into(),
            url: None,
            title: None,
            sequence,
        }
    }

    /// Label shown in the tab switcher: title, then url, then a placeholder.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.url.as_deref())
            .unwrap_or("New Tab")
    }
}

/// Full state of the registry, published on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TabsSnapshot {
    pub tabs: Vec<TabEntity>,
    pub current_key: Option<String>,
}

impl TabsSnapshot {
    pub fn contains(&self, tab_id: &str) -> bool {
        self.tabs.iter().any(|t| t.tab_id == tab_id)
    }

    pub fn current(&self) -> Option<&TabEntity> {
        let key = self.current_key.as_deref()?;
        self.tabs.iter().find(|t| t.tab_id == key)
    }
}
