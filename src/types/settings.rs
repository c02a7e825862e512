use serde::{Deserialize, Serialize};

/// User-tunable behaviour of the browser shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellSettings {
    /// Delay before the soft keyboard is raised for the omnibar.
    pub keyboard_show_delay_ms: u64,
    /// Reopen the persisted tab list on cold start.
    pub restore_tabs_on_startup: bool,
    /// Close the tab switcher after a tab is deleted from it.
    pub close_switcher_on_delete: bool,
    /// Prefix for non-URL queries; the encoded query is appended.
    pub search_url: String,
    /// SQLite file name inside the platform data directory.
    pub database_file: String,
    /// Worker threads for background jobs (bookmark writes).
    pub background_workers: usize,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            keyboard_show_delay_ms: 300,
            restore_tabs_on_startup: true,
            close_switcher_on_delete: true,
            search_url: "https://duckduckgo.com/?q=".to_string(),
            database_file: "tabs.db".to_string(),
            background_workers: 2,
        }
    }
}
