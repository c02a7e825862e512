// tabhost state managers
// Managers own per-tab and cross-tab state: the registry, its store, controllers, commands, downloads, bookmarks.

pub mod bookmark_manager;
pub mod command_channel;
pub mod download_manager;
pub mod session_controller;
pub mod tab_registry;
pub mod tab_store;
