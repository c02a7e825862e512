//! tabhost UI layer.
//!
//! Hosts render per-tab view state into widgets supplied by the embedder
//! through the traits in [`chrome`]. Nothing here depends on a toolkit.

pub mod chrome;
pub mod host_manager;
pub mod session_host;
pub mod tab_switcher;
