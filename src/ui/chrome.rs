//! Seams between a tab host and the world it draws into.
//!
//! Hosts never look up their container; everything they touch is handed to
//! them through these traits at construction.

use std::time::Duration;

use crate::types::command::{ExternalIntent, FullScreenHandle};
use crate::types::render::AutoCompleteSuggestion;

/// Items of the toolbar and the overflow popup menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    PrivacyDashboard,
    Fire,
    Back,
    Forward,
    Refresh,
    Tabs,
    NewTab,
    Bookmarks,
    AddBookmark,
    Settings,
}

/// Short-lived user-facing message (toast / snackbar).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DownloadStarted(String),
    PermissionRequiredToDownload,
    BookmarkAdded,
    BookmarkFailed,
}

/// The platform web view a host wraps.
pub trait WebEngine {
    fn load_url(&mut self, url: &str);
    fn reload(&mut self);
    fn go_back(&mut self);
    fn go_forward(&mut self);
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
    fn clear_history(&mut self);
    fn title(&self) -> Option<String>;
    fn url(&self) -> Option<String>;
    fn destroy(&mut self);
}

/// Widgets owned by one tab host.
pub trait TabChrome {
    fn set_host_visible(&mut self, visible: bool);
    fn set_browser_visible(&mut self, visible: bool);
    fn set_loading_indicator_visible(&mut self, visible: bool);
    fn set_progress(&mut self, progress: u8);

    fn omnibar_text(&self) -> String;
    fn omnibar_has_focus(&self) -> bool;
    fn set_omnibar_text(&mut self, text: &str);
    fn move_omnibar_cursor_to_end(&mut self);
    fn expand_app_bar(&mut self);
    fn set_clear_button_visible(&mut self, visible: bool);

    fn set_privacy_grade_visible(&mut self, visible: bool);
    fn set_privacy_grade_icon(&mut self, icon: &'static str);
    fn set_fire_button_visible(&mut self, visible: bool);
    fn set_menu_item_enabled(&mut self, item: MenuItem, enabled: bool);

    /// Replaces the whole list and makes it visible.
    fn show_suggestions(&mut self, suggestions: &[AutoCompleteSuggestion]);
    /// Hides the list and drops its rows.
    fn hide_suggestions(&mut self);

    fn show_full_screen_container(&mut self);
    /// Removes any full-screen content and hides the container.
    fn hide_full_screen_container(&mut self);
    fn add_full_screen_content(&mut self, handle: FullScreenHandle);

    fn show_keyboard(&mut self, delay: Duration);
    fn hide_keyboard(&mut self);
    /// Moves focus off the omnibar onto an inert view.
    fn focus_dummy(&mut self);

    fn show_add_bookmark_dialog(&mut self, title: Option<String>, url: Option<String>);
    fn show_notice(&mut self, notice: Notice);
}

/// Shell-level capabilities a host may trigger.
pub trait TabChromeActions {
    fn launch_tab_switcher(&self);
    fn launch_new_tab(&self);
    fn launch_bookmarks(&self);
    fn launch_settings(&self);
    fn launch_privacy_dashboard(&self, tab_id: &str);
    fn launch_fire(&self);
    fn toggle_full_screen(&self);
    fn launch_external(&self, intent: ExternalIntent);
}
