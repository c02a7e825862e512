//! Session Host for tabhost.
//!
//! The UI container bound to exactly one tab. It applies [`ViewState`]
//! snapshots to its widgets without fighting the user, executes the tab's
//! one-shot commands and forwards input back to the tab's controller.

use std::rc::Rc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::managers::bookmark_manager::BookmarkWriter;
use crate::managers::command_channel::CommandReceiver;
use crate::managers::download_manager::{DownloadManager, DownloadManagerTrait, DownloadOutcome};
use crate::managers::session_controller::{SessionController, SessionControllerTrait};
use crate::types::command::{Command, DownloadDestination, ExternalIntent};
use crate::types::errors::DownloadError;
use crate::types::render::ViewState;
use crate::ui::chrome::{MenuItem, Notice, TabChrome, TabChromeActions, WebEngine};

/// Lifecycle of a host. Hidden/shown is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostLifecycle {
    Created,
    Attached,
    Detached,
    Destroyed,
}

/// Collaborators a host is built with.
pub struct HostParts {
    pub chrome: Box<dyn TabChrome>,
    pub engine: Box<dyn WebEngine>,
    pub actions: Rc<dyn TabChromeActions>,
    pub downloads: DownloadManager,
    pub bookmarks: Option<BookmarkWriter>,
    pub keyboard_delay: Duration,
}

pub struct SessionHost {
    tab_id: String,
    controller: SessionController,
    chrome: Box<dyn TabChrome>,
    engine: Box<dyn WebEngine>,
    actions: Rc<dyn TabChromeActions>,
    downloads: DownloadManager,
    bookmarks: Option<BookmarkWriter>,
    keyboard_delay: Duration,
    lifecycle: HostLifecycle,
    visible: bool,
    accepting_render_updates: bool,
    full_screen_active: bool,
    state_updates: Option<watch::Receiver<ViewState>>,
    commands: Option<CommandReceiver>,
}

impl SessionHost {
    pub fn new(controller: SessionController, parts: HostParts) -> Self {
        Self {
            tab_id: controller.tab_id().to_string(),
            controller,
            chrome: parts.chrome,
            engine: parts.engine,
            actions: parts.actions,
            downloads: parts.downloads,
            bookmarks: parts.bookmarks,
            keyboard_delay: parts.keyboard_delay,
            lifecycle: HostLifecycle::Created,
            visible: false,
            accepting_render_updates: true,
            full_screen_active: false,
            state_updates: None,
            commands: None,
        }
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    pub fn lifecycle(&self) -> HostLifecycle {
        self.lifecycle
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_accepting_render_updates(&self) -> bool {
        self.accepting_render_updates
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen_active
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SessionController {
        &mut self.controller
    }

    pub fn engine(&self) -> &dyn WebEngine {
        self.engine.as_ref()
    }

    // === Lifecycle ===

    /// Starts observing the controller. The current snapshot is rendered on
    /// the next [`pump`](Self::pump); earlier commands are not replayed.
    pub fn attach(&mut self) {
        match self.lifecycle {
            HostLifecycle::Created | HostLifecycle::Detached => {
                let mut updates = self.controller.subscribe();
                updates.mark_changed();
                self.state_updates = Some(updates);
                self.commands = Some(self.controller.attach_commands());
                self.lifecycle = HostLifecycle::Attached;
                debug!(tab_id = %self.tab_id, "host attached");
            }
            HostLifecycle::Attached => {}
            HostLifecycle::Destroyed => {
                warn!(tab_id = %self.tab_id, "attach ignored: host destroyed");
            }
        }
    }

    /// Stops observing; anything still queued for this host is dropped.
    pub fn detach(&mut self) {
        if self.lifecycle != HostLifecycle::Attached {
            return;
        }
        self.state_updates = None;
        self.commands = None;
        self.controller.detach_commands();
        self.lifecycle = HostLifecycle::Detached;
        debug!(tab_id = %self.tab_id, "host detached");
    }

    pub fn destroy(&mut self) {
        if self.lifecycle == HostLifecycle::Destroyed {
            return;
        }
        if self.full_screen_active {
            self.exit_full_screen();
        }
        self.detach();
        self.chrome.hide_full_screen_container();
        self.engine.destroy();
        self.lifecycle = HostLifecycle::Destroyed;
        debug!(tab_id = %self.tab_id, "host destroyed");
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.chrome.set_host_visible(true);
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.chrome.set_host_visible(false);
    }

    /// Applies the latest snapshot (if new) and runs waiting commands.
    pub fn pump(&mut self) {
        if self.lifecycle != HostLifecycle::Attached {
            return;
        }

        let snapshot = match self.state_updates.as_mut() {
            Some(updates) if updates.has_changed().unwrap_or(false) => {
                Some(updates.borrow_and_update().clone())
            }
            _ => None,
        };
        if let Some(state) = snapshot {
            self.render(&state);
        }

        let commands = self
            .commands
            .as_mut()
            .map(CommandReceiver::drain)
            .unwrap_or_default();
        for command in commands {
            self.process_command(command);
        }
    }

    // === Rendering ===

    pub fn stop_render_updates(&mut self) {
        self.accepting_render_updates = false;
    }

    /// Re-enables rendering; the latest snapshot is applied on the next pump.
    pub fn resume_render_updates(&mut self) {
        self.accepting_render_updates = true;
        if let Some(updates) = self.state_updates.as_mut() {
            updates.mark_changed();
        }
    }

    fn should_update_omnibar_text(&self, state: &ViewState) -> bool {
        match state.omnibar_text.as_deref() {
            Some(text) => !state.is_editing && self.chrome.omnibar_text() != text,
            None => false,
        }
    }

    /// Reconciles the widgets with `state`.
    pub fn render(&mut self, state: &ViewState) {
        if !self.accepting_render_updates {
            debug!(tab_id = %self.tab_id, "render skipped: updates stopped");
            return;
        }
        debug!(tab_id = %self.tab_id, ?state, "Rendering view state");

        self.chrome.set_browser_visible(state.browser_showing);
        self.chrome.set_loading_indicator_visible(state.is_loading);

        if self.should_update_omnibar_text(state) {
            if let Some(text) = state.omnibar_text.as_deref() {
                self.chrome.set_omnibar_text(text);
                self.chrome.move_omnibar_cursor_to_end();
                self.chrome.expand_app_bar();
            }
        }

        self.chrome.set_progress(state.progress);
        self.chrome.set_clear_button_visible(state.show_clear_button);

        self.chrome.set_privacy_grade_visible(state.show_privacy_grade);
        if let Some(grade) = state.privacy_grade {
            self.chrome.set_privacy_grade_icon(grade.icon());
        }
        self.chrome.set_fire_button_visible(state.show_fire_button);

        let can_go_back = state.browser_showing && self.engine.can_go_back();
        let can_go_forward = state.browser_showing && self.engine.can_go_forward();
        self.chrome.set_menu_item_enabled(MenuItem::Back, can_go_back);
        self.chrome.set_menu_item_enabled(MenuItem::Forward, can_go_forward);
        self.chrome.set_menu_item_enabled(MenuItem::Refresh, state.browser_showing);
        self.chrome.set_menu_item_enabled(MenuItem::AddBookmark, state.can_add_bookmarks);

        if state.show_auto_complete_suggestions {
            self.chrome.show_suggestions(&state.auto_complete_suggestions);
        } else {
            self.chrome.hide_suggestions();
        }

        match (state.is_full_screen, self.full_screen_active) {
            (true, false) => self.enter_full_screen(),
            (false, true) => self.exit_full_screen(),
            _ => {}
        }
    }

    fn enter_full_screen(&mut self) {
        info!(tab_id = %self.tab_id, "Entering full screen");
        self.full_screen_active = true;
        self.chrome.show_full_screen_container();
        self.actions.toggle_full_screen();
    }

    fn exit_full_screen(&mut self) {
        info!(tab_id = %self.tab_id, "Exiting full screen");
        self.full_screen_active = false;
        self.chrome.hide_full_screen_container();
        self.actions.toggle_full_screen();
    }

    /// Blanks the tab ahead of a dismissal animation and ignores later
    /// snapshots until [`resume_render_updates`](Self::resume_render_updates).
    pub fn clear_view_prior_to_animation(&mut self) {
        self.stop_render_updates();
        self.chrome.set_privacy_grade_visible(false);
        self.chrome.set_omnibar_text("");
        self.chrome.hide_keyboard();
        self.chrome.set_browser_visible(false);
    }

    // === Commands ===

    pub fn process_command(&mut self, command: Command) {
        debug!(tab_id = %self.tab_id, ?command, "processing command");
        match command {
            Command::Refresh => self.engine.reload(),
            Command::NavigateTo(url) => {
                self.chrome.focus_dummy();
                self.engine.load_url(&url);
            }
            Command::ShowKeyboard => self.chrome.show_keyboard(self.keyboard_delay),
            Command::HideKeyboard => {
                self.chrome.hide_keyboard();
                self.chrome.focus_dummy();
            }
            Command::ReinitializeView => self.engine.clear_history(),
            Command::ShowFullScreenContent(handle) => self.chrome.add_full_screen_content(handle),
            Command::RequestDownload { url, destination } => self.start_download(&url, destination),
            Command::DialNumber(number) => self.actions.launch_external(ExternalIntent::Dial(number)),
            Command::SendEmail(address) => self.actions.launch_external(ExternalIntent::Email(address)),
            Command::SendSms(number) => self.actions.launch_external(ExternalIntent::Sms(number)),
        }
    }

    // === Downloads ===

    fn start_download(&mut self, url: &str, destination: DownloadDestination) {
        let outcome = self.downloads.request(url, destination);
        self.report_download(outcome);
    }

    fn report_download(&mut self, outcome: Result<DownloadOutcome, DownloadError>) {
        match outcome {
            Ok(DownloadOutcome::Started(request)) => {
                self.chrome.show_notice(Notice::DownloadStarted(request.file_name));
            }
            Ok(DownloadOutcome::AwaitingPermission) => {}
            Ok(DownloadOutcome::Denied) => {
                self.chrome.show_notice(Notice::PermissionRequiredToDownload);
            }
            Err(e) => warn!(tab_id = %self.tab_id, error = %e, "download not started"),
        }
    }

    /// The web view's download listener fired.
    pub fn on_download_requested(&mut self, url: &str) {
        self.start_download(url, DownloadDestination::Downloads);
    }

    pub fn on_permission_result(&mut self, granted: bool) {
        let outcome = self.downloads.on_permission_result(granted);
        self.report_download(outcome);
    }

    pub fn downloads(&self) -> &DownloadManager {
        &self.downloads
    }

    // === Bookmarks ===

    pub fn on_bookmark_confirmed(&mut self, title: &str, url: &str) {
        match &self.bookmarks {
            Some(writer) => writer.save(&self.tab_id, title, url),
            None => warn!(tab_id = %self.tab_id, "no bookmark store; bookmark dropped"),
        }
    }

    pub fn on_bookmark_saved(&mut self, result: Result<String, String>) {
        match result {
            Ok(_) => self.chrome.show_notice(Notice::BookmarkAdded),
            Err(e) => {
                warn!(tab_id = %self.tab_id, error = %e, "bookmark not saved");
                self.chrome.show_notice(Notice::BookmarkFailed);
            }
        }
    }

    // === Input ===

    pub fn on_omnibar_focus_changed(&mut self, has_focus: bool) {
        let text = self.chrome.omnibar_text();
        self.controller.on_omnibar_input_state_changed(&text, has_focus);
    }

    pub fn on_omnibar_text_changed(&mut self) {
        let text = self.chrome.omnibar_text();
        let has_focus = self.chrome.omnibar_has_focus();
        self.controller.on_omnibar_input_state_changed(&text, has_focus);
    }

    /// Enter / IME "done" in the omnibar.
    pub fn on_omnibar_submitted(&mut self) {
        let text = self.chrome.omnibar_text();
        self.controller.on_user_submitted_query(&text);
    }

    pub fn on_suggestion_selected(&mut self, phrase: &str) {
        self.controller.on_user_submitted_query(phrase);
    }

    pub fn on_suggestion_edit_requested(&mut self, phrase: &str) {
        self.controller.on_user_selected_to_edit_query(phrase);
    }

    /// Back key while the keyboard is up. Returns whether it was consumed.
    pub fn on_omnibar_back_key(&mut self) -> bool {
        self.chrome.focus_dummy();
        self.controller.user_dismissed_keyboard()
    }

    pub fn on_clear_omnibar(&mut self) {
        self.chrome.set_omnibar_text("");
        self.on_omnibar_text_changed();
    }

    pub fn on_web_content_touched(&mut self) {
        if self.chrome.omnibar_has_focus() {
            self.chrome.focus_dummy();
        }
    }

    pub fn on_long_press_image_download(&mut self, url: &str) {
        self.controller.on_image_download_requested(url);
    }

    pub fn on_menu_item(&mut self, item: MenuItem) {
        match item {
            MenuItem::PrivacyDashboard => self.actions.launch_privacy_dashboard(&self.tab_id),
            MenuItem::Fire => self.actions.launch_fire(),
            MenuItem::Back => self.engine.go_back(),
            MenuItem::Forward => self.engine.go_forward(),
            MenuItem::Refresh => self.engine.reload(),
            MenuItem::Tabs => self.actions.launch_tab_switcher(),
            MenuItem::NewTab => self.actions.launch_new_tab(),
            MenuItem::Bookmarks => self.actions.launch_bookmarks(),
            MenuItem::AddBookmark => {
                let title = self.engine.title();
                let url = self.engine.url();
                self.chrome.show_add_bookmark_dialog(title, url);
            }
            MenuItem::Settings => self.actions.launch_settings(),
        }
    }

    /// Navigates back in the engine if it can. Returns whether it did.
    pub fn go_back(&mut self) -> bool {
        if self.engine.can_go_back() {
            self.engine.go_back();
            return true;
        }
        false
    }
}

impl Drop for SessionHost {
    fn drop(&mut self) {
        self.detach();
    }
}
