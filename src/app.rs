//! Browser shell for tabhost.
//!
//! [`Browser`] wires the tab registry, the host map and the background
//! workers together. It is driven from one coordinating thread: the embedder
//! forwards platform callbacks into it and calls [`Browser::pump`] whenever
//! it wants pending state applied to the widgets.

use std::rc::Rc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::database::SharedDatabase;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkWriter};
use crate::managers::download_manager::{DownloadManager, Downloader, StoragePermission};
use crate::managers::session_controller::{SessionController, SessionControllerTrait};
use crate::managers::tab_registry::{self, SharedTabRegistry, TabRegistry, TabRegistryTrait};
use crate::managers::tab_store::TabStore;
use crate::services::background::{Background, BackgroundHandle, Screen, UiEvent};
use crate::types::command::ExternalIntent;
use crate::types::errors::ShellError;
use crate::types::settings::ShellSettings;
use crate::types::tab::{TabEntity, TabsSnapshot};
use crate::ui::chrome::{TabChrome, TabChromeActions, WebEngine};
use crate::ui::host_manager::{HostFactory, HostManager};
use crate::ui::session_host::{HostParts, SessionHost};
use crate::ui::tab_switcher::TabSwitcher;

/// Upper bound on settle passes per [`Browser::pump`].
const MAX_PUMP_PASSES: usize = 8;

/// Window-level capabilities of the embedding platform.
pub trait ShellPlatform {
    fn open_screen(&mut self, screen: Screen);
    fn toggle_full_screen(&mut self);
    fn launch_external(&mut self, intent: ExternalIntent);
}

/// Platform objects backing one tab.
pub struct TabWidgets {
    pub chrome: Box<dyn TabChrome>,
    pub engine: Box<dyn WebEngine>,
    pub permission: Box<dyn StoragePermission>,
    pub downloader: Box<dyn Downloader>,
}

/// Creates the widgets for each new tab.
pub trait WidgetFactory {
    fn create_widgets(&mut self, tab_id: &str) -> TabWidgets;
}

/// Result of the system back action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// The current tab navigated back.
    Handled,
    /// Nothing to go back to; the view was cleared and the shell should close.
    Finish,
}

/// [`TabChromeActions`] that queue shell work for the next pump.
pub struct ShellActions {
    background: BackgroundHandle,
}

impl ShellActions {
    pub fn new(background: BackgroundHandle) -> Self {
        Self { background }
    }
}

impl TabChromeActions for ShellActions {
    fn launch_tab_switcher(&self) {
        self.background.post(UiEvent::OpenScreen(Screen::TabSwitcher));
    }

    fn launch_new_tab(&self) {
        self.background.post(UiEvent::NewTab);
    }

    fn launch_bookmarks(&self) {
        self.background.post(UiEvent::OpenScreen(Screen::Bookmarks));
    }

    fn launch_settings(&self) {
        self.background.post(UiEvent::OpenScreen(Screen::Settings));
    }

    fn launch_privacy_dashboard(&self, tab_id: &str) {
        self.background
            .post(UiEvent::OpenScreen(Screen::PrivacyDashboard(tab_id.to_string())));
    }

    fn launch_fire(&self) {
        self.background.post(UiEvent::OpenScreen(Screen::Fire));
    }

    fn toggle_full_screen(&self) {
        self.background.post(UiEvent::ToggleFullScreen);
    }

    fn launch_external(&self, intent: ExternalIntent) {
        self.background.post(UiEvent::LaunchExternal(intent));
    }
}

struct ShellHostFactory {
    widgets: Box<dyn WidgetFactory>,
    actions: Rc<dyn TabChromeActions>,
    bookmarks: Option<BookmarkWriter>,
    search_url: String,
    keyboard_delay: Duration,
}

impl HostFactory for ShellHostFactory {
    fn create_host(&mut self, tab: &TabEntity) -> SessionHost {
        let widgets = self.widgets.create_widgets(&tab.tab_id);
        let controller = SessionController::new(tab.tab_id.clone(), self.search_url.clone());
        SessionHost::new(
            controller,
            HostParts {
                chrome: widgets.chrome,
                engine: widgets.engine,
                actions: Rc::clone(&self.actions),
                downloads: DownloadManager::new(widgets.permission, widgets.downloader),
                bookmarks: self.bookmarks.clone(),
                keyboard_delay: self.keyboard_delay,
            },
        )
    }
}

pub struct Browser {
    settings: ShellSettings,
    registry: SharedTabRegistry,
    registry_updates: watch::Receiver<TabsSnapshot>,
    hosts: HostManager,
    platform: Box<dyn ShellPlatform>,
    background: Background,
}

impl Browser {
    /// Builds the shell. With a database the tab list is restored (or reset,
    /// per `restore_tabs_on_startup`) and persisted; without one tabs live in
    /// memory only. A shell never starts without a current tab.
    pub fn new(
        settings: ShellSettings,
        db: Option<SharedDatabase>,
        widgets: Box<dyn WidgetFactory>,
        platform: Box<dyn ShellPlatform>,
    ) -> Result<Self, ShellError> {
        let background = Background::new(settings.background_workers)
            .map_err(|e| ShellError::WorkerPool(e.to_string()))?;

        let registry = match &db {
            Some(db) => {
                let store = Box::new(TabStore::new(db.clone()));
                if settings.restore_tabs_on_startup {
                    TabRegistry::restore(store)?
                } else {
                    TabRegistry::with_store(store)?
                }
            }
            None => TabRegistry::new(),
        }
        .into_shared();

        let mut registry_updates = {
            let mut guard = tab_registry::lock(&registry);
            ensure_current_tab(&mut *guard);
            info!(tabs = guard.tab_count(), "browser starting");
            guard.subscribe()
        };
        registry_updates.mark_changed();

        let actions: Rc<dyn TabChromeActions> = Rc::new(ShellActions::new(background.handle()));
        let bookmarks = db.map(|db| BookmarkWriter::new(BookmarkManager::new(db), background.handle()));
        let factory = ShellHostFactory {
            widgets,
            actions,
            bookmarks,
            search_url: settings.search_url.clone(),
            keyboard_delay: Duration::from_millis(settings.keyboard_show_delay_ms),
        };

        let mut browser = Self {
            settings,
            registry,
            registry_updates,
            hosts: HostManager::new(Box::new(factory)),
            platform,
            background,
        };
        browser.sync_hosts();
        Ok(browser)
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    pub fn registry(&self) -> SharedTabRegistry {
        self.registry.clone()
    }

    pub fn hosts(&self) -> &HostManager {
        &self.hosts
    }

    pub fn current_host(&self) -> Option<&SessionHost> {
        self.hosts.current_host()
    }

    pub fn current_host_mut(&mut self) -> Option<&mut SessionHost> {
        self.hosts.current_host_mut()
    }

    pub fn host_mut(&mut self, tab_id: &str) -> Option<&mut SessionHost> {
        self.hosts.host_mut(tab_id)
    }

    /// Applies everything pending: queued shell events, registry changes,
    /// view-state snapshots and commands of every host.
    pub fn pump(&mut self) {
        for _ in 0..MAX_PUMP_PASSES {
            let synced = self.sync_hosts();
            self.hosts.pump_all();
            self.record_tab_details();
            let handled = self.drain_events();
            if handled == 0 && !synced {
                break;
            }
        }
    }

    /// Waits up to `timeout` for background work to report back, then pumps.
    /// Returns whether anything arrived.
    pub fn wait_and_pump(&mut self, timeout: Duration) -> bool {
        match self.background.wait_event(timeout) {
            Some(event) => {
                self.handle_event(event);
                self.pump();
                true
            }
            None => false,
        }
    }

    fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.background.try_next_event() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    fn handle_event(&mut self, event: UiEvent) {
        debug!(?event, "shell event");
        match event {
            UiEvent::NewTab => self.launch_new_tab(),
            UiEvent::OpenScreen(screen) => self.platform.open_screen(screen),
            UiEvent::ToggleFullScreen => self.platform.toggle_full_screen(),
            UiEvent::LaunchExternal(intent) => self.platform.launch_external(intent),
            UiEvent::BookmarkSaved { tab_id, result } => match self.hosts.host_mut(&tab_id) {
                Some(host) => host.on_bookmark_saved(result),
                None => debug!(tab_id, "bookmark saved for a closed tab"),
            },
        }
    }

    fn sync_hosts(&mut self) -> bool {
        if !self.registry_updates.has_changed().unwrap_or(false) {
            return false;
        }
        let snapshot = self.registry_updates.borrow_and_update().clone();
        self.hosts.apply(&snapshot)
    }

    /// Copies each tab's current url/title into the registry.
    fn record_tab_details(&mut self) {
        let details: Vec<(String, String, Option<String>)> = self
            .hosts
            .hosts()
            .filter_map(|host| {
                let controller = host.controller();
                controller.url().map(|url| {
                    (
                        controller.tab_id().to_string(),
                        url.to_string(),
                        controller.title().map(str::to_string),
                    )
                })
            })
            .collect();
        if details.is_empty() {
            return;
        }

        let mut registry = tab_registry::lock(&self.registry);
        for (tab_id, url, title) in details {
            if let Err(e) = registry.update_tab(&tab_id, Some(&url), title.as_deref()) {
                debug!(tab_id, error = %e, "tab details not recorded");
            }
        }
    }

    // === Shell actions ===

    pub fn launch_new_tab(&mut self) {
        let id = tab_registry::lock(&self.registry).add_new_and_select();
        info!(tab_id = %id, "opened new tab");
        self.sync_hosts();
    }

    pub fn open_tab_switcher(&mut self) {
        self.platform.open_screen(Screen::TabSwitcher);
    }

    /// A switcher over this shell's registry, for the screen the platform opened.
    pub fn tab_switcher(&self) -> TabSwitcher {
        TabSwitcher::new(self.registry.clone(), self.settings.close_switcher_on_delete)
    }

    pub fn on_back_pressed(&mut self) -> BackOutcome {
        let Some(host) = self.hosts.current_host_mut() else {
            return BackOutcome::Finish;
        };
        if host.go_back() {
            return BackOutcome::Handled;
        }
        host.clear_view_prior_to_animation();
        BackOutcome::Finish
    }

    /// The fire dialog started clearing data; the shell is about to close.
    pub fn finish_animated(&mut self) {
        if let Some(host) = self.hosts.current_host_mut() {
            host.clear_view_prior_to_animation();
        }
    }

    /// Text shared into the app is submitted as a query in the current tab.
    pub fn on_shared_text(&mut self, text: &str) {
        match self.hosts.current_host_mut() {
            Some(host) => host.controller_mut().on_shared_text_received(text),
            None => warn!("shared text dropped: no current tab"),
        }
    }

    /// The privacy dashboard closed; `reload` is set when protections changed.
    pub fn on_privacy_dashboard_result(&mut self, reload: bool) {
        if !reload {
            return;
        }
        if let Some(host) = self.hosts.current_host_mut() {
            host.controller_mut().on_refresh_requested();
        }
    }

    /// Tears down every host.
    pub fn shutdown(&mut self) {
        self.hosts.destroy_all();
        info!("browser shut down");
    }
}

/// Guarantees a current tab: the newest tab if the selection was lost, or a
/// fresh one if there are none.
fn ensure_current_tab(registry: &mut TabRegistry) {
    if registry.current_tab_id().is_some() {
        return;
    }
    let newest = registry
        .tabs()
        .iter()
        .max_by_key(|t| t.sequence)
        .map(|t| t.tab_id.clone());
    match newest {
        Some(id) => {
            registry.select(&id);
        }
        None => {
            registry.add_new_and_select();
        }
    }
}
