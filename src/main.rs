//! Console demo of the tabhost tab-session core.
//!
//! Drives a [`Browser`] with console-backed widgets: opens tabs, runs a
//! search, simulates page loads and closes tabs from the switcher.
//!
//! Flags: `--verbose` for debug logs, `--persist` to keep tabs in the
//! platform data directory instead of memory.

use std::error::Error;
use std::time::Duration;

use tracing::{info, warn};

use tabhost::app::{Browser, ShellPlatform, TabWidgets, WidgetFactory};
use tabhost::database::{self, Database};
use tabhost::logging::init_logging;
use tabhost::managers::download_manager::{Downloader, StoragePermission};
use tabhost::managers::session_controller::SessionControllerTrait;
use tabhost::managers::tab_registry::{self, TabRegistryTrait};
use tabhost::platform;
use tabhost::services::background::Screen;
use tabhost::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use tabhost::types::command::{ExternalIntent, FullScreenHandle};
use tabhost::types::download::DownloadRequest;
use tabhost::types::privacy::PrivacyGrade;
use tabhost::types::render::AutoCompleteSuggestion;
use tabhost::ui::chrome::{MenuItem, Notice, TabChrome, WebEngine};

struct ConsoleChrome {
    tab_id: String,
    omnibar: String,
    omnibar_focused: bool,
}

impl TabChrome for ConsoleChrome {
    fn set_host_visible(&mut self, visible: bool) {
        info!(tab = %self.tab_id, visible, "host visibility");
    }
    fn set_browser_visible(&mut self, _visible: bool) {}
    fn set_loading_indicator_visible(&mut self, _visible: bool) {}
    fn set_progress(&mut self, _progress: u8) {}

    fn omnibar_text(&self) -> String {
        self.omnibar.clone()
    }
    fn omnibar_has_focus(&self) -> bool {
        self.omnibar_focused
    }
    fn set_omnibar_text(&mut self, text: &str) {
        self.omnibar = text.to_string();
        println!("  [{}] omnibar: {}", short(&self.tab_id), text);
    }
    fn move_omnibar_cursor_to_end(&mut self) {}
    fn expand_app_bar(&mut self) {}
    fn set_clear_button_visible(&mut self, _visible: bool) {}

    fn set_privacy_grade_visible(&mut self, _visible: bool) {}
    fn set_privacy_grade_icon(&mut self, icon: &'static str) {
        println!("  [{}] privacy grade icon: {}", short(&self.tab_id), icon);
    }
    fn set_fire_button_visible(&mut self, _visible: bool) {}
    fn set_menu_item_enabled(&mut self, _item: MenuItem, _enabled: bool) {}

    fn show_suggestions(&mut self, suggestions: &[AutoCompleteSuggestion]) {
        let phrases: Vec<&str> = suggestions.iter().map(|s| s.phrase.as_str()).collect();
        println!("  [{}] suggestions: {}", short(&self.tab_id), phrases.join(", "));
    }
    fn hide_suggestions(&mut self) {}

    fn show_full_screen_container(&mut self) {
        println!("  [{}] full screen on", short(&self.tab_id));
    }
    fn hide_full_screen_container(&mut self) {}
    fn add_full_screen_content(&mut self, handle: FullScreenHandle) {
        println!("  [{}] showing {}", short(&self.tab_id), handle);
    }

    fn show_keyboard(&mut self, delay: Duration) {
        self.omnibar_focused = true;
        println!("  [{}] keyboard up after {:?}", short(&self.tab_id), delay);
    }
    fn hide_keyboard(&mut self) {
        self.omnibar_focused = false;
    }
    fn focus_dummy(&mut self) {
        self.omnibar_focused = false;
    }

    fn show_add_bookmark_dialog(&mut self, title: Option<String>, url: Option<String>) {
        println!("  [{}] add bookmark? {:?} {:?}", short(&self.tab_id), title, url);
    }
    fn show_notice(&mut self, notice: Notice) {
        println!("  [{}] notice: {:?}", short(&self.tab_id), notice);
    }
}

#[derive(Default)]
struct ConsoleEngine {
    history: Vec<String>,
    index: usize,
}

impl WebEngine for ConsoleEngine {
    fn load_url(&mut self, url: &str) {
        if !self.history.is_empty() {
            self.history.truncate(self.index + 1);
        }
        self.history.push(url.to_string());
        self.index = self.history.len() - 1;
        println!("  engine: load {}", url);
    }
    fn reload(&mut self) {
        println!("  engine: reload");
    }
    fn go_back(&mut self) {
        if self.can_go_back() {
            self.index -= 1;
        }
    }
    fn go_forward(&mut self) {
        if self.can_go_forward() {
            self.index += 1;
        }
    }
    fn can_go_back(&self) -> bool {
        self.index > 0
    }
    fn can_go_forward(&self) -> bool {
        self.index + 1 < self.history.len()
    }
    fn clear_history(&mut self) {
        self.history.clear();
        self.index = 0;
    }
    fn title(&self) -> Option<String> {
        None
    }
    fn url(&self) -> Option<String> {
        self.history.get(self.index).cloned()
    }
    fn destroy(&mut self) {}
}

struct GrantedStorage;

impl StoragePermission for GrantedStorage {
    fn has_write_permission(&self) -> bool {
        true
    }
    fn request_write_permission(&mut self) {}
}

struct ConsoleDownloader;

impl Downloader for ConsoleDownloader {
    fn enqueue(&mut self, request: DownloadRequest) {
        println!("  downloader: {} -> {}", request.url, request.file_name);
    }
}

struct ConsoleWidgets;

impl WidgetFactory for ConsoleWidgets {
    fn create_widgets(&mut self, tab_id: &str) -> TabWidgets {
        TabWidgets {
            chrome: Box::new(ConsoleChrome {
                tab_id: tab_id.to_string(),
                omnibar: String::new(),
                omnibar_focused: false,
            }),
            engine: Box::new(ConsoleEngine::default()),
            permission: Box::new(GrantedStorage),
            downloader: Box::new(ConsoleDownloader),
        }
    }
}

struct ConsolePlatform;

impl ShellPlatform for ConsolePlatform {
    fn open_screen(&mut self, screen: Screen) {
        println!("  platform: open {:?}", screen);
    }
    fn toggle_full_screen(&mut self) {
        println!("  platform: toggle full screen");
    }
    fn launch_external(&mut self, intent: ExternalIntent) {
        println!("  platform: launch {}", intent.uri());
    }
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn print_tabs(browser: &Browser) {
    let registry = browser.registry();
    let registry = tab_registry::lock(&registry);
    for tab in registry.tabs() {
        let marker = if registry.current_tab_id() == Some(tab.tab_id.as_str()) { "*" } else { " " };
        println!("  {} {} {}", marker, short(&tab.tab_id), tab.display_title());
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    init_logging(args.iter().any(|a| a == "--verbose"));

    let mut settings_engine = SettingsEngine::new(None);
    let settings = settings_engine.load().unwrap_or_else(|e| {
        warn!(error = %e, "using default settings");
        Default::default()
    });

    let db = if args.iter().any(|a| a == "--persist") {
        let path = platform::database_path(&settings.database_file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!(path = %path.display(), "opening tab database");
        Database::open(&path)?
    } else {
        Database::open_in_memory()?
    };

    println!("tabhost v{} demo", env!("CARGO_PKG_VERSION"));

    section("Startup");
    let mut browser = Browser::new(
        settings,
        Some(database::shared(db)),
        Box::new(ConsoleWidgets),
        Box::new(ConsolePlatform),
    )?;
    browser.pump();
    print_tabs(&browser);

    section("Search and page load");
    if let Some(host) = browser.current_host_mut() {
        let controller = host.controller_mut();
        controller.on_user_submitted_query("rust ownership");
        let url = controller.url_for_query("rust ownership");
        controller.on_page_started(&url);
        controller.on_progress_changed(60);
        controller.on_privacy_grade_changed(PrivacyGrade::B);
        controller.on_page_finished(&url, Some("rust ownership at DuckDuckGo"));
    }
    browser.pump();
    print_tabs(&browser);

    section("Links handed to the platform");
    if let Some(host) = browser.current_host_mut() {
        host.controller_mut().on_url_intercepted("tel:5551234");
        host.controller_mut().on_image_download_requested("https://example.com/img/cat.png");
    }
    browser.pump();

    section("Second tab");
    browser.launch_new_tab();
    if let Some(host) = browser.current_host_mut() {
        host.controller_mut().on_user_submitted_query("example.com");
        host.controller_mut().on_page_finished("https://example.com/", Some("Example Domain"));
    }
    browser.pump();
    print_tabs(&browser);

    section("Tab switcher");
    let mut switcher = browser.tab_switcher();
    let first = switcher.tabs().first().map(|t| t.tab_id.clone());
    if let Some(first) = first {
        println!("  select {} -> {:?}", short(&first), switcher.on_select(&first));
        browser.pump();
        let last = switcher.tabs().last().map(|t| t.tab_id.clone());
        if let Some(last) = last {
            println!("  delete {} -> {:?}", short(&last), switcher.on_delete(&last));
        }
    }
    browser.pump();
    print_tabs(&browser);

    section("Back");
    println!("  {:?}", browser.on_back_pressed());

    browser.shutdown();
    Ok(())
}
