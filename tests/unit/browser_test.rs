//! Integration tests for the Browser shell driven through recording widgets.

#[path = "../support/mod.rs"]
mod support;

use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;

use tabhost::app::{BackOutcome, Browser};
use tabhost::database::{self, Database};
use tabhost::managers::session_controller::SessionControllerTrait;
use tabhost::managers::tab_registry::{self, TabRegistryTrait};
use tabhost::services::background::Screen;
use tabhost::types::command::{ExternalIntent, FullScreenHandle};
use tabhost::types::settings::ShellSettings;
use tabhost::ui::chrome::{MenuItem, Notice};

use support::{ChromeCall, PlatformCall, RecordingPlatform, RecordingWidgets};

struct Shell {
    browser: Browser,
    widgets: RecordingWidgets,
    platform: RecordingPlatform,
}

impl Shell {
    fn current_id(&self) -> String {
        let registry = self.browser.registry();
        let registry = tab_registry::lock(&registry);
        registry.current_tab_id().unwrap().to_string()
    }

    fn tab_ids(&self) -> Vec<String> {
        let registry = self.browser.registry();
        let registry = tab_registry::lock(&registry);
        registry.tabs().iter().map(|t| t.tab_id.clone()).collect()
    }

    fn platform_calls(&self) -> Vec<PlatformCall> {
        self.platform.calls.borrow().clone()
    }
}

fn shell_with(settings: ShellSettings, db: Option<Database>) -> Shell {
    let widgets = RecordingWidgets::granted();
    let platform = RecordingPlatform::default();
    let mut browser = Browser::new(
        settings,
        db.map(database::shared),
        Box::new(widgets.clone()),
        Box::new(platform.clone()),
    )
    .unwrap();
    browser.pump();
    Shell {
        browser,
        widgets,
        platform,
    }
}

fn shell() -> Shell {
    shell_with(ShellSettings::default(), None)
}

fn file_shell(path: &Path, settings: ShellSettings) -> Shell {
    shell_with(settings, Some(Database::open(path).unwrap()))
}

#[test]
fn test_starts_with_one_visible_tab() {
    let shell = shell();

    assert_eq!(shell.tab_ids().len(), 1);
    assert_eq!(shell.widgets.built(), 1);

    let id = shell.current_id();
    assert_eq!(shell.browser.hosts().current_tab_id(), Some(id.as_str()));
    assert!(shell.browser.current_host().unwrap().is_visible());

    let fakes = shell.widgets.fakes(&id);
    let chrome = fakes.chrome.borrow();
    assert_eq!(chrome.count(|c| *c == ChromeCall::HostVisible(true)), 1);
    assert!(chrome.calls.contains(&ChromeCall::BrowserVisible(false)));
}

#[test]
fn test_launch_new_tab_switches_visible_host() {
    let mut shell = shell();
    let first = shell.current_id();

    shell.browser.launch_new_tab();
    shell.browser.pump();

    let second = shell.current_id();
    assert_ne!(first, second);
    assert_eq!(shell.tab_ids(), vec![first.clone(), second.clone()]);
    assert_eq!(shell.browser.hosts().len(), 2);
    assert!(!shell.browser.hosts().host(&first).unwrap().is_visible());
    assert!(shell.browser.hosts().host(&second).unwrap().is_visible());
}

#[test]
fn test_new_tab_menu_item_goes_through_the_shell() {
    let mut shell = shell();

    shell.browser.current_host_mut().unwrap().on_menu_item(MenuItem::NewTab);
    assert_eq!(shell.tab_ids().len(), 1);

    shell.browser.pump();
    assert_eq!(shell.tab_ids().len(), 2);
    assert_eq!(shell.widgets.built(), 2);
}

#[test]
fn test_menu_screens_reach_the_platform() {
    let mut shell = shell();
    let id = shell.current_id();

    {
        let host = shell.browser.current_host_mut().unwrap();
        host.on_menu_item(MenuItem::Settings);
        host.on_menu_item(MenuItem::PrivacyDashboard);
        host.on_menu_item(MenuItem::Tabs);
    }
    assert!(shell.platform_calls().is_empty());

    shell.browser.pump();
    assert_eq!(
        shell.platform_calls(),
        vec![
            PlatformCall::Open(Screen::Settings),
            PlatformCall::Open(Screen::PrivacyDashboard(id)),
            PlatformCall::Open(Screen::TabSwitcher),
        ]
    );
}

#[test]
fn test_open_tab_switcher_is_immediate() {
    let mut shell = shell();
    shell.browser.open_tab_switcher();
    assert_eq!(shell.platform_calls(), vec![PlatformCall::Open(Screen::TabSwitcher)]);
}

#[test]
fn test_deleting_current_tab_shows_the_remaining_one() {
    let mut shell = shell();
    let first = shell.current_id();
    shell.browser.launch_new_tab();
    shell.browser.pump();
    let second = shell.current_id();

    let mut switcher = shell.browser.tab_switcher();
    switcher.on_delete(&second);
    shell.browser.pump();

    assert_eq!(shell.current_id(), first);
    assert_eq!(shell.browser.hosts().len(), 1);
    assert!(shell.browser.hosts().host(&first).unwrap().is_visible());
    assert!(shell.widgets.fakes(&second).engine.borrow().destroyed);
}

#[test]
fn test_selecting_from_switcher_shows_that_tab() {
    let mut shell = shell();
    let first = shell.current_id();
    shell.browser.launch_new_tab();
    shell.browser.pump();

    let mut switcher = shell.browser.tab_switcher();
    switcher.on_select(&first);
    shell.browser.pump();

    assert_eq!(shell.browser.hosts().current_tab_id(), Some(first.as_str()));
    assert!(shell.browser.current_host().unwrap().is_visible());
}

#[test]
fn test_full_screen_toggles_platform_once_per_transition() {
    let mut shell = shell();

    shell
        .browser
        .current_host_mut()
        .unwrap()
        .controller_mut()
        .on_full_screen_requested(FullScreenHandle(7));
    shell.browser.pump();
    shell.browser.pump();
    assert_eq!(shell.platform_calls(), vec![PlatformCall::ToggleFullScreen]);

    shell
        .browser
        .current_host_mut()
        .unwrap()
        .controller_mut()
        .on_full_screen_exited();
    shell.browser.pump();
    assert_eq!(
        shell.platform_calls(),
        vec![PlatformCall::ToggleFullScreen, PlatformCall::ToggleFullScreen]
    );
}

#[test]
fn test_intercepted_phone_link_launches_dialer() {
    let mut shell = shell();

    let handled = shell
        .browser
        .current_host_mut()
        .unwrap()
        .controller_mut()
        .on_url_intercepted("tel:5551234");
    assert!(handled);

    shell.browser.pump();
    assert_eq!(
        shell.platform_calls(),
        vec![PlatformCall::Launch(ExternalIntent::Dial("5551234".to_string()))]
    );
}

#[test]
fn test_back_navigates_when_possible() {
    let mut shell = shell();
    let fakes = shell.widgets.fakes(&shell.current_id());
    fakes.engine.borrow_mut().can_go_back = true;

    assert_eq!(shell.browser.on_back_pressed(), BackOutcome::Handled);
    assert_eq!(fakes.engine.borrow().back, 1);
}

#[test]
fn test_back_without_history_clears_and_finishes() {
    let mut shell = shell();
    let fakes = shell.widgets.fakes(&shell.current_id());

    assert_eq!(shell.browser.on_back_pressed(), BackOutcome::Finish);
    assert!(!shell.browser.current_host().unwrap().is_accepting_render_updates());

    let chrome = fakes.chrome.borrow();
    assert_eq!(chrome.calls.last(), Some(&ChromeCall::BrowserVisible(false)));
    assert!(chrome.calls.contains(&ChromeCall::OmnibarText(String::new())));
}

#[test]
fn test_shared_text_is_searched_in_current_tab() {
    let mut shell = shell();
    let fakes = shell.widgets.fakes(&shell.current_id());

    shell.browser.on_shared_text("rust borrow checker");
    shell.browser.pump();

    assert_eq!(
        fakes.engine.borrow().loaded,
        vec!["https://duckduckgo.com/?q=rust%20borrow%20checker".to_string()]
    );
}

#[test]
fn test_privacy_dashboard_result_reloads_only_when_asked() {
    let mut shell = shell();
    let fakes = shell.widgets.fakes(&shell.current_id());

    shell.browser.on_privacy_dashboard_result(false);
    shell.browser.pump();
    assert_eq!(fakes.engine.borrow().reloads, 0);

    shell.browser.on_privacy_dashboard_result(true);
    shell.browser.pump();
    assert_eq!(fakes.engine.borrow().reloads, 1);
}

#[test]
fn test_page_details_are_recorded_in_the_registry() {
    let mut shell = shell();
    {
        let controller = shell.browser.current_host_mut().unwrap().controller_mut();
        controller.on_page_started("https://example.com/");
        controller.on_page_finished("https://example.com/", Some("Example Domain"));
    }
    shell.browser.pump();

    let registry = shell.browser.registry();
    let registry = tab_registry::lock(&registry);
    let tab = &registry.tabs()[0];
    assert_eq!(tab.url.as_deref(), Some("https://example.com/"));
    assert_eq!(tab.title.as_deref(), Some("Example Domain"));
}

#[test]
fn test_bookmark_save_reports_back_to_the_tab() {
    let mut shell = shell_with(
        ShellSettings::default(),
        Some(Database::open_in_memory().unwrap()),
    );
    let fakes = shell.widgets.fakes(&shell.current_id());

    shell
        .browser
        .current_host_mut()
        .unwrap()
        .on_bookmark_confirmed("Example", "https://example.com/");

    assert!(shell.browser.wait_and_pump(Duration::from_secs(5)));
    assert_eq!(fakes.chrome.borrow().notices(), vec![Notice::BookmarkAdded]);
}

#[test]
fn test_bookmark_without_database_is_dropped() {
    let mut shell = shell();
    shell
        .browser
        .current_host_mut()
        .unwrap()
        .on_bookmark_confirmed("Example", "https://example.com/");
    assert!(!shell.browser.wait_and_pump(Duration::from_millis(50)));
}

#[test]
fn test_restart_restores_tabs_and_reopens_pages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tabs.db");

    let (first, second) = {
        let mut shell = file_shell(&path, ShellSettings::default());
        let first = shell.current_id();
        {
            let controller = shell.browser.current_host_mut().unwrap().controller_mut();
            controller.on_user_submitted_query("example.com");
            controller.on_page_started("https://example.com/");
            controller.on_page_finished("https://example.com/", Some("Example Domain"));
        }
        shell.browser.launch_new_tab();
        shell.browser.pump();
        let second = shell.current_id();
        shell.browser.shutdown();
        (first, second)
    };

    let shell = file_shell(&path, ShellSettings::default());
    assert_eq!(shell.tab_ids(), vec![first.clone(), second.clone()]);
    assert_eq!(shell.current_id(), second);

    let restored = shell.widgets.fakes(&first);
    assert_eq!(restored.engine.borrow().loaded, vec!["https://example.com/".to_string()]);
    assert!(shell.widgets.fakes(&second).engine.borrow().loaded.is_empty());
    assert!(!shell.browser.hosts().host(&first).unwrap().is_visible());
}

#[test]
fn test_restart_without_restore_starts_fresh() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tabs.db");

    let previous = {
        let mut shell = file_shell(&path, ShellSettings::default());
        shell.browser.launch_new_tab();
        shell.browser.pump();
        shell.tab_ids()
    };
    assert_eq!(previous.len(), 2);

    let settings = ShellSettings {
        restore_tabs_on_startup: false,
        ..ShellSettings::default()
    };
    let shell = file_shell(&path, settings);

    let ids = shell.tab_ids();
    assert_eq!(ids.len(), 1);
    assert!(!previous.contains(&ids[0]));
    assert!(shell.widgets.fakes(&ids[0]).engine.borrow().loaded.is_empty());
}

#[test]
fn test_shutdown_destroys_every_host() {
    let mut shell = shell();
    shell.browser.launch_new_tab();
    shell.browser.pump();
    let ids = shell.tab_ids();

    shell.browser.shutdown();

    assert!(shell.browser.hosts().is_empty());
    for id in ids {
        assert!(shell.widgets.fakes(&id).engine.borrow().destroyed);
    }
}
