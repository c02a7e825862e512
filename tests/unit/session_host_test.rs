//! Unit tests for SessionHost: render reconciliation, command execution,
//! lifecycle and input forwarding.

#[path = "../support/mod.rs"]
mod support;

use std::time::Duration;

use tabhost::managers::download_manager::DownloadManagerTrait;
use tabhost::managers::session_controller::SessionControllerTrait;
use tabhost::types::command::{Command, ExternalIntent, FullScreenHandle};
use tabhost::types::privacy::PrivacyGrade;
use tabhost::types::render::{AutoCompleteSuggestion, ViewState};
use tabhost::ui::chrome::{MenuItem, Notice};
use tabhost::ui::session_host::HostLifecycle;

use support::{attached_host, host, host_with, ActionCall, ChromeCall, KEYBOARD_DELAY};

// === Rendering ===

#[test]
fn test_attach_renders_current_snapshot() {
    let (host, fixture) = attached_host("tab-1");
    assert_eq!(host.lifecycle(), HostLifecycle::Attached);

    let chrome = fixture.chrome();
    assert!(chrome.calls.contains(&ChromeCall::BrowserVisible(false)));
    assert!(chrome.calls.contains(&ChromeCall::FireButton(true)));
    assert!(chrome.calls.contains(&ChromeCall::HideSuggestions));
    // Initial omnibar text equals the widget's, so nothing is written.
    assert!(chrome.omnibar_writes().is_empty());
}

#[test]
fn test_pump_without_changes_renders_nothing() {
    let (mut host, fixture) = attached_host("tab-1");
    let before = fixture.chrome().calls.len();
    host.pump();
    assert_eq!(fixture.chrome().calls.len(), before);
}

#[test]
fn test_omnibar_written_when_not_editing_and_different() {
    let (mut host, fixture) = attached_host("tab-1");
    host.controller_mut().on_page_started("https://example.com/");
    host.pump();

    let chrome = fixture.chrome();
    assert_eq!(chrome.omnibar_writes(), vec!["https://example.com/".to_string()]);
    assert_eq!(chrome.count(|c| *c == ChromeCall::CursorToEnd), 1);
    assert_eq!(chrome.count(|c| *c == ChromeCall::ExpandAppBar), 1);
}

#[test]
fn test_editing_snapshot_never_touches_omnibar() {
    let (mut host, fixture) = attached_host("tab-1");
    let state = ViewState {
        is_editing: true,
        omnibar_text: Some("from the page".to_string()),
        ..ViewState::default()
    };
    host.render(&state);
    host.render(&state);
    assert!(fixture.chrome().omnibar_writes().is_empty());
}

#[test]
fn test_absent_omnibar_text_leaves_widget_alone() {
    let (mut host, fixture) = attached_host("tab-1");
    fixture.fakes.chrome.borrow_mut().omnibar = "kept".to_string();
    host.render(&ViewState::default());
    assert!(fixture.chrome().omnibar_writes().is_empty());
    assert_eq!(fixture.chrome().omnibar, "kept");
}

#[test]
fn test_equal_omnibar_text_is_not_rewritten() {
    let (mut host, fixture) = attached_host("tab-1");
    let state = ViewState {
        omnibar_text: Some("https://example.com/".to_string()),
        ..ViewState::default()
    };
    host.render(&state);
    host.render(&state);
    assert_eq!(fixture.chrome().omnibar_writes().len(), 1);
}

#[test]
fn test_user_typing_is_not_overwritten() {
    let (mut host, fixture) = attached_host("tab-1");
    {
        let mut chrome = fixture.fakes.chrome.borrow_mut();
        chrome.omnibar = "half typed".to_string();
        chrome.focused = true;
    }
    host.on_omnibar_text_changed();
    host.controller_mut().on_page_started("https://example.com/");
    host.pump();

    assert!(fixture.chrome().omnibar_writes().is_empty());
    assert_eq!(fixture.chrome().omnibar, "half typed");
}

#[test]
fn test_suggestions_follow_flag() {
    let (mut host, fixture) = attached_host("tab-1");
    let showing = ViewState {
        show_auto_complete_suggestions: true,
        auto_complete_suggestions: vec![AutoCompleteSuggestion::new("rust")],
        ..ViewState::default()
    };
    host.render(&showing);
    assert_eq!(
        fixture.chrome().last_suggestions_call(),
        Some(&ChromeCall::ShowSuggestions(vec!["rust".to_string()]))
    );

    let hidden = ViewState {
        show_auto_complete_suggestions: false,
        ..showing
    };
    host.render(&hidden);
    assert_eq!(fixture.chrome().last_suggestions_call(), Some(&ChromeCall::HideSuggestions));
}

#[test]
fn test_privacy_grade_icon_and_indicators() {
    let (mut host, fixture) = attached_host("tab-1");
    host.render(&ViewState {
        is_loading: true,
        progress: 40,
        show_privacy_grade: true,
        privacy_grade: Some(PrivacyGrade::B),
        show_clear_button: true,
        ..ViewState::default()
    });

    let chrome = fixture.chrome();
    assert!(chrome.calls.contains(&ChromeCall::LoadingIndicator(true)));
    assert!(chrome.calls.contains(&ChromeCall::Progress(40)));
    assert!(chrome.calls.contains(&ChromeCall::PrivacyGradeVisible(true)));
    assert!(chrome.calls.contains(&ChromeCall::PrivacyGradeIcon(PrivacyGrade::B.icon())));
    assert!(chrome.calls.contains(&ChromeCall::ClearButton(true)));
}

#[test]
fn test_menu_items_follow_state_and_engine() {
    let (mut host, fixture) = attached_host("tab-1");
    fixture.fakes.engine.borrow_mut().can_go_back = true;
    host.render(&ViewState {
        browser_showing: true,
        can_add_bookmarks: true,
        ..ViewState::default()
    });

    let chrome = fixture.chrome();
    assert!(chrome.calls.contains(&ChromeCall::MenuItemEnabled(MenuItem::Back, true)));
    assert!(chrome.calls.contains(&ChromeCall::MenuItemEnabled(MenuItem::Forward, false)));
    assert!(chrome.calls.contains(&ChromeCall::MenuItemEnabled(MenuItem::Refresh, true)));
    assert!(chrome.calls.contains(&ChromeCall::MenuItemEnabled(MenuItem::AddBookmark, true)));
}

#[test]
fn test_full_screen_triggers_once_per_transition() {
    let (mut host, fixture) = attached_host("tab-1");
    let full = ViewState {
        is_full_screen: true,
        ..ViewState::default()
    };
    host.render(&full);
    host.render(&full);
    assert!(host.is_full_screen());
    assert_eq!(fixture.chrome().count(|c| *c == ChromeCall::ShowFullScreen), 1);
    assert_eq!(fixture.actions.count(&ActionCall::ToggleFullScreen), 1);

    let normal = ViewState::default();
    host.render(&normal);
    host.render(&normal);
    assert!(!host.is_full_screen());
    assert_eq!(fixture.chrome().count(|c| *c == ChromeCall::HideFullScreen), 1);
    assert_eq!(fixture.actions.count(&ActionCall::ToggleFullScreen), 2);
}

#[test]
fn test_full_screen_request_shows_content() {
    let (mut host, fixture) = attached_host("tab-1");
    host.controller_mut().on_full_screen_requested(FullScreenHandle(9));
    host.pump();

    let chrome = fixture.chrome();
    assert_eq!(chrome.count(|c| *c == ChromeCall::ShowFullScreen), 1);
    assert!(chrome
        .calls
        .contains(&ChromeCall::FullScreenContent(FullScreenHandle(9))));
}

#[test]
fn test_stopped_render_updates_are_ignored() {
    let (mut host, fixture) = attached_host("tab-1");
    host.clear_view_prior_to_animation();
    assert!(!host.is_accepting_render_updates());
    let after_clear = fixture.chrome().calls.len();

    host.controller_mut().on_page_started("https://example.com/");
    host.pump();
    assert_eq!(fixture.chrome().calls.len(), after_clear);

    host.resume_render_updates();
    host.pump();
    let chrome = fixture.chrome();
    assert!(chrome.calls[after_clear..].contains(&ChromeCall::BrowserVisible(true)));
    assert!(chrome.calls[after_clear..].contains(&ChromeCall::OmnibarText("https://example.com/".to_string())));
}

#[test]
fn test_resume_restores_blanked_tab_without_new_state() {
    let (mut host, fixture) = attached_host("tab-1");
    host.controller_mut().on_page_started("https://example.com/");
    host.pump();

    host.clear_view_prior_to_animation();
    let after_clear = fixture.chrome().calls.len();
    host.resume_render_updates();
    host.pump();

    let chrome = fixture.chrome();
    assert_eq!(chrome.omnibar, "https://example.com/");
    assert!(chrome.calls[after_clear..].contains(&ChromeCall::BrowserVisible(true)));
}

#[test]
fn test_clear_view_prior_to_animation_blanks_tab() {
    let (mut host, fixture) = attached_host("tab-1");
    fixture.fakes.chrome.borrow_mut().omnibar = "https://example.com/".to_string();
    host.clear_view_prior_to_animation();

    let chrome = fixture.chrome();
    assert_eq!(chrome.omnibar, "");
    assert!(chrome.calls.ends_with(&[
        ChromeCall::PrivacyGradeVisible(false),
        ChromeCall::OmnibarText(String::new()),
        ChromeCall::HideKeyboard,
        ChromeCall::BrowserVisible(false),
    ]));
}

// === Commands ===

#[test]
fn test_submit_navigates_engine() {
    let (mut host, fixture) = attached_host("tab-1");
    host.controller_mut().on_user_submitted_query("example.com");
    host.pump();

    assert_eq!(fixture.engine().loaded, vec!["https://example.com/".to_string()]);
    let chrome = fixture.chrome();
    assert!(chrome.calls.contains(&ChromeCall::HideKeyboard));
    assert!(chrome.calls.contains(&ChromeCall::FocusDummy));
}

#[test]
fn test_each_command_kind_is_executed() {
    let (mut host, fixture) = attached_host("tab-1");
    host.process_command(Command::Refresh);
    host.process_command(Command::ShowKeyboard);
    host.process_command(Command::ReinitializeView);
    host.process_command(Command::DialNumber("555".to_string()));
    host.process_command(Command::SendEmail("mailto:a@example.com".to_string()));
    host.process_command(Command::SendSms("555".to_string()));

    assert_eq!(fixture.engine().reloads, 1);
    assert_eq!(fixture.engine().history_cleared, 1);
    assert!(fixture.chrome().calls.contains(&ChromeCall::ShowKeyboard(KEYBOARD_DELAY)));
    assert_eq!(
        *fixture.actions.calls.borrow(),
        vec![
            ActionCall::External(ExternalIntent::Dial("555".to_string())),
            ActionCall::External(ExternalIntent::Email("mailto:a@example.com".to_string())),
            ActionCall::External(ExternalIntent::Sms("555".to_string())),
        ]
    );
}

#[test]
fn test_commands_emitted_before_attach_are_not_replayed() {
    let (mut host, fixture) = host("tab-1");
    host.controller_mut().on_refresh_requested();
    host.attach();
    host.pump();
    assert_eq!(fixture.engine().reloads, 0);
}

#[test]
fn test_commands_emitted_while_detached_are_dropped() {
    let (mut host, fixture) = attached_host("tab-1");
    host.detach();
    host.controller_mut().on_refresh_requested();
    host.attach();
    host.pump();
    assert_eq!(fixture.engine().reloads, 0);

    host.controller_mut().on_refresh_requested();
    host.pump();
    assert_eq!(fixture.engine().reloads, 1);
}

#[test]
fn test_detached_host_does_not_render() {
    let (mut host, fixture) = attached_host("tab-1");
    host.detach();
    let before = fixture.chrome().calls.len();
    host.controller_mut().on_page_started("https://example.com/");
    host.pump();
    assert_eq!(fixture.chrome().calls.len(), before);
}

#[test]
fn test_reattach_renders_latest_snapshot() {
    let (mut host, fixture) = attached_host("tab-1");
    host.detach();
    host.controller_mut().on_page_started("https://example.com/");
    host.attach();
    host.pump();
    assert_eq!(fixture.chrome().omnibar, "https://example.com/");
}

// === Lifecycle ===

#[test]
fn test_destroy_releases_engine() {
    let (mut host, fixture) = attached_host("tab-1");
    host.destroy();
    assert_eq!(host.lifecycle(), HostLifecycle::Destroyed);
    assert!(fixture.engine().destroyed);

    host.attach();
    assert_eq!(host.lifecycle(), HostLifecycle::Destroyed);
}

#[test]
fn test_destroy_leaves_full_screen() {
    let (mut host, fixture) = attached_host("tab-1");
    host.controller_mut().on_full_screen_requested(FullScreenHandle(3));
    host.pump();
    assert_eq!(fixture.actions.count(&ActionCall::ToggleFullScreen), 1);

    host.destroy();
    assert!(!host.is_full_screen());
    assert_eq!(fixture.actions.count(&ActionCall::ToggleFullScreen), 2);

    host.destroy();
    assert_eq!(fixture.actions.count(&ActionCall::ToggleFullScreen), 2);
}

#[test]
fn test_show_and_hide() {
    let (mut host, fixture) = host("tab-1");
    host.show();
    assert!(host.is_visible());
    host.hide();
    assert!(!host.is_visible());
    assert_eq!(
        fixture.chrome().calls,
        vec![ChromeCall::HostVisible(true), ChromeCall::HostVisible(false)]
    );
}

// === Downloads ===

#[test]
fn test_download_with_permission_starts_immediately() {
    let (mut host, fixture) = attached_host("tab-1");
    host.on_long_press_image_download("https://example.com/img/cat.png");
    host.pump();

    let downloads = fixture.fakes.downloads.borrow();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].file_name, "cat.png");
    assert_eq!(
        fixture.chrome().notices(),
        vec![Notice::DownloadStarted("cat.png".to_string())]
    );
}

#[test]
fn test_denied_permission_shows_one_notice_and_no_download() {
    let (mut host, fixture) = host_with("tab-1", false, None);
    host.attach();
    host.on_download_requested("https://example.com/report.pdf");
    assert_eq!(fixture.fakes.permission.prompts.get(), 1);
    assert!(host.downloads().pending().is_some());

    host.on_permission_result(false);
    assert!(fixture.fakes.downloads.borrow().is_empty());
    assert_eq!(fixture.chrome().notices(), vec![Notice::PermissionRequiredToDownload]);

    // A stray second answer has nothing to act on.
    host.on_permission_result(false);
    assert_eq!(fixture.chrome().notices().len(), 1);
}

#[test]
fn test_granted_permission_submits_pending_download() {
    let (mut host, fixture) = host_with("tab-1", false, None);
    host.attach();
    host.on_download_requested("https://example.com/report.pdf");
    host.on_permission_result(true);

    assert_eq!(fixture.fakes.downloads.borrow()[0].url, "https://example.com/report.pdf");
    assert!(host.downloads().pending().is_none());
}

// === Input ===

#[test]
fn test_menu_items_route_to_actions() {
    let (mut host, fixture) = attached_host("tab-1");
    host.on_menu_item(MenuItem::Tabs);
    host.on_menu_item(MenuItem::NewTab);
    host.on_menu_item(MenuItem::PrivacyDashboard);
    host.on_menu_item(MenuItem::Fire);
    host.on_menu_item(MenuItem::Settings);
    host.on_menu_item(MenuItem::Bookmarks);

    assert_eq!(
        *fixture.actions.calls.borrow(),
        vec![
            ActionCall::TabSwitcher,
            ActionCall::NewTab,
            ActionCall::PrivacyDashboard("tab-1".to_string()),
            ActionCall::Fire,
            ActionCall::Settings,
            ActionCall::Bookmarks,
        ]
    );
}

#[test]
fn test_menu_navigation_items_drive_engine() {
    let (mut host, fixture) = attached_host("tab-1");
    host.on_menu_item(MenuItem::Back);
    host.on_menu_item(MenuItem::Forward);
    host.on_menu_item(MenuItem::Refresh);

    let engine = fixture.engine();
    assert_eq!((engine.back, engine.forward, engine.reloads), (1, 1, 1));
}

#[test]
fn test_add_bookmark_opens_dialog_with_page_details() {
    let (mut host, fixture) = attached_host("tab-1");
    {
        let mut engine = fixture.fakes.engine.borrow_mut();
        engine.title = Some("Example".to_string());
        engine.url = Some("https://example.com/".to_string());
    }
    host.on_menu_item(MenuItem::AddBookmark);
    assert!(fixture.chrome().calls.contains(&ChromeCall::BookmarkDialog(
        Some("Example".to_string()),
        Some("https://example.com/".to_string())
    )));
}

#[test]
fn test_bookmark_results_surface_as_notices() {
    let (mut host, fixture) = attached_host("tab-1");
    host.on_bookmark_saved(Ok("id".to_string()));
    host.on_bookmark_saved(Err("disk full".to_string()));
    assert_eq!(
        fixture.chrome().notices(),
        vec![Notice::BookmarkAdded, Notice::BookmarkFailed]
    );
}

#[test]
fn test_suggestion_selected_submits_phrase() {
    let (mut host, fixture) = attached_host("tab-1");
    host.on_suggestion_selected("rust");
    host.pump();
    assert_eq!(
        fixture.engine().loaded,
        vec!["https://duckduckgo.com/?q=rust".to_string()]
    );
}

#[test]
fn test_suggestion_edit_writes_phrase_and_raises_keyboard() {
    let (mut host, fixture) = attached_host("tab-1");
    host.on_suggestion_edit_requested("rust lifetimes");
    host.pump();

    let chrome = fixture.chrome();
    assert_eq!(chrome.omnibar, "rust lifetimes");
    assert!(chrome.calls.contains(&ChromeCall::ShowKeyboard(Duration::from_millis(300))));
}

#[test]
fn test_omnibar_submit_uses_widget_text() {
    let (mut host, fixture) = attached_host("tab-1");
    fixture.fakes.chrome.borrow_mut().omnibar = "https://rust-lang.org/".to_string();
    host.on_omnibar_submitted();
    host.pump();
    assert_eq!(fixture.engine().loaded, vec!["https://rust-lang.org/".to_string()]);
}

#[test]
fn test_back_key_consumed_only_while_editing() {
    let (mut host, fixture) = attached_host("tab-1");
    assert!(!host.on_omnibar_back_key());

    {
        let mut chrome = fixture.fakes.chrome.borrow_mut();
        chrome.omnibar = "draft".to_string();
        chrome.focused = true;
    }
    host.on_omnibar_focus_changed(true);
    assert!(host.on_omnibar_back_key());
    assert!(!host.controller().view_state().is_editing);
}

#[test]
fn test_clear_button_empties_omnibar() {
    let (mut host, fixture) = attached_host("tab-1");
    {
        let mut chrome = fixture.fakes.chrome.borrow_mut();
        chrome.omnibar = "draft".to_string();
        chrome.focused = true;
    }
    host.on_omnibar_text_changed();
    host.on_clear_omnibar();

    let state = host.controller().view_state();
    assert_eq!(state.omnibar_text.as_deref(), Some(""));
    assert!(!state.show_clear_button);
    assert!(state.is_editing);
}

#[test]
fn test_touching_page_drops_omnibar_focus() {
    let (mut host, fixture) = attached_host("tab-1");
    fixture.fakes.chrome.borrow_mut().focused = true;
    host.on_web_content_touched();
    assert!(!fixture.chrome().focused);
}

#[test]
fn test_go_back_only_when_engine_can() {
    let (mut host, fixture) = attached_host("tab-1");
    assert!(!host.go_back());
    fixture.fakes.engine.borrow_mut().can_go_back = true;
    assert!(host.go_back());
    assert_eq!(fixture.engine().back, 1);
}
