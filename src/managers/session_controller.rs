//! Session Controller for tabhost.
//!
//! The per-tab view model. It is the only writer of its tab's [`ViewState`],
//! publishes each new snapshot on a watch channel and emits one-shot
//! [`Command`]s through a [`CommandChannel`].

use tokio::sync::watch;
use tracing::debug;
use url::{Host, Url};

use crate::managers::command_channel::{CommandChannel, CommandReceiver};
use crate::types::command::{Command, DownloadDestination, FullScreenHandle};
use crate::types::privacy::PrivacyGrade;
use crate::types::render::{clamp_progress, AutoCompleteSuggestion, ViewState, MAX_PROGRESS};

const WEB_SCHEMES: [&str; 4] = ["http", "https", "ftp", "about"];

/// `query` as an https URL when it names a host: a dotted domain ending in
/// an alphabetic (or punycode) top-level label, or a full dotted-quad IPv4
/// address. Numbers like `3.5` are left to the search.
fn bare_host_url(query: &str) -> Option<Url> {
    if query.contains(char::is_whitespace) || query.starts_with('.') {
        return None;
    }
    let parsed = Url::parse(&format!("https://{}", query)).ok()?;
    let accepted = match parsed.host()? {
        Host::Domain(domain) => domain.contains('.') && domain.rsplit('.').next().is_some_and(is_top_level_label),
        Host::Ipv4(_) => {
            let authority = query.split(['/', ':', '?', '#']).next().unwrap_or_default();
            let octets: Vec<&str> = authority.split('.').collect();
            octets.len() == 4 && octets.iter().all(|o| !o.is_empty() && o.chars().all(|c| c.is_ascii_digit()))
        }
        Host::Ipv6(_) => false,
    };
    accepted.then_some(parsed)
}

fn is_top_level_label(label: &str) -> bool {
    label.starts_with("xn--") || (label.len() >= 2 && label.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Trait defining the input surface a host forwards to its controller.
pub trait SessionControllerTrait {
    fn on_omnibar_input_state_changed(&mut self, query: &str, has_focus: bool);
    fn on_user_submitted_query(&mut self, query: &str);
    fn on_user_selected_to_edit_query(&mut self, phrase: &str);
    fn user_dismissed_keyboard(&mut self) -> bool;
    fn on_shared_text_received(&mut self, text: &str);
    fn on_image_download_requested(&mut self, url: &str);
    fn on_refresh_requested(&mut self);
}

/// View model for a single tab.
pub struct SessionController {
    tab_id: String,
    search_url: String,
    url: Option<String>,
    title: Option<String>,
    state: watch::Sender<ViewState>,
    commands: CommandChannel,
}

impl SessionController {
    pub fn new(tab_id: impl Into<String>, search_url: impl Into<String>) -> Self {
        let initial = ViewState {
            omnibar_text: Some(String::new()),
            show_fire_button: true,
            ..ViewState::default()
        };
        let (state, _) = watch::channel(initial);
        Self {
            tab_id: tab_id.into(),
            search_url: search_url.into(),
            url: None,
            title: None,
            state,
            commands: CommandChannel::new(),
        }
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Latest published snapshot.
    pub fn view_state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn attach_commands(&mut self) -> CommandReceiver {
        self.commands.attach()
    }

    pub fn detach_commands(&mut self) {
        self.commands.detach();
    }

    pub fn dropped_commands(&self) -> u64 {
        self.commands.dropped_count()
    }

    /// Publishes a new snapshot only when `change` actually alters it.
    fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut ViewState),
    {
        self.state.send_if_modified(|state| {
            let before = state.clone();
            change(state);
            *state != before
        });
    }

    fn emit(&mut self, command: Command) {
        self.commands.emit(command);
    }

    /// Turns omnibar input into a navigable URL, falling back to a search.
    pub fn url_for_query(&self, query: &str) -> String {
        let query = query.trim();

        if let Ok(parsed) = Url::parse(query) {
            if WEB_SCHEMES.contains(&parsed.scheme()) {
                return parsed.to_string();
            }
        }

        if let Some(url) = bare_host_url(query) {
            return url.to_string();
        }

        format!("{}{}", self.search_url, urlencoding::encode(query))
    }

    /// Loads `url` as is, without query handling. Used to reopen restored tabs.
    pub fn navigate(&mut self, url: String) {
        let text = url.clone();
        self.update(|s| {
            s.browser_showing = true;
            s.omnibar_text = Some(text);
        });
        self.emit(Command::NavigateTo(url));
    }

    // Web engine callbacks

    pub fn on_page_started(&mut self, url: &str) {
        self.url = Some(url.to_string());
        self.title = None;
        let url = url.to_string();
        self.update(|s| {
            s.browser_showing = true;
            s.is_loading = true;
            s.progress = 0;
            s.can_add_bookmarks = true;
            s.show_privacy_grade = true;
            if !s.is_editing {
                s.omnibar_text = Some(url);
            }
        });
    }

    pub fn on_progress_changed(&mut self, progress: i32) {
        self.update(|s| {
            let clamped = clamp_progress(progress);
            s.progress = clamped;
            s.is_loading = clamped < MAX_PROGRESS;
        });
    }

    pub fn on_page_finished(&mut self, url: &str, title: Option<&str>) {
        self.url = Some(url.to_string());
        self.title = title.map(str::to_string);
        self.update(|s| {
            s.is_loading = false;
            s.progress = MAX_PROGRESS;
        });
    }

    pub fn on_privacy_grade_changed(&mut self, grade: PrivacyGrade) {
        self.update(|s| s.privacy_grade = Some(grade));
    }

    /// Routes non-web links to the platform. Returns `true` when handled.
    pub fn on_url_intercepted(&mut self, url: &str) -> bool {
        if let Some(number) = url.strip_prefix("tel:") {
            self.emit(Command::DialNumber(number.to_string()));
            return true;
        }
        if url.starts_with("mailto:") {
            self.emit(Command::SendEmail(url.to_string()));
            return true;
        }
        if let Some(number) = url
            .strip_prefix("smsto:")
            .or_else(|| url.strip_prefix("sms:"))
        {
            self.emit(Command::SendSms(number.to_string()));
            return true;
        }
        false
    }

    pub fn on_full_screen_requested(&mut self, handle: FullScreenHandle) {
        self.update(|s| s.is_full_screen = true);
        self.emit(Command::ShowFullScreenContent(handle));
    }

    pub fn on_full_screen_exited(&mut self) {
        self.update(|s| s.is_full_screen = false);
    }

    /// Suggestions for `query`; stale results for an older query are dropped.
    pub fn on_auto_complete_results(&mut self, query: &str, suggestions: Vec<AutoCompleteSuggestion>) {
        let current = self.state.borrow().omnibar_text.clone();
        if current.as_deref() != Some(query) {
            debug!(tab_id = %self.tab_id, query, "ignoring stale autocomplete results");
            return;
        }
        self.update(|s| s.auto_complete_suggestions = suggestions);
    }

    /// Clears the tab back to its landing state.
    pub fn reset_view(&mut self) {
        self.url = None;
        self.title = None;
        self.update(|s| {
            *s = ViewState {
                omnibar_text: Some(String::new()),
                show_fire_button: true,
                ..ViewState::default()
            };
        });
        self.emit(Command::ReinitializeView);
    }
}

impl SessionControllerTrait for SessionController {
    fn on_omnibar_input_state_changed(&mut self, query: &str, has_focus: bool) {
        let query = query.to_string();
        let page_url = self.url.clone();
        self.update(|s| {
            let typing = has_focus && !query.is_empty();
            s.is_editing = has_focus;
            s.show_clear_button = typing;
            s.show_auto_complete_suggestions = typing;
            if !typing {
                s.auto_complete_suggestions.clear();
            }
            s.omnibar_text = if has_focus {
                Some(query)
            } else {
                page_url.or(Some(query))
            };
        });
    }

    fn on_user_submitted_query(&mut self, query: &str) {
        if query.trim().is_empty() {
            return;
        }
        let url = self.url_for_query(query);
        debug!(tab_id = %self.tab_id, %url, "navigating");

        self.update(|s| {
            s.is_editing = false;
            s.show_clear_button = false;
            s.show_auto_complete_suggestions = false;
            s.auto_complete_suggestions.clear();
        });
        self.emit(Command::HideKeyboard);
        self.navigate(url);
    }

    fn on_user_selected_to_edit_query(&mut self, phrase: &str) {
        let phrase = phrase.to_string();
        // Not editing for this one snapshot so the host writes the phrase.
        self.update(|s| {
            s.is_editing = false;
            s.omnibar_text = Some(phrase);
        });
        self.emit(Command::ShowKeyboard);
    }

    fn user_dismissed_keyboard(&mut self) -> bool {
        let editing = self.state.borrow().is_editing;
        if !editing {
            return false;
        }
        let page_url = self.url.clone();
        self.update(|s| {
            s.is_editing = false;
            s.show_auto_complete_suggestions = false;
            s.show_clear_button = false;
            if page_url.is_some() {
                s.omnibar_text = page_url;
            }
        });
        true
    }

    fn on_shared_text_received(&mut self, text: &str) {
        self.on_user_submitted_query(text);
    }

    fn on_image_download_requested(&mut self, url: &str) {
        self.emit(Command::RequestDownload {
            url: url.to_string(),
            destination: DownloadDestination::Pictures,
        });
    }

    fn on_refresh_requested(&mut self) {
        self.emit(Command::Refresh);
    }
}
