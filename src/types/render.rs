use serde::{Deserialize, Serialize};

use super::privacy::PrivacyGrade;

/// Upper bound of the page-load progress indicator.
pub const MAX_PROGRESS: u8 = 100;

/// Clamps a raw engine progress value into `0..=MAX_PROGRESS`.
pub fn clamp_progress(progress: i32) -> u8 {
    progress.clamp(0, MAX_PROGRESS as i32) as u8
}

/// A single autocomplete row under the omnibar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoCompleteSuggestion {
    pub phrase: String,
}

impl AutoCompleteSuggestion {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
        }
    }
}

/// Immutable description of what a tab's UI should display.
///
/// Produced by the tab's controller and applied by its host; the host never
/// writes back into a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ViewState {
    pub browser_showing: bool,
    pub is_loading: bool,
    pub progress: u8,
    pub omnibar_text: Option<String>,
    pub is_editing: bool,
    pub privacy_grade: Option<PrivacyGrade>,
    pub show_privacy_grade: bool,
    pub show_clear_button: bool,
    pub show_fire_button: bool,
    pub can_add_bookmarks: bool,
    pub show_auto_complete_suggestions: bool,
    pub auto_complete_suggestions: Vec<AutoCompleteSuggestion>,
    pub is_full_screen: bool,
}
