use serde::{Deserialize, Serialize};

/// Letter grade shown in the toolbar privacy indicator.
///
/// Grading itself happens upstream; the shell only displays the result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PrivacyGrade {
    A,
    B,
    C,
    D,
}

impl PrivacyGrade {
    /// Icon resource used by the toolbar menu item.
    pub fn icon(&self) -> &'static str {
        match self {
            PrivacyGrade::A => "privacygrade_icon_a",
            PrivacyGrade::B => "privacygrade_icon_b",
            PrivacyGrade::C => "privacygrade_icon_c",
            PrivacyGrade::D => "privacygrade_icon_d",
        }
    }
}
