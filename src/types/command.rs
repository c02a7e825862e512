use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a downloaded file should land.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadDestination {
    Downloads,
    Pictures,
}

impl DownloadDestination {
    pub fn directory_name(&self) -> &'static str {
        match self {
            DownloadDestination::Downloads => "Download",
            DownloadDestination::Pictures => "Pictures",
        }
    }
}

/// Opaque handle to web content that asked to go full screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FullScreenHandle(pub u64);

impl fmt::Display for FullScreenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fullscreen#{}", self.0)
    }
}

/// One-shot instruction from a tab's controller to its host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    Refresh,
    NavigateTo(String),
    ShowKeyboard,
    HideKeyboard,
    ReinitializeView,
    ShowFullScreenContent(FullScreenHandle),
    RequestDownload {
        url: String,
        destination: DownloadDestination,
    },
    DialNumber(String),
    SendEmail(String),
    SendSms(String),
}

/// Intent handed to the platform for links the browser does not render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExternalIntent {
    Dial(String),
    Email(String),
    Sms(String),
}

impl ExternalIntent {
    /// URI the platform launcher is given.
    pub fn uri(&self) -> String {
        match self {
            ExternalIntent::Dial(number) => format!("tel:{}", number),
            ExternalIntent::Email(address) => {
                if address.starts_with("mailto:") {
                    address.clone()
                } else {
                    format!("mailto:{}", address)
                }
            }
            ExternalIntent::Sms(number) => format!("smsto:{}", number),
        }
    }
}
