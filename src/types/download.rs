use serde::{Deserialize, Serialize};

use super::command::DownloadDestination;

/// A download waiting on the storage permission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingDownload {
    pub url: String,
    pub destination: DownloadDestination,
}

/// A download handed to the platform download subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub file_name: String,
    pub destination: DownloadDestination,
    pub notify_on_completion: bool,
}
