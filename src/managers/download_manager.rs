//! Download Manager for tabhost.
//!
//! Coordinates a tab's file downloads with the storage permission. Holds at
//! most one pending download while the permission prompt is open; once the
//! request is handed to the platform downloader nothing else is tracked.

use tracing::{debug, info};
use url::Url;

use crate::types::command::DownloadDestination;
use crate::types::download::{DownloadRequest, PendingDownload};
use crate::types::errors::DownloadError;

const FALLBACK_FILE_NAME: &str = "downloadfile.bin";

/// Platform storage-write permission.
pub trait StoragePermission {
    fn has_write_permission(&self) -> bool;
    /// Opens the permission prompt; the answer arrives through
    /// [`DownloadManager::on_permission_result`].
    fn request_write_permission(&mut self);
}

/// Platform download subsystem. Fire-and-forget.
pub trait Downloader {
    fn enqueue(&mut self, request: DownloadRequest);
}

/// What happened to a download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Started(DownloadRequest),
    AwaitingPermission,
    Denied,
}

/// Trait defining download coordination operations.
pub trait DownloadManagerTrait {
    fn request(&mut self, url: &str, destination: DownloadDestination) -> Result<DownloadOutcome, DownloadError>;
    fn on_permission_result(&mut self, granted: bool) -> Result<DownloadOutcome, DownloadError>;
    fn pending(&self) -> Option<&PendingDownload>;
}

/// Permission-gated download coordinator for one tab.
pub struct DownloadManager {
    permission: Box<dyn StoragePermission>,
    downloader: Box<dyn Downloader>,
    pending: Option<PendingDownload>,
}

/// Best-effort file name from the last path segment of `url`.
pub fn guess_file_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .map(|segment| {
            urlencoding::decode(&segment)
                .map(|s| s.into_owned())
                .unwrap_or(segment)
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

impl DownloadManager {
    pub fn new(permission: Box<dyn StoragePermission>, downloader: Box<dyn Downloader>) -> Self {
        Self {
            permission,
            downloader,
            pending: None,
        }
    }

    fn submit(&mut self) -> Result<DownloadOutcome, DownloadError> {
        let pending = self.pending.take().ok_or(DownloadError::NoPendingDownload)?;
        let request = DownloadRequest {
            file_name: guess_file_name(&pending.url),
            url: pending.url,
            destination: pending.destination,
            notify_on_completion: true,
        };
        info!(
            file_name = %request.file_name,
            url = %request.url,
            directory = request.destination.directory_name(),
            "enqueueing download"
        );
        self.downloader.enqueue(request.clone());
        Ok(DownloadOutcome::Started(request))
    }
}

impl DownloadManagerTrait for DownloadManager {
    /// Replaces any pending download, then submits or asks for permission.
    fn request(&mut self, url: &str, destination: DownloadDestination) -> Result<DownloadOutcome, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::InvalidUrl(url.to_string()))?;

        self.pending = Some(PendingDownload {
            url: url.to_string(),
            destination,
        });

        if self.permission.has_write_permission() {
            self.submit()
        } else {
            debug!(url, "requesting storage permission");
            self.permission.request_write_permission();
            Ok(DownloadOutcome::AwaitingPermission)
        }
    }

    fn on_permission_result(&mut self, granted: bool) -> Result<DownloadOutcome, DownloadError> {
        if self.pending.is_none() {
            return Err(DownloadError::NoPendingDownload);
        }
        if granted {
            info!("Permission granted");
            self.submit()
        } else {
            info!("Permission refused");
            self.pending = None;
            Ok(DownloadOutcome::Denied)
        }
    }

    fn pending(&self) -> Option<&PendingDownload> {
        self.pending.as_ref()
    }
}
