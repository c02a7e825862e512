use std::fmt;

// === TabError ===

/// Errors related to tab registry operations.
#[derive(Debug)]
pub enum TabError {
    /// Tab with the given ID was not found.
    NotFound(String),
    /// The persisted selection references a tab that was not restored.
    DanglingSelection(String),
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::NotFound(id) => write!(f, "Tab not found: {}", id),
            TabError::DanglingSelection(id) => {
                write!(f, "Selected tab is not in the tab list: {}", id)
            }
        }
    }
}

impl std::error::Error for TabError {}

// === StoreError ===

/// Errors related to tab persistence.
#[derive(Debug)]
pub enum StoreError {
    /// Database operation failed.
    DatabaseError(String),
    /// The shared database lock was poisoned by a panicking writer.
    LockPoisoned,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DatabaseError(msg) => write!(f, "Tab store database error: {}", msg),
            StoreError::LockPoisoned => write!(f, "Tab store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

// === BookmarkError ===

/// Errors related to bookmark operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// The bookmark URL is empty or not a web address.
    InvalidUrl(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::InvalidUrl(url) => write!(f, "Invalid bookmark URL: {}", url),
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

// === DownloadError ===

/// Errors related to download coordination.
#[derive(Debug)]
pub enum DownloadError {
    /// The download URL could not be parsed.
    InvalidUrl(String),
    /// A permission result arrived with nothing waiting on it.
    NoPendingDownload,
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::InvalidUrl(url) => write!(f, "Invalid download URL: {}", url),
            DownloadError::NoPendingDownload => write!(f, "No pending download"),
        }
    }
}

impl std::error::Error for DownloadError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === ShellError ===

/// Errors that stop the browser shell from starting.
#[derive(Debug)]
pub enum ShellError {
    /// The background worker pool could not be started.
    WorkerPool(String),
    /// The tab store could not be opened or restored.
    Store(StoreError),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::WorkerPool(msg) => write!(f, "Failed to start background workers: {}", msg),
            ShellError::Store(e) => write!(f, "Failed to open tab store: {}", e),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Store(e) => Some(e),
            ShellError::WorkerPool(_) => None,
        }
    }
}

impl From<StoreError> for ShellError {
    fn from(e: StoreError) -> Self {
        ShellError::Store(e)
    }
}
