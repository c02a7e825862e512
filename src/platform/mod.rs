//! Platform directories for tabhost.
//!
//! `settings.json` lives in the config directory, the SQLite database in the
//! data directory. The layout is picked per target at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as native;

#[cfg(target_os = "macos")]
use macos as native;

#[cfg(target_os = "windows")]
use windows as native;

/// Directory name used on case-sensitive layouts.
pub const APP_DIR: &str = "tabhost";

/// Directory name used where vendors capitalise application folders.
pub const APP_DIR_TITLE: &str = "Tabhost";

/// - **Linux**: `$XDG_CONFIG_HOME/tabhost`, else `~/.config/tabhost`
/// - **macOS**: `~/Library/Application Support/Tabhost`
/// - **Windows**: `%APPDATA%\Tabhost`
pub fn get_config_dir() -> PathBuf {
    native::get_config_dir()
}

/// - **Linux**: `$XDG_DATA_HOME/tabhost`, else `~/.local/share/tabhost`
/// - **macOS**: `~/Library/Application Support/Tabhost`
/// - **Windows**: `%LOCALAPPDATA%\Tabhost`
pub fn get_data_dir() -> PathBuf {
    native::get_data_dir()
}

/// Full path of the tab database named in the settings.
pub fn database_path(file_name: &str) -> PathBuf {
    get_data_dir().join(file_name)
}
