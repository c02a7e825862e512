// Roaming %APPDATA% for settings, %LOCALAPPDATA% for the tab database.

use std::env;
use std::path::PathBuf;

use super::APP_DIR_TITLE;

fn known_folder(var: &str) -> PathBuf {
    match env::var(var) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let profile = env::var("USERPROFILE").unwrap_or_else(|_| String::from("C:\\Users\\Default"));
            PathBuf::from(profile).join("AppData").join("Roaming")
        }
    }
}

pub fn get_config_dir() -> PathBuf {
    known_folder("APPDATA").join(APP_DIR_TITLE)
}

pub fn get_data_dir() -> PathBuf {
    known_folder("LOCALAPPDATA").join(APP_DIR_TITLE)
}
