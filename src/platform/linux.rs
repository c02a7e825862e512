// XDG base directories, falling back to the usual dot-directories under $HOME.

use std::env;
use std::path::PathBuf;

use super::APP_DIR;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join(APP_DIR),
        _ => fallback
            .iter()
            .fold(home_dir(), |path, part| path.join(part))
            .join(APP_DIR),
    }
}

pub fn get_config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

pub fn get_data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}
