//! Settings Engine for tabhost.
//!
//! Loads and saves [`ShellSettings`] as JSON in the platform config
//! directory and updates single values by key.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::ShellSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ShellSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ShellSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

pub struct SettingsEngine {
    config_path: String,
    settings: ShellSettings,
}

impl SettingsEngine {
    /// `path_override` replaces `<config dir>/settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string()
        });

        Self {
            config_path,
            settings: ShellSettings::default(),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// A missing file yields defaults; a malformed one is an error.
    /// Unknown keys are ignored and absent keys take their default.
    fn load(&mut self) -> Result<ShellSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!(path = %self.config_path, "no settings file; using defaults");
            self.settings = ShellSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: ShellSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;

        info!(path = %self.config_path, "loaded settings");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &ShellSettings {
        &self.settings
    }

    /// Sets one value by dot-separated key (`"search_url"`,
    /// `"keyboard_show_delay_ms"`) and saves. The value must deserialize
    /// into the field's type.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let unknown = || SettingsError::InvalidKey(format!("Key '{}' not found in settings", key));
        let parts: Vec<&str> = key.split('.').collect();
        let Some((field, path)) = parts.split_last() else {
            return Err(unknown());
        };

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let mut target = &mut json_value;
        for part in path {
            target = target.get_mut(*part).ok_or_else(unknown)?;
        }
        match target {
            serde_json::Value::Object(map) if map.contains_key(*field) => {
                map.insert(field.to_string(), value);
            }
            serde_json::Value::Object(_) => return Err(unknown()),
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Cannot navigate to key '{}': intermediate value is not an object",
                    key
                )))
            }
        }

        let new_settings: ShellSettings =
            serde_json::from_value(json_value).map_err(|e| {
                SettingsError::InvalidValue(format!(
                    "Invalid value for key '{}': {}",
                    key, e
                ))
            })?;

        self.settings = new_settings;
        debug!(key, "setting updated");
        self.save()?;

        Ok(())
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ShellSettings::default();
        self.save()?;
        Ok(())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
