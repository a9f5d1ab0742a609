use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    pub api_key: Option<String>,
    pub chat_model: String,
    pub analyze_model: String,
    pub library_panel_width: Option<f64>,
    pub chat_history_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_model: "gemini-3-pro-preview".to_string(),
            analyze_model: "gemini-2.5-flash".to_string(),
            library_panel_width: Some(320.0),
            chat_history_length: 6,
        }
    }
}

pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    pub fn new(settings_path: PathBuf) -> Self {
        Self { settings_path }
    }

    pub fn load(&self) -> Settings {
        if !self.settings_path.exists() {
            return Settings::default();
        }

        fs::read_to_string(&self.settings_path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, settings: &Settings) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(settings)?;
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.settings_path, content)
    }
}

/// Resolves the API key: keychain first where available, then the settings
/// file, then the environment (which also serves `.env` in development).
pub fn resolve_api_key(settings: &Settings) -> Option<String> {
    if let Ok(key) = crate::secure_storage::retrieve_secret("gemini_api_key") {
        if !key.is_empty() {
            return Some(key);
        }
    }
    if let Some(key) = settings.api_key.as_ref().filter(|k| !k.is_empty()) {
        return Some(key.clone());
    }
    std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())
}
