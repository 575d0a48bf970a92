//! Application settings storage
//!
//! Stores cleaner configuration in a JSON file in the app data directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::policy::cleaner::{CleanerConfig, DEFAULT_FALLBACK_CHARS};

/// Global settings instance
static SETTINGS: RwLock<Option<Settings>> = RwLock::new(None);

/// Path to config file (set during init)
static CONFIG_PATH: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Overrides the stored fallback length
pub const FALLBACK_CHARS_ENV: &str = "POLICY_REPORT_FALLBACK_CHARS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Characters kept when a bulletin has no PURPOSE/Codes section
    #[serde(default = "default_fallback_chars")]
    pub fallback_chars: usize,
    /// Removed in addition to the built-in boilerplate phrases
    #[serde(default)]
    pub extra_noise_phrases: Vec<String>,
    #[serde(default = "default_true")]
    pub log_to_file: bool,
}

fn default_fallback_chars() -> usize {
    DEFAULT_FALLBACK_CHARS
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fallback_chars: DEFAULT_FALLBACK_CHARS,
            extra_noise_phrases: Vec::new(),
            log_to_file: true,
        }
    }
}

impl Settings {
    /// Load settings from disk or create default
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => {
                    serde_json::from_str(&content).unwrap_or_default()
                }
                Err(_) => Settings::default(),
            }
        } else {
            Settings::default()
        }
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, content)
            .map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }

    /// Cleaner configuration, with the env var taking precedence
    pub fn cleaner_config(&self) -> CleanerConfig {
        CleanerConfig {
            fallback_chars: env_fallback_chars().unwrap_or(self.fallback_chars),
            extra_noise_phrases: self.extra_noise_phrases.clone(),
        }
    }
}

fn env_fallback_chars() -> Option<usize> {
    std::env::var(FALLBACK_CHARS_ENV).ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
}

/// Default app data directory: `<data_dir>/policy-report`
pub fn default_app_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("policy-report"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Initialize settings with the app data directory
pub fn init(app_data_dir: PathBuf) {
    let config_path = app_data_dir.join("settings.json");
    let settings = Settings::load(&config_path);

    if let Ok(mut guard) = CONFIG_PATH.write() {
        *guard = Some(config_path);
    }
    if let Ok(mut guard) = SETTINGS.write() {
        *guard = Some(settings);
    }
}

/// Snapshot of the current settings (defaults if not initialized)
pub fn current() -> Settings {
    SETTINGS.read().ok()
        .and_then(|guard| (*guard).clone())
        .unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    CONFIG_PATH.read().ok().and_then(|guard| (*guard).clone())
}

/// Cleaner configuration from the current settings
pub fn cleaner_config() -> CleanerConfig {
    current().cleaner_config()
}

pub fn log_to_file() -> bool {
    current().log_to_file
}

/// Apply `change` to the stored settings and save them to disk
fn update<F: FnOnce(&mut Settings)>(change: F) -> Result<(), String> {
    let mut settings_guard = SETTINGS.write()
        .map_err(|_| "Failed to acquire settings lock")?;

    let settings = settings_guard.get_or_insert_with(Settings::default);
    change(settings);

    // Save to disk
    let config_path = CONFIG_PATH.read()
        .map_err(|_| "Failed to acquire config path lock")?
        .clone()
        .ok_or("Settings not initialized")?;

    settings.save(&config_path)
}

pub fn set_fallback_chars(chars: usize) -> Result<(), String> {
    if chars == 0 {
        return Err("fallback-chars must be greater than 0".to_string());
    }
    update(|s| s.fallback_chars = chars)
}

pub fn set_log_to_file(enabled: bool) -> Result<(), String> {
    update(|s| s.log_to_file = enabled)
}

/// Add a noise phrase (ignored if already present, case-insensitively)
pub fn add_noise_phrase(phrase: &str) -> Result<(), String> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Err("Noise phrase cannot be empty".to_string());
    }
    update(|s| {
        let exists = s.extra_noise_phrases.iter()
            .any(|p| p.eq_ignore_ascii_case(phrase));
        if !exists {
            s.extra_noise_phrases.push(phrase.to_string());
        }
    })
}

pub fn clear_noise_phrases() -> Result<(), String> {
    update(|s| s.extra_noise_phrases.clear())
}
