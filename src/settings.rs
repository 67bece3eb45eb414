//! User settings stored as settings.json in the app data directory

use crate::constants::{API_BASE_ENV, DEFAULT_API_BASE};
use crate::types::Section;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Backend
    pub api_base_url: Option<String>,

    // Navigation
    pub last_section: Section,
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    /// API root: environment first, then the saved value, then the built-in default
    pub fn resolve_api_base(&self) -> String {
        resolve_api_base(std::env::var(API_BASE_ENV).ok(), self.api_base_url.as_deref())
    }
}

fn resolve_api_base(env: Option<String>, saved: Option<&str>) -> String {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| saved.filter(|v| !v.trim().is_empty()).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            window_x: Some(10.0),
            window_y: Some(20.0),
            window_w: Some(1280.0),
            window_h: Some(800.0),
            api_base_url: Some("http://bank.local/api".into()),
            last_section: Section::Inventory,
        };
        settings.save(dir.path());
        assert_eq!(Settings::load(dir.path()), settings);
    }

    #[test]
    fn test_missing_or_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());

        std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{"last_section":"Requests"}"#).unwrap();
        let loaded = Settings::load(dir.path());
        assert_eq!(loaded.last_section, Section::Requests);
        assert_eq!(loaded.api_base_url, None);
    }

    #[test]
    fn test_api_base_resolution_order() {
        assert_eq!(
            resolve_api_base(Some("http://env/api".into()), Some("http://saved/api")),
            "http://env/api"
        );
        assert_eq!(resolve_api_base(None, Some("http://saved/api")), "http://saved/api");
        assert_eq!(resolve_api_base(Some("  ".into()), None), DEFAULT_API_BASE);
    }
}
