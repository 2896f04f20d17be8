// Application settings
// Loaded from ~/.config/markwrite/settings.json

use markwrite_core::zoom::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Editor
    #[serde(rename = "editor.zoom")]
    pub zoom: f64,

    #[serde(rename = "editor.loadTimeoutSecs")]
    pub load_timeout_secs: u64,

    #[serde(rename = "bridge.timeoutSecs")]
    pub bridge_timeout_secs: u64,

    // Window
    #[serde(rename = "window.width")]
    pub window_width: u32,

    #[serde(rename = "window.height")]
    pub window_height: u32,

    // File
    #[serde(rename = "file.recentFilesLimit")]
    pub recent_files_limit: usize,

    #[serde(rename = "export.standalone")]
    pub export_standalone: bool,

    // Assets
    #[serde(rename = "assets.dir")]
    pub assets_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Editor
            zoom: DEFAULT_ZOOM,
            load_timeout_secs: 10,
            bridge_timeout_secs: 10,
            // Window
            window_width: 1100,
            window_height: 800,
            // File
            recent_files_limit: 10,
            export_standalone: true,
            // Assets
            assets_dir: None,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from a specific file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings.sanitized(),
                Err(e) => {
                    log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with `//`
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Clamp values a hand-edited file may have pushed out of range
    pub fn sanitized(mut self) -> Self {
        if !self.zoom.is_finite() {
            self.zoom = DEFAULT_ZOOM;
        }
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.load_timeout_secs = self.load_timeout_secs.max(1);
        self.bridge_timeout_secs = self.bridge_timeout_secs.max(1);
        self.window_width = self.window_width.max(320);
        self.window_height = self.window_height.max(240);
        self
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Editor (zoom is remembered between sessions, 0.5 - 3.0)
    "editor.zoom": 1.0,
    // Seconds to wait for the editor page before reporting a load failure
    "editor.loadTimeoutSecs": 10,
    // Seconds to wait for the editor to answer a save or export request
    "bridge.timeoutSecs": 10,

    // Window
    "window.width": 1100,
    "window.height": 800,

    // File handling
    "file.recentFilesLimit": 10,
    // Wrap exported HTML in a complete document (head, charset, styles)
    "export.standalone": true,

    // Directory holding the editor's css/ and js/ assets (null = auto-detect)
    "assets.dir": null
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_ignores_comment_lines_and_fills_defaults() {
        let settings = Settings::parse(
            r#"{
            // comment
            "editor.zoom": 1.5,
            "file.recentFilesLimit": 3
        }"#,
        )
        .unwrap();
        assert_eq!(settings.zoom, 1.5);
        assert_eq!(settings.recent_files_limit, 3);
        assert_eq!(settings.bridge_timeout_secs, 10);
        assert!(settings.export_standalone);
        assert_eq!(settings.assets_dir, None);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let settings = Settings::parse(r#"{ "editor.zoom": 9.0, "bridge.timeoutSecs": 0 }"#)
            .unwrap()
            .sanitized();
        assert_eq!(settings.zoom, MAX_ZOOM);
        assert_eq!(settings.bridge_timeout_secs, 1);
    }

    #[test]
    fn test_sanitized_zoom_matches_view_bounds() {
        let low = Settings::parse(r#"{ "editor.zoom": 0.1 }"#).unwrap().sanitized();
        assert_eq!(low.zoom, markwrite_core::zoom::Zoom::new(0.1).factor());
        let nan = Settings { zoom: f64::NAN, ..Settings::default() }.sanitized();
        assert_eq!(nan.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = Settings::default();
        settings.zoom = 1.2;
        settings.assets_dir = Some(PathBuf::from("/opt/markwrite/assets"));

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_unparseable_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_default_file_parses_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        Settings::default().create_default_file(&path);

        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
