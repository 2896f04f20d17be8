// Configuration loading

pub mod recent;
pub mod settings;

pub use recent::RecentFiles;
pub use settings::Settings;

use std::path::PathBuf;

/// Directory holding all MarkWrite configuration files.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("markwrite")
}
