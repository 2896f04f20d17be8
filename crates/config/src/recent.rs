use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Recently opened or saved documents, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentFiles {
    pub version: u32,
    pub files: Vec<PathBuf>,
}

impl RecentFiles {
    pub fn path() -> PathBuf {
        crate::config_dir().join("recent.json")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Add a file to the front of the list.
    /// Moves it to the front if already present and keeps at most `limit` entries.
    pub fn push(&mut self, path: &Path, limit: usize) {
        self.files.retain(|p| p != path);
        self.files.insert(0, path.to_path_buf());
        self.files.truncate(limit);
    }

    /// Drop entries whose files no longer exist.
    pub fn prune_missing(&mut self) {
        self.files.retain(|p| p.exists());
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_push_moves_existing_to_front_and_caps() {
        let mut recent = RecentFiles::default();
        recent.push(Path::new("/a.md"), 3);
        recent.push(Path::new("/b.md"), 3);
        recent.push(Path::new("/c.md"), 3);
        recent.push(Path::new("/a.md"), 3);
        assert_eq!(
            recent.files,
            vec![PathBuf::from("/a.md"), PathBuf::from("/c.md"), PathBuf::from("/b.md")]
        );

        recent.push(Path::new("/d.md"), 3);
        assert_eq!(recent.files.len(), 3);
        assert_eq!(recent.files[0], PathBuf::from("/d.md"));
        assert!(!recent.files.contains(&PathBuf::from("/b.md")));
    }

    #[test]
    fn test_round_trip_and_prune() {
        let dir = tempdir().unwrap();
        let kept = dir.path().join("kept.md");
        fs::write(&kept, "x").unwrap();
        let gone = dir.path().join("gone.md");

        let mut recent = RecentFiles::default();
        recent.push(&gone, 10);
        recent.push(&kept, 10);
        let path = dir.path().join("recent.json");
        recent.save_to(&path).unwrap();

        let mut loaded = RecentFiles::load_from(&path);
        assert_eq!(loaded, recent);
        loaded.prune_missing();
        assert_eq!(loaded.files, vec![kept]);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        assert!(RecentFiles::load_from(&dir.path().join("nope.json")).is_empty());
    }
}
