//! Bundled editor assets.
//!
//! The editor page loads its scripts and styles from a local asset root so
//! the application works offline. The root is looked up in a fixed order:
//! explicit override, next to the executable, inside a macOS bundle's
//! `Resources`, then the working directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Files the editor page cannot run without, relative to the asset root.
pub const REQUIRED_ASSETS: &[&str] = &[
    "css/toastui-editor.min.css",
    "js/toastui-editor-all.min.js",
    "js/mermaid.min.js",
];

/// Name of the asset directory next to the executable.
pub const ASSET_DIR_NAME: &str = "assets";

/// Candidate asset roots, most specific first.
pub fn candidate_roots(override_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(dir) = override_dir {
        roots.push(dir.to_path_buf());
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir.join(ASSET_DIR_NAME));
        // Foo.app/Contents/MacOS/foo -> Foo.app/Contents/Resources/assets
        roots.push(exe_dir.join("..").join("Resources").join(ASSET_DIR_NAME));
    }
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.join(ASSET_DIR_NAME));
    }
    roots
}

/// First candidate root that exists as a directory.
pub fn resolve_root(override_dir: Option<&Path>) -> Option<PathBuf> {
    candidate_roots(override_dir).into_iter().find(|p| p.is_dir())
}

/// Map a request path (e.g. `js/mermaid.min.js`) to a file under `root`.
///
/// Returns `None` for anything that would escape the root.
pub fn resolve_asset(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if resolved == root {
        return None;
    }
    Some(resolved)
}

/// Content type for a served asset, by extension.
pub fn mime_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => "application/octet-stream",
    }
}

/// One required asset and its size on disk, if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetStatus {
    pub relative: &'static str,
    pub size: Option<u64>,
}

/// Result of checking an asset root for offline completeness.
#[derive(Debug, Clone)]
pub struct AssetReport {
    pub root: PathBuf,
    pub entries: Vec<AssetStatus>,
}

impl AssetReport {
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.size.is_some())
    }

    pub fn missing(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().filter(|e| e.size.is_none()).map(|e| e.relative)
    }

    /// Human-readable report, one line per asset.
    pub fn render(&self) -> String {
        let mut out = format!("Asset root: {}\n", self.root.display());
        for entry in &self.entries {
            match entry.size {
                Some(size) => out.push_str(&format!("  ok       {} ({} bytes)\n", entry.relative, size)),
                None => out.push_str(&format!("  MISSING  {}\n", entry.relative)),
            }
        }
        let missing = self.missing().count();
        if missing == 0 {
            out.push_str(&format!("All {} assets found; the editor works offline.\n", self.entries.len()));
        } else {
            out.push_str(&format!("{} of {} assets missing.\n", missing, self.entries.len()));
        }
        out
    }
}

/// Check that every required asset exists under `root`.
pub fn check_assets(root: &Path) -> AssetReport {
    let entries = REQUIRED_ASSETS
        .iter()
        .map(|relative| {
            let size = fs::metadata(root.join(relative))
                .ok()
                .filter(|m| m.is_file())
                .map(|m| m.len());
            AssetStatus { relative, size }
        })
        .collect();
    AssetReport { root: root.to_path_buf(), entries }
}
