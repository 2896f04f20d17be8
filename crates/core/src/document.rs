use std::path::{Path, PathBuf};

use crate::APP_NAME;

/// Display name for a document that has never been saved.
pub const UNTITLED: &str = "Untitled";

/// Host-side state of the document shown in one window.
///
/// `revision` increases on every load and every edit. An asynchronous save
/// remembers the revision it started from, so a save that completes after
/// further edits does not mark the session clean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSession {
    path: Option<PathBuf>,
    dirty: bool,
    revision: u64,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// A file was read and handed to the editor.
    pub fn loaded(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        self.revision += 1;
    }

    /// New, empty, unsaved document.
    pub fn reset(&mut self) {
        self.path = None;
        self.dirty = false;
        self.revision += 1;
    }

    /// Save As target chosen; takes effect before the write completes.
    pub fn set_path(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
    }

    /// The editor reported a change. Returns true if the session just became dirty.
    pub fn mark_edited(&mut self) -> bool {
        self.revision += 1;
        let became_dirty = !self.dirty;
        self.dirty = true;
        became_dirty
    }

    /// A save of `revision` reached disk. Clears the dirty flag only when
    /// nothing changed since that save was requested.
    pub fn mark_saved(&mut self, revision: u64) -> bool {
        if revision == self.revision {
            self.dirty = false;
            true
        } else {
            false
        }
    }

    /// Full filename with extension, or "Untitled".
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Window title: `notes.md • — MarkWrite` (bullet only while dirty)
    pub fn title(&self) -> String {
        let mut title = self.display_name();
        if self.dirty {
            title.push_str(" \u{2022}"); // •
        }
        title.push_str(" \u{2014} "); // —
        title.push_str(APP_NAME);
        title
    }

    /// Initial location for the Save As dialog.
    pub fn suggested_save_path(&self, default_dir: &Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| default_dir.join(format!("{UNTITLED}.md")))
    }

    /// Initial location for the export dialog: same stem, `.html`.
    pub fn suggested_export_path(&self, default_dir: &Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| default_dir.join(UNTITLED))
            .with_extension("html")
    }

    /// Directory the Open dialog starts in.
    pub fn open_dir(&self, default_dir: &Path) -> PathBuf {
        self.path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_dir.to_path_buf())
    }
}
