//! Document store: plain UTF-8 text files.
//!
//! Markdown documents and HTML exports are read and written whole. There is
//! no sidecar metadata; the file on disk is exactly what the editor produced.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Which half of the store failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Write,
}

/// An I/O failure at a specific path.
#[derive(Debug)]
pub struct StoreError {
    pub op: StoreOp,
    pub path: PathBuf,
    pub source: io::Error,
}

impl StoreError {
    fn new(op: StoreOp, path: &Path, source: io::Error) -> Self {
        Self { op, path: path.to_path_buf(), source }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.op {
            StoreOp::Read => "open",
            StoreOp::Write => "save",
        };
        write!(f, "Could not {verb} {}:\n{}", self.path.display(), self.source)
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Text persistence used by the window controller.
pub trait DocumentStore {
    fn read_text(&self, path: &Path) -> Result<String, StoreError>;
    fn write_text(&self, path: &Path, text: &str) -> Result<(), StoreError>;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl DocumentStore for FsStore {
    fn read_text(&self, path: &Path) -> Result<String, StoreError> {
        let bytes = fs::read(path).map_err(|e| StoreError::new(StoreOp::Read, path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            StoreError::new(
                StoreOp::Read,
                path,
                io::Error::new(io::ErrorKind::InvalidData, format!("file is not valid UTF-8 ({e})")),
            )
        })?;
        log::debug!("read {} bytes from {}", text.len(), path.display());
        Ok(text)
    }

    /// Atomic: the text goes to a sibling temp file that is then renamed
    /// over `path`, so a failed write leaves the previous file intact.
    fn write_text(&self, path: &Path, text: &str) -> Result<(), StoreError> {
        let tmp = temp_path(path);
        if let Err(e) = fs::write(&tmp, text.as_bytes()) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::new(StoreOp::Write, path, e));
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::new(StoreOp::Write, path, e));
        }
        log::debug!("wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}

/// `notes.md` -> `notes.md.tmp` in the same directory.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
