// File I/O - documents, export, bundled assets

pub mod assets;
pub mod html;
pub mod store;

pub use store::{DocumentStore, FsStore, StoreError, StoreOp};

/// File extensions offered by the open/save dialogs.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// File extensions offered by the export dialog.
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm"];
