//! Integration tests: a document saved through the store, exported, and an
//! asset directory laid out the way the packaged app ships it.

use std::fs;

use markwrite_io::assets::{check_assets, resolve_asset, resolve_root, REQUIRED_ASSETS};
use markwrite_io::html::standalone_document;
use markwrite_io::{DocumentStore, FsStore, StoreOp};

#[test]
fn test_store_keeps_markdown_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    let text = "# Café\r\n\nIt's a `\\` test\u{2028}with odd separators.\n";

    FsStore.write_text(&path, text).unwrap();
    assert_eq!(fs::read(&path).unwrap(), text.as_bytes());
    assert_eq!(FsStore.read_text(&path).unwrap(), text);
}

#[test]
fn test_store_errors_name_the_path() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("gone.md");
    let err = FsStore.read_text(&missing).unwrap_err();
    assert_eq!(err.op, StoreOp::Read);
    assert!(err.to_string().contains("gone.md"), "{err}");

    let unwritable = dir.path().join("no-such-dir").join("out.md");
    let err = FsStore.write_text(&unwritable, "x").unwrap_err();
    assert_eq!(err.op, StoreOp::Write);
    assert!(err.to_string().starts_with("Could not save"), "{err}");
}

#[test]
fn test_exported_file_is_a_complete_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.html");
    let fragment = "<h1>Notes</h1>\n<p>a &amp; b</p>";

    FsStore.write_text(&path, &standalone_document("Notes <draft>", fragment)).unwrap();

    let written = FsStore.read_text(&path).unwrap();
    assert!(written.starts_with("<!DOCTYPE html>"));
    assert!(written.contains("<meta charset=\"utf-8\" />"));
    assert!(written.contains("<title>Notes &lt;draft&gt;</title>"));
    assert!(written.contains(fragment));
    assert!(written.trim_end().ends_with("</html>"));
}

#[test]
fn test_packaged_asset_dir_is_complete_and_served_safely() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("assets");
    for relative in REQUIRED_ASSETS {
        let file = root.join(relative);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"/* bundled */").unwrap();
    }

    assert_eq!(resolve_root(Some(root.as_path())), Some(root.clone()));
    let report = check_assets(&root);
    assert!(report.is_complete(), "{}", report.render());

    let served = resolve_asset(&root, "/js/mermaid.min.js").unwrap();
    assert!(served.is_file());
    assert_eq!(resolve_asset(&root, "/../secrets.txt"), None);
}

#[test]
fn test_partial_asset_dir_reports_what_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("css")).unwrap();
    fs::write(root.join("css/toastui-editor.min.css"), b"body{}").unwrap();

    let report = check_assets(root);
    assert!(!report.is_complete());
    let missing: Vec<_> = report.missing().collect();
    assert_eq!(missing, vec!["js/toastui-editor-all.min.js", "js/mermaid.min.js"]);
    assert!(report.render().contains("2 of 3 assets missing"));
}
