//! `markwrite://` custom protocol.
//!
//! `/` serves the editor page compiled into the binary; `/assets/...` is
//! read from the asset root so the page works without network access.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use markwrite_io::assets;
use wry::http::{header::CONTENT_TYPE, Request, Response, StatusCode};

pub const SCHEME: &str = "markwrite";

const EDITOR_PAGE: &str = include_str!("../assets/editor.html");
const ASSET_PREFIX: &str = "/assets/";

/// URL the web view starts at. Windows web views expose custom schemes as
/// `http://<scheme>.localhost`.
pub fn start_url() -> &'static str {
    if cfg!(windows) {
        "http://markwrite.localhost/"
    } else {
        "markwrite://localhost/"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub status: StatusCode,
    pub mime: &'static str,
    pub body: Cow<'static, [u8]>,
}

impl Served {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            mime: "text/plain; charset=utf-8",
            body: Cow::Borrowed(&b"not found"[..]),
        }
    }
}

/// Resolve a request path to a response body.
pub fn serve(asset_root: Option<&Path>, request_path: &str) -> Served {
    if request_path == "/" || request_path == "/index.html" {
        return Served {
            status: StatusCode::OK,
            mime: assets::mime_for("index.html"),
            body: Cow::Borrowed(EDITOR_PAGE.as_bytes()),
        };
    }

    let Some(relative) = request_path.strip_prefix(ASSET_PREFIX) else {
        log::debug!("protocol: no route for {}", request_path);
        return Served::not_found();
    };
    let Some(root) = asset_root else {
        log::warn!("protocol: {} requested but no asset directory was found", request_path);
        return Served::not_found();
    };
    let Some(file) = assets::resolve_asset(root, relative) else {
        log::warn!("protocol: rejected asset path {}", request_path);
        return Served::not_found();
    };

    match fs::read(&file) {
        Ok(bytes) => Served {
            status: StatusCode::OK,
            mime: assets::mime_for(relative),
            body: Cow::Owned(bytes),
        },
        Err(e) => {
            log::warn!("protocol: could not read {}: {}", file.display(), e);
            Served::not_found()
        }
    }
}

/// Custom protocol handler body.
pub fn respond(asset_root: Option<&Path>, request: &Request<Vec<u8>>) -> Response<Cow<'static, [u8]>> {
    let served = serve(asset_root, request.uri().path());
    Response::builder()
        .status(served.status)
        .header(CONTENT_TYPE, served.mime)
        .body(served.body)
        .unwrap_or_else(|e| {
            log::error!("protocol: could not build response: {}", e);
            let mut response = Response::new(Cow::Borrowed(&b""[..]));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_root_serves_editor_page() {
        let served = serve(None, "/");
        assert_eq!(served.status, StatusCode::OK);
        assert!(served.mime.starts_with("text/html"));
        let page = String::from_utf8_lossy(&served.body);
        assert!(page.contains(markwrite_core::bridge::EDITOR_OBJECT));
    }

    #[test]
    fn test_page_toolbar_posts_known_actions() {
        use crate::actions::Action;
        for action in [
            Action::OpenFile,
            Action::Save,
            Action::SaveAs,
            Action::ZoomIn,
            Action::ZoomOut,
            Action::ZoomReset,
        ] {
            let button = format!("hostButton('{}'", action.id());
            assert!(EDITOR_PAGE.contains(&button), "toolbar lacks {button}");
        }
        assert!(EDITOR_PAGE.contains("type: 'command'"));
    }

    #[test]
    fn test_assets_read_from_root() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/mermaid.min.js"), "var mermaid;").unwrap();

        let served = serve(Some(dir.path()), "/assets/js/mermaid.min.js");
        assert_eq!(served.status, StatusCode::OK);
        assert!(served.mime.starts_with("text/javascript"));
        assert_eq!(&served.body[..], b"var mermaid;");
    }

    #[test]
    fn test_missing_and_escaping_paths_are_not_found() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("assets");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), "x").unwrap();

        assert_eq!(serve(Some(&root), "/assets/js/none.js").status, StatusCode::NOT_FOUND);
        assert_eq!(serve(Some(&root), "/assets/../secret.txt").status, StatusCode::NOT_FOUND);
        assert_eq!(serve(Some(&root), "/other").status, StatusCode::NOT_FOUND);
        assert_eq!(serve(None, "/assets/js/mermaid.min.js").status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_respond_sets_content_type() {
        let request = Request::builder()
            .uri("markwrite://localhost/")
            .body(Vec::new())
            .unwrap();
        let response = respond(None, &request);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    }
}
