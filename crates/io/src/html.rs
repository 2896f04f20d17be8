//! HTML export.
//!
//! The editor hands back a rendered fragment (no `<html>` or `<head>`).
//! Exports wrap it into a document that opens correctly on its own.

/// Wrap a rendered fragment into a complete UTF-8 HTML document.
///
/// Input that is already a full document is returned unchanged.
pub fn standalone_document(title: &str, body: &str) -> String {
    if is_full_document(body) {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len() + 512);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    out.push_str("<title>");
    out.push_str(&escape_text(title));
    out.push_str("</title>\n");
    out.push_str(EXPORT_STYLE);
    out.push_str("</head>\n<body>\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("</body>\n</html>\n");
    out
}

const EXPORT_STYLE: &str = "<style>\n\
  body { max-width: 48rem; margin: 2rem auto; padding: 0 1rem; font-family: -apple-system, \
'Segoe UI', Helvetica, Arial, sans-serif; line-height: 1.6; }\n\
  pre, code { font-family: ui-monospace, Menlo, Consolas, monospace; }\n\
  pre { padding: 0.75rem; overflow-x: auto; background: #f6f8fa; }\n\
  table { border-collapse: collapse; }\n\
  th, td { border: 1px solid #d0d7de; padding: 0.25rem 0.5rem; }\n\
</style>\n";

fn is_full_document(html: &str) -> bool {
    let head: String = html.trim_start().chars().take(15).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Escape text for use inside an element body.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
