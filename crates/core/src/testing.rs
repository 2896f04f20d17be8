//! In-memory stand-ins for the editor page and the native window.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::bridge::{
    EditorSurface, ScriptCallback, SurfaceError, GET_HTML_SCRIPT, GET_MARKDOWN_SCRIPT,
    SET_MARKDOWN_PREFIX,
};
use crate::controller::{DiscardChoice, WindowShell};

#[derive(Default)]
struct FakePage {
    markdown: String,
    zoom: f64,
    scripts: Vec<String>,
    queued: Vec<(ScriptCallback, String)>,
    held: Vec<ScriptCallback>,
    wedged: bool,
    fail_evaluate: Option<String>,
}

/// Editor page that runs the three bridge scripts against a string.
///
/// Scripts take effect at evaluation time, in order; their replies are
/// queued until [`FakeSurface::deliver_replies`], like a real page answering
/// on a later turn of the event loop.
#[derive(Clone, Default)]
pub(crate) struct FakeSurface(Rc<RefCell<FakePage>>);

impl FakeSurface {
    pub fn new() -> Self {
        let surface = Self::default();
        surface.0.borrow_mut().zoom = 1.0;
        surface
    }

    pub fn markdown(&self) -> String {
        self.0.borrow().markdown.clone()
    }

    pub fn html(&self) -> String {
        render(&self.0.borrow().markdown)
    }

    pub fn zoom(&self) -> f64 {
        self.0.borrow().zoom
    }

    pub fn scripts(&self) -> Vec<String> {
        self.0.borrow().scripts.clone()
    }

    /// A user edit inside the page.
    pub fn type_text(&self, text: &str) {
        self.0.borrow_mut().markdown.push_str(text);
    }

    /// Stop answering. Callbacks are kept alive, so calls hang until they
    /// time out.
    pub fn wedge(&self) {
        self.0.borrow_mut().wedged = true;
    }

    /// Callbacks swallowed while wedged.
    pub fn held_count(&self) -> usize {
        self.0.borrow().held.len()
    }

    pub fn fail_evaluate(&self, reason: &str) {
        self.0.borrow_mut().fail_evaluate = Some(reason.to_string());
    }

    /// Run every queued reply callback. Returns how many ran.
    pub fn deliver_replies(&self) -> usize {
        let queued = std::mem::take(&mut self.0.borrow_mut().queued);
        let count = queued.len();
        for (callback, reply) in queued {
            callback(reply);
        }
        count
    }
}

fn render(markdown: &str) -> String {
    format!("<p>{}</p>", markdown.replace('&', "&amp;").replace('<', "&lt;"))
}

fn json_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

impl EditorSurface for FakeSurface {
    fn evaluate(&self, script: &str, on_reply: Option<ScriptCallback>) -> Result<(), SurfaceError> {
        let mut page = self.0.borrow_mut();
        if let Some(reason) = &page.fail_evaluate {
            return Err(SurfaceError(reason.clone()));
        }
        page.scripts.push(script.to_string());

        let reply = if script == GET_MARKDOWN_SCRIPT {
            json_string(&page.markdown)
        } else if script == GET_HTML_SCRIPT {
            json_string(&render(&page.markdown))
        } else if let Some(text) = script
            .strip_prefix(SET_MARKDOWN_PREFIX)
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(decode_script_literal)
        {
            page.markdown = text;
            "true".to_string()
        } else {
            "null".to_string()
        };

        if let Some(callback) = on_reply {
            if page.wedged {
                page.held.push(callback);
            } else {
                page.queued.push((callback, reply));
            }
        }
        Ok(())
    }

    fn set_zoom(&self, factor: f64) -> Result<(), SurfaceError> {
        self.0.borrow_mut().zoom = factor;
        Ok(())
    }
}

/// Decode a single-quoted script string literal as a script engine would.
pub(crate) fn decode_script_literal(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                'u' => {
                    let hex: String = chars.by_ref().take(4).collect();
                    let code = u32::from_str_radix(&hex, 16).ok()?;
                    out.push(char::from_u32(code)?);
                }
                other => out.push(other),
            },
            // An unescaped quote or line break would end the literal early
            '\'' | '\n' | '\r' | '\u{2028}' | '\u{2029}' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

/// Scripted answers for every dialog, plus a record of what was shown.
#[derive(Debug, Default)]
pub(crate) struct FakeShell {
    pub open_answers: VecDeque<Option<PathBuf>>,
    pub save_answers: VecDeque<Option<PathBuf>>,
    pub export_answers: VecDeque<Option<PathBuf>>,
    /// Empty means Cancel.
    pub discard_answers: VecDeque<DiscardChoice>,

    pub open_dirs: Vec<PathBuf>,
    pub save_suggestions: Vec<PathBuf>,
    pub export_suggestions: Vec<PathBuf>,
    pub prompts: usize,
    pub errors: Vec<(String, String)>,
    pub infos: Vec<(String, String)>,
    pub titles: Vec<String>,
    pub touched: Vec<PathBuf>,
    pub zooms: Vec<f64>,
    pub closed: bool,
}

impl WindowShell for FakeShell {
    fn pick_open_path(&mut self, start_dir: &Path) -> Option<PathBuf> {
        self.open_dirs.push(start_dir.to_path_buf());
        self.open_answers.pop_front().flatten()
    }

    fn pick_save_path(&mut self, suggested: &Path) -> Option<PathBuf> {
        self.save_suggestions.push(suggested.to_path_buf());
        self.save_answers.pop_front().flatten()
    }

    fn pick_export_path(&mut self, suggested: &Path) -> Option<PathBuf> {
        self.export_suggestions.push(suggested.to_path_buf());
        self.export_answers.pop_front().flatten()
    }

    fn confirm_discard(&mut self) -> DiscardChoice {
        self.prompts += 1;
        self.discard_answers.pop_front().unwrap_or(DiscardChoice::Cancel)
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_string(), message.to_string()));
    }

    fn show_info(&mut self, title: &str, message: &str) {
        self.infos.push((title.to_string(), message.to_string()));
    }

    fn set_title(&mut self, title: &str) {
        self.titles.push(title.to_string());
    }

    fn close_window(&mut self) {
        self.closed = true;
    }

    fn document_touched(&mut self, path: &Path) {
        self.touched.push(path.to_path_buf());
    }

    fn zoom_changed(&mut self, factor: f64) {
        self.zooms.push(factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::script_string_literal;

    #[test]
    fn test_decoder_inverts_escaping() {
        for text in ["", "plain", "a'b", "back\\slash", "l1\nl2\r\n", "\u{2028}\u{2029}", "\\'"] {
            assert_eq!(decode_script_literal(&script_string_literal(text)).as_deref(), Some(text));
        }
    }

    #[test]
    fn test_decoder_rejects_broken_literals() {
        assert_eq!(decode_script_literal("'a'b'"), None);
        assert_eq!(decode_script_literal("'a\nb'"), None);
        assert_eq!(decode_script_literal("'unterminated"), None);
    }
}
