//! Window controller: file operations, dirty tracking and the discard gate.
//!
//! The controller owns the document session and the editor bridge for one
//! window. Everything it cannot do itself (dialogs, the window title,
//! closing the window) goes through [`WindowShell`]; file access goes
//! through [`DocumentStore`].
//!
//! Saves and exports are asynchronous: the document has to be fetched from
//! the page first. Each in-flight fetch is a [`PendingReply`] that the event
//! loop drives with [`WindowController::pump`]. Public operations pump once
//! before returning, so replies that are already available are handled
//! without waiting for the next loop iteration.

use std::path::{Path, PathBuf};
use std::time::Instant;

use markwrite_io::{html, DocumentStore};

use crate::bridge::{BridgeCall, BridgeError, BridgeOptions, EditorBridge, EditorSurface, LoadState};
use crate::document::DocumentSession;
use crate::zoom::{Zoom, DEFAULT_ZOOM};
use crate::{version_full, APP_NAME};

/// Answer to "You have unsaved changes. Save before continuing?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardChoice {
    Save,
    Discard,
    Cancel,
}

/// Native window services the controller depends on.
pub trait WindowShell {
    /// Open dialog. `None` when the user cancels.
    fn pick_open_path(&mut self, start_dir: &Path) -> Option<PathBuf>;
    fn pick_save_path(&mut self, suggested: &Path) -> Option<PathBuf>;
    fn pick_export_path(&mut self, suggested: &Path) -> Option<PathBuf>;

    fn confirm_discard(&mut self) -> DiscardChoice;

    fn show_error(&mut self, title: &str, message: &str);
    fn show_info(&mut self, title: &str, message: &str);

    fn set_title(&mut self, title: &str);
    fn close_window(&mut self);

    /// A document was opened from or saved to `path`.
    fn document_touched(&mut self, _path: &Path) {}

    fn zoom_changed(&mut self, _factor: f64) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    /// Where dialogs start when there is no current file.
    pub default_dir: PathBuf,
    pub bridge: BridgeOptions,
    pub zoom: f64,
    /// Wrap exported HTML in a complete document.
    pub export_standalone: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("."),
            bridge: BridgeOptions::default(),
            zoom: DEFAULT_ZOOM,
            export_standalone: true,
        }
    }
}

/// An operation that destroys the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Gated {
    New,
    Open,
    OpenPath(PathBuf),
    Close,
}

/// A bridge call the controller is waiting on.
enum PendingReply {
    /// Markdown fetched for a save. `revision` is the session revision when
    /// the save was requested; `then` resumes a gated operation afterwards.
    Save {
        call: BridgeCall<String>,
        path: PathBuf,
        revision: u64,
        then: Option<Gated>,
    },
    Export {
        call: BridgeCall<String>,
        path: PathBuf,
    },
    /// Acknowledgement of a document handed to the editor.
    Applied {
        call: BridgeCall<()>,
        what: &'static str,
    },
}

impl PendingReply {
    fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Save { call, .. } | Self::Export { call, .. } => call.deadline(),
            Self::Applied { call, .. } => call.deadline(),
        }
    }
}

enum Outcome {
    Text(Result<String, BridgeError>),
    Ack(Result<(), BridgeError>),
}

pub struct WindowController<S, W, D> {
    bridge: EditorBridge<S>,
    shell: W,
    store: D,
    session: DocumentSession,
    zoom: Zoom,
    options: ControllerOptions,
    pending: Vec<PendingReply>,
    closed: bool,
}

impl<S, W, D> WindowController<S, W, D>
where
    S: EditorSurface,
    W: WindowShell,
    D: DocumentStore,
{
    pub fn new(surface: S, shell: W, store: D, options: ControllerOptions, now: Instant) -> Self {
        let bridge = EditorBridge::new(surface, options.bridge, now);
        let zoom = Zoom::new(options.zoom);
        let mut controller = Self {
            bridge,
            shell,
            store,
            session: DocumentSession::new(),
            zoom,
            options,
            pending: Vec::new(),
            closed: false,
        };
        if controller.zoom.factor() != DEFAULT_ZOOM {
            controller.apply_zoom(controller.zoom.factor());
        }
        controller.update_title();
        controller
    }

    pub fn session(&self) -> &DocumentSession {
        &self.session
    }

    pub fn bridge(&self) -> &EditorBridge<S> {
        &self.bridge
    }

    pub fn shell(&self) -> &W {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut W {
        &mut self.shell
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of bridge replies still outstanding.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // ========================================================================
    // Page events
    // ========================================================================

    pub fn page_ready(&mut self, now: Instant) {
        self.bridge.page_ready();
        self.pump(now);
    }

    pub fn page_failed(&mut self, reason: &str, now: Instant) {
        if self.bridge.page_failed(reason) {
            self.report_load_failure(reason);
        }
        self.pump(now);
    }

    /// The page reported a user edit.
    pub fn content_changed(&mut self) {
        if self.closed {
            return;
        }
        if self.session.mark_edited() {
            self.update_title();
        }
    }

    // ========================================================================
    // File operations
    // ========================================================================

    pub fn new_document(&mut self, now: Instant) {
        self.gate(Gated::New, now);
        self.pump(now);
    }

    /// Open via the file dialog.
    pub fn open(&mut self, now: Instant) {
        self.gate(Gated::Open, now);
        self.pump(now);
    }

    /// Open a known path (command line, recent files).
    pub fn open_path(&mut self, path: &Path, now: Instant) {
        self.gate(Gated::OpenPath(path.to_path_buf()), now);
        self.pump(now);
    }

    /// File handed over by the OS ("Open With", Finder double-click).
    /// Problems are logged, never surfaced.
    pub fn handle_open_request(&mut self, path: &Path, now: Instant) {
        if self.closed {
            log::warn!("open request for {} after window closed; ignoring", path.display());
            return;
        }
        if !path.is_file() {
            log::warn!("open request for missing file {}; ignoring", path.display());
            return;
        }
        log::info!("open request from OS: {}", path.display());
        self.open_path(path, now);
    }

    pub fn save(&mut self, now: Instant) {
        match self.session.path().map(Path::to_path_buf) {
            Some(path) => self.start_save(path, None, now),
            None => self.save_as(now),
        }
        self.pump(now);
    }

    pub fn save_as(&mut self, now: Instant) {
        if self.closed {
            return;
        }
        let suggested = self.session.suggested_save_path(&self.options.default_dir);
        let Some(path) = self.shell.pick_save_path(&suggested) else {
            return;
        };
        self.session.set_path(&path);
        self.update_title();
        self.start_save(path, None, now);
        self.pump(now);
    }

    pub fn export_html(&mut self, now: Instant) {
        if self.closed {
            return;
        }
        let suggested = self.session.suggested_export_path(&self.options.default_dir);
        let Some(path) = self.shell.pick_export_path(&suggested) else {
            return;
        };
        let call = self.bridge.get_rendered_output(now);
        self.pending.push(PendingReply::Export { call, path });
        self.pump(now);
    }

    /// Window close button or Quit.
    pub fn request_close(&mut self, now: Instant) {
        self.gate(Gated::Close, now);
        self.pump(now);
    }

    // ========================================================================
    // View
    // ========================================================================

    pub fn zoom_in(&mut self) {
        if let Some(factor) = self.zoom.zoom_in() {
            self.apply_zoom(factor);
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(factor) = self.zoom.zoom_out() {
            self.apply_zoom(factor);
        }
    }

    pub fn zoom_reset(&mut self) {
        if let Some(factor) = self.zoom.reset() {
            self.apply_zoom(factor);
        }
    }

    fn apply_zoom(&mut self, factor: f64) {
        log::debug!("zoom {}", self.zoom.display());
        if let Err(e) = self.bridge.set_zoom(factor) {
            log::warn!("could not set zoom to {}: {}", factor, e);
        }
        self.shell.zoom_changed(factor);
    }

    pub fn about(&mut self) {
        let title = format!("About {APP_NAME}");
        self.shell.show_info(&title, &about_text());
    }

    // ========================================================================
    // Reply handling
    // ========================================================================

    /// Earliest instant at which [`pump`](Self::pump) has work to do without
    /// any new event arriving.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .iter()
            .filter_map(PendingReply::deadline)
            .chain(self.bridge.load_deadline())
            .min()
    }

    /// Resolve every bridge call that has a reply or has timed out, in the
    /// order they were issued.
    pub fn pump(&mut self, now: Instant) {
        if self.bridge.check_load_deadline(now) {
            if let LoadState::Failed(reason) = self.bridge.state().clone() {
                self.report_load_failure(&reason);
            }
        }

        let mut i = 0;
        while i < self.pending.len() {
            let outcome = match &mut self.pending[i] {
                PendingReply::Save { call, .. } | PendingReply::Export { call, .. } => {
                    call.try_resolve(now).map(Outcome::Text)
                }
                PendingReply::Applied { call, .. } => call.try_resolve(now).map(Outcome::Ack),
            };
            match outcome {
                Some(outcome) => {
                    let reply = self.pending.remove(i);
                    self.finish(reply, outcome, now);
                }
                None => i += 1,
            }
        }
    }

    fn finish(&mut self, reply: PendingReply, outcome: Outcome, now: Instant) {
        match (reply, outcome) {
            (PendingReply::Save { path, revision, then, .. }, Outcome::Text(result)) => {
                self.finish_save(&path, revision, then, result, now)
            }
            (PendingReply::Export { path, .. }, Outcome::Text(result)) => {
                self.finish_export(&path, result)
            }
            (PendingReply::Applied { what, .. }, Outcome::Ack(result)) => match result {
                Ok(()) => log::debug!("editor applied: {}", what),
                Err(BridgeError::Superseded | BridgeError::Cancelled | BridgeError::PageFailed(_)) => {
                    log::debug!("editor did not apply {}: dropped", what)
                }
                Err(e) => {
                    log::error!("editor did not apply {}: {}", what, e);
                    self.shell.show_error("Editor error", &format!("Could not {what}:\n{e}"));
                }
            },
            _ => log::error!("bridge reply did not match its request"),
        }
    }

    fn finish_save(
        &mut self,
        path: &Path,
        revision: u64,
        then: Option<Gated>,
        result: Result<String, BridgeError>,
        now: Instant,
    ) {
        let text = match result {
            Ok(text) => text,
            Err(BridgeError::Cancelled) => {
                log::debug!("save to {} cancelled", path.display());
                return;
            }
            Err(e) => {
                log::error!("save to {} failed: {}", path.display(), e);
                self.shell.show_error("Save failed", &format!("Could not save:\n{e}"));
                return;
            }
        };

        if let Err(e) = self.store.write_text(path, &text) {
            log::error!("{}", e);
            self.shell.show_error("Save failed", &e.to_string());
            return;
        }

        log::info!("saved {} ({} bytes)", path.display(), text.len());
        self.shell.document_touched(path);
        let clean = self.session.mark_saved(revision);
        if !clean {
            log::info!("document changed while saving; still dirty");
        }
        self.update_title();

        if let Some(op) = then {
            if clean && !self.session.is_dirty() {
                self.run(op, now);
            } else {
                log::info!("{:?} abandoned: document is still dirty", op);
            }
        }
    }

    fn finish_export(&mut self, path: &Path, result: Result<String, BridgeError>) {
        let rendered = match result {
            Ok(rendered) => rendered,
            Err(BridgeError::Cancelled) => return,
            Err(e) => {
                log::error!("export to {} failed: {}", path.display(), e);
                self.shell.show_error("Export failed", &format!("Could not export:\n{e}"));
                return;
            }
        };

        let output = if self.options.export_standalone {
            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.session.display_name());
            html::standalone_document(&title, &rendered)
        } else {
            rendered
        };

        match self.store.write_text(path, &output) {
            Ok(()) => log::info!("exported {} ({} bytes)", path.display(), output.len()),
            Err(e) => {
                log::error!("{}", e);
                self.shell.show_error("Export failed", &e.to_string());
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn gate(&mut self, op: Gated, now: Instant) {
        if self.closed {
            return;
        }
        if !self.session.is_dirty() {
            self.run(op, now);
            return;
        }
        match self.shell.confirm_discard() {
            DiscardChoice::Cancel => log::debug!("{:?} cancelled at discard prompt", op),
            DiscardChoice::Discard => self.run(op, now),
            DiscardChoice::Save => {
                let path = match self.session.path() {
                    Some(path) => path.to_path_buf(),
                    None => {
                        let suggested = self.session.suggested_save_path(&self.options.default_dir);
                        match self.shell.pick_save_path(&suggested) {
                            Some(path) => {
                                self.session.set_path(&path);
                                self.update_title();
                                path
                            }
                            None => return,
                        }
                    }
                };
                self.start_save(path, Some(op), now);
            }
        }
    }

    fn run(&mut self, op: Gated, now: Instant) {
        match op {
            Gated::New => {
                let call = self.bridge.set_document("", now);
                self.session.reset();
                self.update_title();
                self.pending.push(PendingReply::Applied { call, what: "clear the editor" });
            }
            Gated::Open => {
                let start = self.session.open_dir(&self.options.default_dir);
                if let Some(path) = self.shell.pick_open_path(&start) {
                    self.open_file(&path, now);
                }
            }
            Gated::OpenPath(path) => self.open_file(&path, now),
            Gated::Close => {
                log::info!("closing window");
                self.bridge.shutdown();
                self.closed = true;
                self.shell.close_window();
            }
        }
    }

    fn open_file(&mut self, path: &Path, now: Instant) {
        let text = match self.store.read_text(path) {
            Ok(text) => text,
            Err(e) => {
                log::error!("{}", e);
                self.shell.show_error("Open failed", &e.to_string());
                return;
            }
        };
        log::info!("opened {} ({} bytes)", path.display(), text.len());
        let call = self.bridge.set_document(&text, now);
        self.session.loaded(path);
        self.update_title();
        self.shell.document_touched(path);
        self.pending.push(PendingReply::Applied { call, what: "show the opened file" });
    }

    fn start_save(&mut self, path: PathBuf, then: Option<Gated>, now: Instant) {
        if self.closed {
            return;
        }
        let call = self.bridge.get_document(now);
        let revision = self.session.revision();
        self.pending.push(PendingReply::Save { call, path, revision, then });
    }

    fn report_load_failure(&mut self, reason: &str) {
        self.shell.show_error(
            "Editor failed to load",
            &format!("The editor page could not be loaded, so documents cannot be shown or saved.\n\n{reason}"),
        );
    }

    fn update_title(&mut self) {
        let title = self.session.title();
        self.shell.set_title(&title);
    }
}

fn about_text() -> String {
    let m = if cfg!(target_os = "macos") { "Cmd" } else { "Ctrl" };
    format!(
        "{APP_NAME} \u{2014} v{}\n\n\
         A minimal Markdown editor using an embedded web view and Toast UI Editor.\n\n\
         Keyboard shortcuts:\n\
         - New: {m}+N\n- Open: {m}+O\n- Save: {m}+S\n- Save As: {m}+Shift+S\n\
         - Zoom In / Out / Actual Size: {m}+Plus / {m}+Minus / {m}+0\n",
        version_full()
    )
}
