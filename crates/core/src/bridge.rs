//! Bridge between the host and the editor page.
//!
//! The editor lives inside the embedded webview and is reachable only by
//! evaluating script and waiting for the reply callback. This module turns
//! that into three operations on a remote object (set document, get
//! document, get rendered output), each returning a [`BridgeCall`] handle
//! that resolves exactly once: with the reply, a timeout, or cancellation.
//!
//! The page is not ready when the window is created. Until it signals
//! readiness a single pending write is held (last write wins) and applied
//! at the `Loading -> Ready` transition. Reads before readiness fail with
//! [`BridgeError::NotReady`] instead of hanging.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::escape::script_string_literal;

macro_rules! editor_object {
    () => {
        "window.__markwrite"
    };
}

/// Global object the editor page installs.
pub const EDITOR_OBJECT: &str = editor_object!();

pub(crate) const GET_MARKDOWN_SCRIPT: &str = concat!(editor_object!(), ".getMarkdown()");
pub(crate) const GET_HTML_SCRIPT: &str = concat!(editor_object!(), ".getHTML()");
pub(crate) const SET_MARKDOWN_PREFIX: &str = concat!(editor_object!(), ".setMarkdown(");

fn set_markdown_script(text: &str) -> String {
    format!("{SET_MARKDOWN_PREFIX}{})", script_string_literal(text))
}

/// Reply continuation handed to the surface.
///
/// Receives the JSON serialisation of the script's result.
pub type ScriptCallback = Box<dyn FnOnce(String) + Send + 'static>;

/// The embedded rendering surface, as seen by the bridge.
pub trait EditorSurface {
    /// Evaluate `script` in the page. When `on_reply` is given the surface
    /// invokes it once, later, on the UI thread.
    fn evaluate(&self, script: &str, on_reply: Option<ScriptCallback>) -> Result<(), SurfaceError>;

    fn set_zoom(&self, factor: f64) -> Result<(), SurfaceError>;
}

/// The surface refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError(pub String);

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SurfaceError {}

/// A simple oneshot channel for single-use replies.
/// Uses std::sync::mpsc under the hood.
pub mod oneshot {
    use std::sync::mpsc;

    pub struct Sender<T>(mpsc::SyncSender<T>);
    pub struct Receiver<T>(mpsc::Receiver<T>);

    impl<T> Sender<T> {
        pub fn send(self, value: T) -> Result<(), T> {
            self.0.send(value).map_err(|e| e.0)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TryRecvError {
        /// No reply yet.
        Empty,
        /// The sender was dropped without replying.
        Disconnected,
    }

    impl<T> Receiver<T> {
        pub fn try_recv(&self) -> Result<T, TryRecvError> {
            self.0.try_recv().map_err(|e| match e {
                mpsc::TryRecvError::Empty => TryRecvError::Empty,
                mpsc::TryRecvError::Disconnected => TryRecvError::Disconnected,
            })
        }
    }

    pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
        // Buffer of 1 for oneshot semantics
        let (tx, rx) = mpsc::sync_channel(1);
        (Sender(tx), Receiver(rx))
    }
}

/// Why a bridge call did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The page has not signalled readiness yet.
    NotReady,
    /// The page failed to load; the bridge is unusable for this window.
    PageFailed(String),
    /// A later `set_document` replaced this one before the page was ready.
    Superseded,
    /// The script ran but did not return what the host expected.
    ScriptFailed(String),
    /// No reply within the call timeout.
    Timeout(Duration),
    /// The window was closed while the call was in flight.
    Cancelled,
    /// The surface refused to evaluate the script.
    Surface(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "the editor is still loading"),
            Self::PageFailed(reason) => write!(f, "the editor failed to load: {reason}"),
            Self::Superseded => write!(f, "replaced by a newer document"),
            Self::ScriptFailed(msg) => write!(f, "the editor returned an unexpected result: {msg}"),
            Self::Timeout(after) => {
                write!(f, "the editor did not respond within {} seconds", after.as_secs())
            }
            Self::Cancelled => write!(f, "the window was closed"),
            Self::Surface(msg) => write!(f, "could not reach the editor: {msg}"),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Cancellation flag tied to a window's lifetime.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type Reply<T> = Result<T, BridgeError>;

enum CallState<T> {
    Waiting(oneshot::Receiver<Reply<T>>),
    Resolved(Reply<T>),
    Taken,
}

/// Handle to one in-flight request against the editor page.
///
/// Poll it with [`BridgeCall::try_resolve`] from the event loop; it yields a
/// result exactly once.
pub struct BridgeCall<T> {
    state: CallState<T>,
    deadline: Option<Instant>,
    timeout: Duration,
    cancel: CancelToken,
}

impl<T> BridgeCall<T> {
    fn waiting(
        rx: oneshot::Receiver<Reply<T>>,
        deadline: Option<Instant>,
        timeout: Duration,
        cancel: CancelToken,
    ) -> Self {
        Self { state: CallState::Waiting(rx), deadline, timeout, cancel }
    }

    fn resolved(reply: Reply<T>) -> Self {
        Self {
            state: CallState::Resolved(reply),
            deadline: None,
            timeout: Duration::ZERO,
            cancel: CancelToken::new(),
        }
    }

    /// When this call gives up waiting, if it is still waiting.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            CallState::Waiting(_) => self.deadline,
            _ => None,
        }
    }

    /// Returns `Some` once, when the call has an outcome; `None` while it is
    /// still pending and after the outcome has been taken.
    pub fn try_resolve(&mut self, now: Instant) -> Option<Reply<T>> {
        let outcome = match &self.state {
            CallState::Taken => return None,
            CallState::Resolved(_) => None,
            CallState::Waiting(_) if self.cancel.is_cancelled() => Some(Err(BridgeError::Cancelled)),
            CallState::Waiting(rx) => match rx.try_recv() {
                Ok(reply) => Some(reply),
                Err(oneshot::TryRecvError::Disconnected) => Some(Err(BridgeError::ScriptFailed(
                    "the reply was dropped".to_string(),
                ))),
                Err(oneshot::TryRecvError::Empty) => match self.deadline {
                    Some(deadline) if now >= deadline => Some(Err(BridgeError::Timeout(self.timeout))),
                    _ => return None,
                },
            },
        };

        match std::mem::replace(&mut self.state, CallState::Taken) {
            CallState::Resolved(reply) => Some(reply),
            _ => outcome,
        }
    }
}

/// Decoding of the JSON reply produced by the surface.
fn decode_text(raw: &str) -> Reply<String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::String(text)) => Ok(text),
        Ok(serde_json::Value::Null) => Err(BridgeError::ScriptFailed("no value".to_string())),
        Ok(other) => Err(BridgeError::ScriptFailed(format!("expected text, got {other}"))),
        Err(e) => Err(BridgeError::ScriptFailed(format!("reply is not JSON ({e})"))),
    }
}

fn decode_ack(raw: &str) -> Reply<()> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Bool(true)) => Ok(()),
        _ => Err(BridgeError::ScriptFailed(format!("document was not applied ({raw})"))),
    }
}

/// Page lifecycle as seen from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Waiting for the page to signal readiness.
    Loading,
    /// The editor object is installed and answering.
    Ready,
    /// The page reported an error or never became ready. Terminal.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeOptions {
    /// How long a read or an acknowledgement may take once issued.
    pub call_timeout: Duration,
    /// How long the page may take to signal readiness.
    pub load_timeout: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            load_timeout: Duration::from_secs(10),
        }
    }
}

struct PendingWrite {
    text: String,
    reply: oneshot::Sender<Reply<()>>,
}

/// Host side of the editor page for one window.
pub struct EditorBridge<S> {
    surface: S,
    state: LoadState,
    pending: Option<PendingWrite>,
    cancel: CancelToken,
    options: BridgeOptions,
    load_deadline: Option<Instant>,
}

impl<S: EditorSurface> EditorBridge<S> {
    pub fn new(surface: S, options: BridgeOptions, now: Instant) -> Self {
        Self {
            surface,
            state: LoadState::Loading,
            pending: None,
            cancel: CancelToken::new(),
            options,
            load_deadline: Some(now + options.load_timeout),
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Deadline of the load watchdog while the page is still loading.
    pub fn load_deadline(&self) -> Option<Instant> {
        match self.state {
            LoadState::Loading => self.load_deadline,
            _ => None,
        }
    }

    /// Replace the editor's document.
    ///
    /// Before readiness the text is held and applied at the transition; a
    /// second call replaces it and the first call resolves `Superseded`.
    pub fn set_document(&mut self, text: &str, now: Instant) -> BridgeCall<()> {
        match &self.state {
            LoadState::Loading => {
                let (tx, rx) = oneshot::channel();
                if let Some(previous) = self.pending.replace(PendingWrite { text: text.to_string(), reply: tx }) {
                    log::debug!("bridge: pending document replaced before page was ready");
                    let _ = previous.reply.send(Err(BridgeError::Superseded));
                }
                let deadline = self.load_deadline.unwrap_or(now) + self.options.call_timeout;
                BridgeCall::waiting(rx, Some(deadline), self.options.call_timeout, self.cancel.clone())
            }
            LoadState::Ready => self.dispatch(&set_markdown_script(text), decode_ack, now),
            LoadState::Failed(reason) => BridgeCall::resolved(Err(BridgeError::PageFailed(reason.clone()))),
        }
    }

    /// Current Markdown text of the editor.
    pub fn get_document(&self, now: Instant) -> BridgeCall<String> {
        self.read(GET_MARKDOWN_SCRIPT, now)
    }

    /// Rendered HTML of the editor's document, for export.
    pub fn get_rendered_output(&self, now: Instant) -> BridgeCall<String> {
        self.read(GET_HTML_SCRIPT, now)
    }

    fn read(&self, script: &str, now: Instant) -> BridgeCall<String> {
        match &self.state {
            LoadState::Loading => BridgeCall::resolved(Err(BridgeError::NotReady)),
            LoadState::Ready => self.dispatch(script, decode_text, now),
            LoadState::Failed(reason) => BridgeCall::resolved(Err(BridgeError::PageFailed(reason.clone()))),
        }
    }

    fn dispatch<T: Send + 'static>(
        &self,
        script: &str,
        decode: fn(&str) -> Reply<T>,
        now: Instant,
    ) -> BridgeCall<T> {
        let (tx, rx) = oneshot::channel();
        let on_reply: ScriptCallback = Box::new(move |raw: String| {
            // Receiver gone means the call was cancelled or timed out
            let _ = tx.send(decode(&raw));
        });
        match self.surface.evaluate(script, Some(on_reply)) {
            Ok(()) => BridgeCall::waiting(
                rx,
                Some(now + self.options.call_timeout),
                self.options.call_timeout,
                self.cancel.clone(),
            ),
            Err(e) => {
                log::warn!("bridge: evaluate failed: {}", e);
                BridgeCall::resolved(Err(BridgeError::Surface(e.0)))
            }
        }
    }

    /// The page finished loading and installed the editor object.
    pub fn page_ready(&mut self) {
        match self.state {
            LoadState::Loading => {}
            LoadState::Ready => {
                log::warn!("bridge: editor page signalled ready twice; ignoring");
                return;
            }
            LoadState::Failed(_) => {
                log::warn!("bridge: ready signal after load failure; ignoring");
                return;
            }
        }

        log::info!("bridge: editor page ready");
        self.state = LoadState::Ready;
        self.load_deadline = None;

        if let Some(PendingWrite { text, reply }) = self.pending.take() {
            let on_reply: ScriptCallback = Box::new(move |raw: String| {
                let _ = reply.send(decode_ack(&raw));
            });
            if let Err(e) = self.surface.evaluate(&set_markdown_script(&text), Some(on_reply)) {
                // on_reply was dropped with the error, so the waiting call
                // resolves as a dropped reply
                log::warn!("bridge: could not apply pending document: {}", e);
            }
        }
    }

    /// The page could not set up the editor. Returns true on the transition
    /// into `Failed`, so the caller reports it once.
    pub fn page_failed(&mut self, reason: &str) -> bool {
        if self.state != LoadState::Loading {
            log::warn!("bridge: late failure report ignored: {}", reason);
            return false;
        }
        log::error!("bridge: editor page failed to load: {}", reason);
        self.state = LoadState::Failed(reason.to_string());
        self.load_deadline = None;
        if let Some(pending) = self.pending.take() {
            let _ = pending.reply.send(Err(BridgeError::PageFailed(reason.to_string())));
        }
        true
    }

    /// Load watchdog. Returns true if the page just timed out.
    pub fn check_load_deadline(&mut self, now: Instant) -> bool {
        match self.load_deadline() {
            Some(deadline) if now >= deadline => {
                let reason = format!(
                    "the page did not finish loading within {} seconds",
                    self.options.load_timeout.as_secs()
                );
                self.page_failed(&reason)
            }
            _ => false,
        }
    }

    pub fn set_zoom(&self, factor: f64) -> Result<(), SurfaceError> {
        self.surface.set_zoom(factor)
    }

    /// Window is going away: every outstanding call resolves `Cancelled`.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(pending) = self.pending.take() {
            let _ = pending.reply.send(Err(BridgeError::Cancelled));
        }
    }
}
