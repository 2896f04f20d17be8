//! `markwrite-core`: document session, editor bridge and window controller.
//!
//! Nothing in this crate knows about the concrete window toolkit or webview.
//! The desktop shell plugs in through [`bridge::EditorSurface`] and
//! [`controller::WindowShell`].

pub mod bridge;
pub mod controller;
pub mod document;
pub mod escape;
pub mod zoom;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{BridgeCall, BridgeError, BridgeOptions, EditorBridge, EditorSurface, LoadState};
pub use controller::{ControllerOptions, DiscardChoice, WindowController, WindowShell};
pub use document::DocumentSession;

pub const APP_NAME: &str = "MarkWrite";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_BUILD: &str = "000021";

/// `0.1.2 (build 000021)`
pub fn version_full() -> String {
    format!("{APP_VERSION} (build {APP_BUILD})")
}
