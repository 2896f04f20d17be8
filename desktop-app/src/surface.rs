//! The wry web view as an [`EditorSurface`].

use std::rc::Rc;
use std::sync::Mutex;

use markwrite_core::bridge::{ScriptCallback, SurfaceError};
use markwrite_core::EditorSurface;
use tao::event_loop::EventLoopProxy;
use wry::WebView;

use crate::window::UserEvent;

pub struct WebViewSurface {
    webview: Rc<WebView>,
    proxy: EventLoopProxy<UserEvent>,
}

impl WebViewSurface {
    pub fn new(webview: Rc<WebView>, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self { webview, proxy }
    }
}

impl EditorSurface for WebViewSurface {
    fn evaluate(&self, script: &str, on_reply: Option<ScriptCallback>) -> Result<(), SurfaceError> {
        let result = match on_reply {
            None => self.webview.evaluate_script(script),
            Some(on_reply) => {
                // wry may call back more than once; the reply is delivered once
                let slot = Mutex::new(Some(on_reply));
                let proxy = self.proxy.clone();
                self.webview.evaluate_script_with_callback(script, move |raw: String| {
                    let callback = slot.lock().ok().and_then(|mut slot| slot.take());
                    if let Some(callback) = callback {
                        callback(raw);
                        // Wake the event loop so the controller picks the reply up
                        let _ = proxy.send_event(UserEvent::Wake);
                    }
                })
            }
        };
        result.map_err(|e| SurfaceError(e.to_string()))
    }

    fn set_zoom(&self, factor: f64) -> Result<(), SurfaceError> {
        self.webview.zoom(factor).map_err(|e| SurfaceError(e.to_string()))
    }
}
