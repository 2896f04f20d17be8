//! Main window: tao event loop, wry web view, and the controller wiring.
//!
//! Everything runs on the UI thread. The page talks to us through the IPC
//! handler, menus through `MenuEvent`, and script replies wake the loop with
//! [`UserEvent::Wake`]. Each event ends with a controller pump; the loop
//! then sleeps until the controller's next deadline.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use markwrite_config::{RecentFiles, Settings};
use markwrite_core::{BridgeOptions, ControllerOptions, WindowController, APP_NAME};
use markwrite_io::FsStore;
use muda::{MenuEvent, MenuId};
use tao::dpi::LogicalSize;
use tao::event::{Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tao::window::{Window, WindowBuilder};
use wry::{WebView, WebViewBuilder};

use crate::actions::Action;
use crate::ipc::PageMessage;
use crate::menus::AppMenu;
use crate::protocol;
use crate::shell::NativeShell;
use crate::surface::WebViewSurface;

type Controller = WindowController<WebViewSurface, NativeShell, FsStore>;

#[derive(Debug)]
pub enum UserEvent {
    /// Raw IPC message from the editor page.
    Page(String),
    Menu(MenuId),
    /// A script reply arrived; pump the controller.
    Wake,
}

/// Startup failures before the event loop runs.
#[derive(Debug)]
pub enum LaunchError {
    Window(tao::error::OsError),
    WebView(wry::Error),
    Menu(muda::Error),
    NoContainer,
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window(e) => write!(f, "could not create window: {}", e),
            Self::WebView(e) => write!(f, "could not create web view: {}", e),
            Self::Menu(e) => write!(f, "could not create menu bar: {}", e),
            Self::NoContainer => write!(f, "window has no container for the web view"),
        }
    }
}

impl std::error::Error for LaunchError {}

impl From<tao::error::OsError> for LaunchError {
    fn from(e: tao::error::OsError) -> Self {
        Self::Window(e)
    }
}

impl From<wry::Error> for LaunchError {
    fn from(e: wry::Error) -> Self {
        Self::WebView(e)
    }
}

impl From<muda::Error> for LaunchError {
    fn from(e: muda::Error) -> Self {
        Self::Menu(e)
    }
}

pub struct LaunchOptions {
    pub settings: Settings,
    pub asset_root: Option<PathBuf>,
    /// File to open once the window exists.
    pub open: Option<PathBuf>,
}

pub fn run(launch: LaunchOptions) -> Result<(), LaunchError> {
    let LaunchOptions { settings, asset_root, open } = launch;

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let mut recent = RecentFiles::load();
    recent.prune_missing();
    let menu = Rc::new(AppMenu::build(&recent.files)?);

    let window = Rc::new(
        WindowBuilder::new()
            .with_title(APP_NAME)
            .with_inner_size(LogicalSize::new(settings.window_width as f64, settings.window_height as f64))
            .build(&event_loop)?,
    );
    attach_menu(&menu, &window)?;

    let menu_proxy = Mutex::new(proxy.clone());
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        if let Ok(proxy) = menu_proxy.lock() {
            let _ = proxy.send_event(UserEvent::Menu(event.id));
        }
    }));

    let webview = Rc::new(build_webview(&window, asset_root, proxy.clone())?);

    let options = ControllerOptions {
        default_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
        bridge: BridgeOptions {
            call_timeout: Duration::from_secs(settings.bridge_timeout_secs),
            load_timeout: Duration::from_secs(settings.load_timeout_secs),
        },
        zoom: settings.zoom,
        export_standalone: settings.export_standalone,
    };
    let surface = WebViewSurface::new(webview, proxy);
    let shell = NativeShell::new(window, menu, settings, recent);
    let mut controller = WindowController::new(surface, shell, FsStore, options, Instant::now());

    if let Some(path) = open {
        // Held by the bridge until the page is ready
        controller.open_path(&path, Instant::now());
    }

    event_loop.run(move |event, _target, control_flow| {
        let now = Instant::now();
        match event {
            Event::NewEvents(StartCause::Init) => log::debug!("event loop started"),
            Event::UserEvent(UserEvent::Page(raw)) => handle_page_message(&mut controller, &raw, now),
            Event::UserEvent(UserEvent::Menu(id)) => match Action::from_id(id.as_ref()) {
                Some(action) => dispatch(&mut controller, action, now),
                None => log::debug!("unhandled menu id {:?}", id),
            },
            Event::UserEvent(UserEvent::Wake) => {}
            Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                controller.request_close(now);
            }
            Event::Opened { urls } => {
                for path in file_paths(&urls) {
                    controller.handle_open_request(&path, now);
                }
            }
            _ => {}
        }

        controller.pump(now);

        if controller.shell().close_requested() {
            *control_flow = ControlFlow::Exit;
            return;
        }
        *control_flow = match controller.next_deadline() {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        };
    })
}

fn build_webview(
    window: &Window,
    asset_root: Option<PathBuf>,
    proxy: tao::event_loop::EventLoopProxy<UserEvent>,
) -> Result<WebView, LaunchError> {
    let builder = WebViewBuilder::new()
        .with_custom_protocol(protocol::SCHEME.to_string(), move |_webview_id, request| {
            protocol::respond(asset_root.as_deref(), &request)
        })
        .with_ipc_handler(move |request: wry::http::Request<String>| {
            let _ = proxy.send_event(UserEvent::Page(request.body().clone()));
        })
        .with_devtools(cfg!(debug_assertions))
        .with_url(protocol::start_url());

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    let webview = builder.build(window)?;

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window.default_vbox().ok_or(LaunchError::NoContainer)?;
        builder.build_gtk(vbox)?
    };

    Ok(webview)
}

fn attach_menu(menu: &AppMenu, window: &Window) -> Result<(), LaunchError> {
    #[cfg(target_os = "windows")]
    {
        use tao::platform::windows::WindowExtWindows;
        unsafe { menu.menu.init_for_hwnd(window.hwnd() as _)? };
    }
    #[cfg(target_os = "macos")]
    {
        let _ = window;
        menu.menu.init_for_nsapp();
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        use tao::platform::unix::WindowExtUnix;
        menu.menu.init_for_gtk_window(window.gtk_window(), window.default_vbox())?;
    }
    Ok(())
}

fn handle_page_message(controller: &mut Controller, raw: &str, now: Instant) {
    match PageMessage::parse(raw) {
        Ok(PageMessage::Ready) => controller.page_ready(now),
        Ok(PageMessage::Failed { reason }) => controller.page_failed(&reason, now),
        Ok(PageMessage::Changed) => controller.content_changed(),
        Ok(PageMessage::Command { action }) => match toolbar_action(&action) {
            Some(action) => dispatch(controller, action, now),
            None => log::warn!("ignoring unknown toolbar command {:?}", action),
        },
        Err(e) => log::warn!("ignoring malformed page message {:?}: {}", raw, e),
    }
}

/// Toolbar buttons share the menu ids; only whole-window commands are
/// accepted from the page.
fn toolbar_action(id: &str) -> Option<Action> {
    match Action::from_id(id)? {
        Action::OpenRecent(_) | Action::ClearRecent => None,
        action => Some(action),
    }
}

fn dispatch(controller: &mut Controller, action: Action, now: Instant) {
    log::debug!("menu action {:?}", action);
    match action {
        Action::NewFile => controller.new_document(now),
        Action::OpenFile => controller.open(now),
        Action::OpenRecent(n) => match controller.shell().recent_file(n) {
            Some(path) => controller.open_path(&path, now),
            None => log::warn!("no recent file at index {}", n),
        },
        Action::ClearRecent => controller.shell_mut().clear_recent(),
        Action::Save => controller.save(now),
        Action::SaveAs => controller.save_as(now),
        Action::ExportHtml => controller.export_html(now),
        Action::Quit => controller.request_close(now),
        Action::ZoomIn => controller.zoom_in(),
        Action::ZoomOut => controller.zoom_out(),
        Action::ZoomReset => controller.zoom_reset(),
        Action::About => controller.about(),
    }
}

/// Local file paths from an OS open request; other URLs are dropped.
pub fn file_paths(urls: &[url::Url]) -> Vec<PathBuf> {
    urls.iter()
        .filter_map(|url| match url.to_file_path() {
            Ok(path) => Some(path),
            Err(()) => {
                log::warn!("ignoring open request for non-file URL {}", url);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_paths_keeps_only_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.md");
        let urls = vec![
            url::Url::from_file_path(&file).unwrap(),
            url::Url::parse("https://example.com/notes.md").unwrap(),
        ];
        assert_eq!(file_paths(&urls), vec![file]);
    }

    #[test]
    fn test_toolbar_commands_map_to_actions() {
        assert_eq!(toolbar_action("file.open"), Some(Action::OpenFile));
        assert_eq!(toolbar_action("file.save_as"), Some(Action::SaveAs));
        assert_eq!(toolbar_action("view.zoom_reset"), Some(Action::ZoomReset));
        assert_eq!(toolbar_action("file.recent.0"), None);
        assert_eq!(toolbar_action("rm -rf"), None);
    }
}
