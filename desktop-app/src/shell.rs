//! Native window services for the controller: rfd dialogs, the tao window
//! title, and the persisted recent-files list and zoom level.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use markwrite_config::{RecentFiles, Settings};
use markwrite_core::{DiscardChoice, WindowShell};
use markwrite_io::{HTML_EXTENSIONS, MARKDOWN_EXTENSIONS};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tao::window::Window;

use crate::menus::AppMenu;

pub struct NativeShell {
    window: Rc<Window>,
    menu: Rc<AppMenu>,
    settings: Settings,
    recent: RecentFiles,
    close_requested: bool,
}

impl NativeShell {
    pub fn new(window: Rc<Window>, menu: Rc<AppMenu>, settings: Settings, recent: RecentFiles) -> Self {
        Self { window, menu, settings, recent, close_requested: false }
    }

    /// The controller asked for the window to go away.
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn recent_file(&self, n: usize) -> Option<PathBuf> {
        self.recent.files.get(n).cloned()
    }

    pub fn clear_recent(&mut self) {
        self.recent.files.clear();
        self.store_recent();
    }

    fn store_recent(&self) {
        if let Err(e) = self.recent.save() {
            log::warn!("could not save recent files: {}", e);
        }
        if let Err(e) = self.menu.set_recent(&self.recent.files) {
            log::warn!("could not update Open Recent menu: {}", e);
        }
    }

    fn message(&self, level: MessageLevel, title: &str, message: &str) {
        MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .set_parent(&*self.window)
            .show();
    }
}

fn split_suggestion(suggested: &Path) -> (Option<&Path>, String) {
    let dir = suggested.parent().filter(|p| !p.as_os_str().is_empty());
    let name = suggested
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, name)
}

impl WindowShell for NativeShell {
    fn pick_open_path(&mut self, start_dir: &Path) -> Option<PathBuf> {
        FileDialog::new()
            .set_title("Open Markdown")
            .add_filter("Markdown", MARKDOWN_EXTENSIONS)
            .add_filter("All files", &["*"])
            .set_directory(start_dir)
            .set_parent(&*self.window)
            .pick_file()
    }

    fn pick_save_path(&mut self, suggested: &Path) -> Option<PathBuf> {
        let (dir, name) = split_suggestion(suggested);
        let mut dialog = FileDialog::new()
            .set_title("Save Markdown")
            .add_filter("Markdown", MARKDOWN_EXTENSIONS)
            .add_filter("All files", &["*"])
            .set_file_name(name)
            .set_parent(&*self.window);
        if let Some(dir) = dir {
            dialog = dialog.set_directory(dir);
        }
        dialog.save_file()
    }

    fn pick_export_path(&mut self, suggested: &Path) -> Option<PathBuf> {
        let (dir, name) = split_suggestion(suggested);
        let mut dialog = FileDialog::new()
            .set_title("Export HTML")
            .add_filter("HTML", HTML_EXTENSIONS)
            .add_filter("All files", &["*"])
            .set_file_name(name)
            .set_parent(&*self.window);
        if let Some(dir) = dir {
            dialog = dialog.set_directory(dir);
        }
        dialog.save_file()
    }

    fn confirm_discard(&mut self) -> DiscardChoice {
        let answer = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Unsaved changes")
            .set_description("You have unsaved changes. Save before continuing?")
            .set_buttons(MessageButtons::YesNoCancel)
            .set_parent(&*self.window)
            .show();
        match answer {
            MessageDialogResult::Yes => DiscardChoice::Save,
            MessageDialogResult::No => DiscardChoice::Discard,
            _ => DiscardChoice::Cancel,
        }
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.message(MessageLevel::Error, title, message);
    }

    fn show_info(&mut self, title: &str, message: &str) {
        self.message(MessageLevel::Info, title, message);
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn close_window(&mut self) {
        self.close_requested = true;
        self.window.set_visible(false);
    }

    fn document_touched(&mut self, path: &Path) {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.recent.push(&path, self.settings.recent_files_limit);
        self.store_recent();
    }

    fn zoom_changed(&mut self, factor: f64) {
        self.settings.zoom = factor;
        if let Err(e) = self.settings.save() {
            log::warn!("could not save zoom level: {}", e);
        }
    }
}
