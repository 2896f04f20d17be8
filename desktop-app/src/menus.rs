//! Native menu bar (muda).
//!
//! Every custom item carries an [`Action`] id; menu clicks come back through
//! `MenuEvent` and are dispatched by the event loop. Edit commands are the
//! platform's predefined items so they act on the focused web view directly.

use std::path::PathBuf;

use markwrite_core::APP_NAME;
use muda::accelerator::{Accelerator, Code, Modifiers, CMD_OR_CTRL};
use muda::{IsMenuItem, Menu, MenuItem, MenuItemKind, PredefinedMenuItem, Submenu};

use crate::actions::Action;

/// The application menu and the parts of it that change at runtime.
pub struct AppMenu {
    pub menu: Menu,
    recent: Submenu,
}

fn item(action: Action, text: &str, accelerator: Option<Accelerator>) -> MenuItem {
    MenuItem::with_id(action.id(), text, true, accelerator)
}

fn cmd(code: Code) -> Option<Accelerator> {
    Some(Accelerator::new(Some(CMD_OR_CTRL), code))
}

fn cmd_shift(code: Code) -> Option<Accelerator> {
    Some(Accelerator::new(Some(CMD_OR_CTRL | Modifiers::SHIFT), code))
}

/// Menu label for a recent file: `notes.md  (/home/me/docs)`.
pub fn recent_label(path: &std::path::Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => format!("{name}  ({})", dir.display()),
        None => name,
    }
}

impl AppMenu {
    pub fn build(recent_files: &[PathBuf]) -> muda::Result<Self> {
        let menu = Menu::new();

        #[cfg(target_os = "macos")]
        {
            let app_menu = Submenu::with_items(
                APP_NAME,
                true,
                &[
                    &item(Action::About, &format!("About {APP_NAME}"), None),
                    &PredefinedMenuItem::separator(),
                    &PredefinedMenuItem::services(None),
                    &PredefinedMenuItem::separator(),
                    &PredefinedMenuItem::hide(None),
                    &PredefinedMenuItem::hide_others(None),
                    &PredefinedMenuItem::show_all(None),
                    &PredefinedMenuItem::separator(),
                    &item(Action::Quit, &format!("Quit {APP_NAME}"), cmd(Code::KeyQ)),
                ],
            )?;
            menu.append(&app_menu)?;
        }

        let recent = Submenu::new("Open &Recent", true);
        let file_menu = Submenu::with_items(
            "&File",
            true,
            &[
                &item(Action::NewFile, "&New", cmd(Code::KeyN)),
                &item(Action::OpenFile, "&Open\u{2026}", cmd(Code::KeyO)),
                &recent,
                &PredefinedMenuItem::separator(),
                &item(Action::Save, "&Save", cmd(Code::KeyS)),
                &item(Action::SaveAs, "Save &As\u{2026}", cmd_shift(Code::KeyS)),
                &PredefinedMenuItem::separator(),
                &item(Action::ExportHtml, "Export as &HTML\u{2026}", None),
            ],
        )?;
        #[cfg(not(target_os = "macos"))]
        file_menu.append_items(&[
            &PredefinedMenuItem::separator(),
            &item(Action::Quit, "&Quit", cmd(Code::KeyQ)),
        ])?;

        let edit_menu = Submenu::with_items(
            "&Edit",
            true,
            &[
                &PredefinedMenuItem::undo(None),
                &PredefinedMenuItem::redo(None),
                &PredefinedMenuItem::separator(),
                &PredefinedMenuItem::cut(None),
                &PredefinedMenuItem::copy(None),
                &PredefinedMenuItem::paste(None),
                &PredefinedMenuItem::separator(),
                &PredefinedMenuItem::select_all(None),
            ],
        )?;

        let view_menu = Submenu::with_items(
            "&View",
            true,
            &[
                &item(Action::ZoomIn, "Zoom &In", cmd(Code::Equal)),
                &item(Action::ZoomOut, "Zoom &Out", cmd(Code::Minus)),
                &item(Action::ZoomReset, "&Actual Size", cmd(Code::Digit0)),
            ],
        )?;

        menu.append_items(&[&file_menu, &edit_menu, &view_menu])?;

        #[cfg(not(target_os = "macos"))]
        {
            let help_menu = Submenu::with_items(
                "&Help",
                true,
                &[&item(Action::About, &format!("&About {APP_NAME}"), None)],
            )?;
            menu.append(&help_menu)?;
        }

        let app_menu = Self { menu, recent };
        app_menu.set_recent(recent_files)?;
        Ok(app_menu)
    }

    /// Replace the Open Recent entries.
    pub fn set_recent(&self, files: &[PathBuf]) -> muda::Result<()> {
        for entry in self.recent.items() {
            let entry: &dyn IsMenuItem = match &entry {
                MenuItemKind::MenuItem(i) => i,
                MenuItemKind::Submenu(i) => i,
                MenuItemKind::Predefined(i) => i,
                MenuItemKind::Check(i) => i,
                MenuItemKind::Icon(i) => i,
            };
            self.recent.remove(entry)?;
        }

        if files.is_empty() {
            let empty = MenuItem::new("No Recent Files", false, None);
            return self.recent.append(&empty);
        }

        for (n, path) in files.iter().enumerate() {
            self.recent.append(&item(Action::OpenRecent(n), &recent_label(path), None))?;
        }
        self.recent.append_items(&[
            &PredefinedMenuItem::separator(),
            &item(Action::ClearRecent, "Clear Menu", None),
        ])
    }
}
