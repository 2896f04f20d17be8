//! Commands reachable from the menu bar.
//!
//! Menu items carry a string id; the event loop maps it back to an
//! [`Action`] and dispatches it to the window controller.

const RECENT_PREFIX: &str = "file.recent.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NewFile,
    OpenFile,
    /// Entry `n` of the recent-files list.
    OpenRecent(usize),
    ClearRecent,
    Save,
    SaveAs,
    ExportHtml,
    Quit,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    About,
}

impl Action {
    pub fn id(&self) -> String {
        let id = match self {
            Action::NewFile => "file.new",
            Action::OpenFile => "file.open",
            Action::OpenRecent(n) => return format!("{RECENT_PREFIX}{n}"),
            Action::ClearRecent => "file.recent.clear",
            Action::Save => "file.save",
            Action::SaveAs => "file.save_as",
            Action::ExportHtml => "file.export_html",
            Action::Quit => "file.quit",
            Action::ZoomIn => "view.zoom_in",
            Action::ZoomOut => "view.zoom_out",
            Action::ZoomReset => "view.zoom_reset",
            Action::About => "help.about",
        };
        id.to_string()
    }

    pub fn from_id(id: &str) -> Option<Action> {
        let action = match id {
            "file.new" => Action::NewFile,
            "file.open" => Action::OpenFile,
            "file.recent.clear" => Action::ClearRecent,
            "file.save" => Action::Save,
            "file.save_as" => Action::SaveAs,
            "file.export_html" => Action::ExportHtml,
            "file.quit" => Action::Quit,
            "view.zoom_in" => Action::ZoomIn,
            "view.zoom_out" => Action::ZoomOut,
            "view.zoom_reset" => Action::ZoomReset,
            "help.about" => Action::About,
            other => {
                let n = other.strip_prefix(RECENT_PREFIX)?.parse().ok()?;
                Action::OpenRecent(n)
            }
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_entries_carry_their_index() {
        assert_eq!(Action::OpenRecent(3).id(), "file.recent.3");
        assert_eq!(Action::from_id("file.recent.3"), Some(Action::OpenRecent(3)));
        // The clear item shares the prefix but is not an index
        assert_eq!(Action::from_id(&Action::ClearRecent.id()), Some(Action::ClearRecent));
    }

    #[test]
    fn test_fixed_ids() {
        assert_eq!(Action::from_id("file.save_as"), Some(Action::SaveAs));
        assert_eq!(Action::from_id("view.zoom_reset"), Some(Action::ZoomReset));
        assert_eq!(Action::Quit.id(), "file.quit");
    }

    #[test]
    fn test_unknown_ids() {
        assert_eq!(Action::from_id("file.recent.x"), None);
        assert_eq!(Action::from_id("edit.undo"), None);
        assert_eq!(Action::from_id(""), None);
    }
}
