//! Messages posted by the editor page over `window.ipc.postMessage`.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageMessage {
    /// `window.__markwrite` is installed and the editor is mounted.
    Ready,
    /// The editor could not be created (missing assets, script error).
    Failed { reason: String },
    /// The user changed the document.
    Changed,
    /// A toolbar button asked for a host action, by menu id (`file.open`).
    Command { action: String },
}

impl PageMessage {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_messages() {
        assert_eq!(PageMessage::parse(r#"{"type":"ready"}"#).unwrap(), PageMessage::Ready);
        assert_eq!(PageMessage::parse(r#"{"type":"changed"}"#).unwrap(), PageMessage::Changed);
        assert_eq!(
            PageMessage::parse(r#"{"type":"failed","reason":"toastui is not defined"}"#).unwrap(),
            PageMessage::Failed { reason: "toastui is not defined".to_string() }
        );
    }

    #[test]
    fn test_parse_toolbar_command() {
        assert_eq!(
            PageMessage::parse(r#"{"type":"command","action":"view.zoom_in"}"#).unwrap(),
            PageMessage::Command { action: "view.zoom_in".to_string() }
        );
        assert!(PageMessage::parse(r#"{"type":"command"}"#).is_err());
    }

    #[test]
    fn test_rejects_unknown_or_malformed() {
        assert!(PageMessage::parse(r#"{"type":"reload"}"#).is_err());
        assert!(PageMessage::parse(r#"{"type":"failed"}"#).is_err());
        assert!(PageMessage::parse("ready").is_err());
    }
}
