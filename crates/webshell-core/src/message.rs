//! Wire protocol for the webshell session channel.

use serde::{Deserialize, Serialize};

/// One JSON-framed unit of the session protocol, both directions.
///
/// `stdin` and `resize` travel client to server; `stdout` travels server to
/// client. The `operation` tag is a closed set: anything else arriving on the
/// wire is a protocol violation and is dropped by the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum SessionMessage {
    /// Raw characters typed by the user.
    Stdin { data: String },
    /// New viewport dimensions.
    Resize { cols: u16, rows: u16 },
    /// Output from the remote side, rendered verbatim.
    Stdout { data: String },
}

impl SessionMessage {
    /// Create a `stdin` message.
    #[must_use]
    pub fn stdin(data: impl Into<String>) -> Self {
        Self::Stdin { data: data.into() }
    }

    /// Create a `resize` message.
    #[must_use]
    pub const fn resize(cols: u16, rows: u16) -> Self {
        Self::Resize { cols, rows }
    }

    /// Create a `stdout` message.
    #[must_use]
    pub fn stdout(data: impl Into<String>) -> Self {
        Self::Stdout { data: data.into() }
    }

    /// The wire tag for this message, as used in log fields.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Stdin { .. } => "stdin",
            Self::Resize { .. } => "resize",
            Self::Stdout { .. } => "stdout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdin_wire_shape() {
        let json = serde_json::to_string(&SessionMessage::stdin("ls\n")).unwrap();
        assert_eq!(json, r#"{"operation":"stdin","data":"ls\n"}"#);
    }

    #[test]
    fn resize_wire_shape() {
        let json = serde_json::to_string(&SessionMessage::resize(120, 40)).unwrap();
        assert_eq!(json, r#"{"operation":"resize","cols":120,"rows":40}"#);
    }

    #[test]
    fn parses_stdout() {
        let msg: SessionMessage =
            serde_json::from_str(r#"{"operation":"stdout","data":"hello"}"#).unwrap();
        assert_eq!(msg, SessionMessage::stdout("hello"));
    }

    #[test]
    fn rejects_unknown_operation() {
        let parsed =
            serde_json::from_str::<SessionMessage>(r#"{"operation":"ping","data":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn rejects_missing_payload_field() {
        let parsed = serde_json::from_str::<SessionMessage>(r#"{"operation":"stdout"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn operation_labels() {
        assert_eq!(SessionMessage::stdin("").operation(), "stdin");
        assert_eq!(SessionMessage::resize(1, 1).operation(), "resize");
        assert_eq!(SessionMessage::stdout("").operation(), "stdout");
    }
}
