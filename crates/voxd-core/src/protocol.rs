//! Socket wire protocol.
//!
//! A client sends a single short UTF-8 token and receives one JSON object
//! back. Only the `toggle` command is recognized; everything else is
//! answered with an error object and the connection is closed.

use serde::{Deserialize, Serialize};

/// A command received from a client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start recording if idle, otherwise stop and transcribe.
    Toggle,
}

impl Command {
    /// Parses a whitespace-trimmed command token.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "toggle" => Some(Self::Toggle),
            _ => None,
        }
    }
}

/// A successful reply, tagged by its `status` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Reply {
    /// Recording has started
    Recording,
    /// Recording has stopped and been transcribed
    Done { text: String },
}

/// The JSON object written back to a client: either a status reply or an
/// error with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Reply(Reply),
    Error { error: String },
}

impl Response {
    /// Reply sent after a recording starts.
    pub fn recording() -> Self {
        Self::Reply(Reply::Recording)
    }

    /// Reply sent after a recording finishes, carrying the transcript.
    pub fn done(text: impl Into<String>) -> Self {
        Self::Reply(Reply::Done { text: text.into() })
    }

    /// Error reply with a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Error reply for an unrecognized command token.
    pub fn unknown_command(raw: &str) -> Self {
        Self::error(format!("unknown command: {raw}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toggle() {
        assert_eq!(Command::parse("toggle"), Some(Command::Toggle));
        assert_eq!(Command::parse("Toggle"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("status"), None);
    }

    #[test]
    fn test_recording_wire_shape() {
        let json = serde_json::to_string(&Response::recording()).unwrap();
        assert_eq!(json, r#"{"status":"recording"}"#);
    }

    #[test]
    fn test_done_wire_shape() {
        let json = serde_json::to_string(&Response::done("hello world")).unwrap();
        assert_eq!(json, r#"{"status":"done","text":"hello world"}"#);
    }

    #[test]
    fn test_error_wire_shape() {
        let json = serde_json::to_string(&Response::unknown_command("ping")).unwrap();
        assert_eq!(json, r#"{"error":"unknown command: ping"}"#);
    }

    #[test]
    fn test_response_round_trip() {
        let response = Response::done("ok");
        let json = serde_json::to_string(&response).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }
}
