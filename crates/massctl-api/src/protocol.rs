//! Wire protocol for the server's WebSocket API.
//!
//! Every frame is a JSON object. Outbound frames are commands; inbound frames
//! are classified by the first discriminating key present:
//!
//! 1. `message_id` -- a (possibly partial) command result or error
//! 2. `event` -- an unsolicited push event
//! 3. `server_version` -- the greeting sent once after the socket opens

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

// ── Outbound ─────────────────────────────────────────────────────────

/// Argument object attached to a command.
///
/// Absent optional arguments are simply never inserted, so the server
/// sees its own defaults for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(Map<String, Value>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    pub fn arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    /// Set `key` only when `value` is present.
    pub fn opt(mut self, key: &str, value: Option<impl Into<Value>>) -> Self {
        if let Some(v) = value {
            self.0.insert(key.to_owned(), v.into());
        }
        self
    }

    /// Merge every entry of a JSON object into the arguments.
    ///
    /// Non-object values are ignored.
    pub fn extend(mut self, extra: Value) -> Self {
        if let Value::Object(map) = extra {
            self.0.extend(map);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Args {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A command frame: `{"command", "message_id", "args"?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandMessage {
    pub command: String,
    pub message_id: u64,
    #[serde(skip_serializing_if = "Args::is_empty")]
    pub args: Args,
}

impl CommandMessage {
    pub fn new(command: impl Into<String>, message_id: u64, args: Args) -> Self {
        Self {
            command: command.into(),
            message_id,
            args,
        }
    }

    /// Serialize into the text frame sent over the socket.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

// ── Inbound ──────────────────────────────────────────────────────────

/// Result of a command, or one fragment of it when `partial` is set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultMessage {
    #[serde(deserialize_with = "message_id_from_any")]
    pub message_id: u64,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub partial: bool,
    /// Present only on error results. Servers send either a string or an
    /// integer code; both are normalized to a string.
    #[serde(default, deserialize_with = "error_code_from_any")]
    pub error_code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ResultMessage {
    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Unsolicited push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub event: String,
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Greeting sent by the server right after the socket opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub server_version: String,
    #[serde(default)]
    pub server_id: String,
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub min_supported_schema_version: u32,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub homeassistant_addon: bool,
    #[serde(default)]
    pub onboard_done: bool,
}

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Result(ResultMessage),
    Event(EventMessage),
    /// The greeting, decoded plus the frame as received.
    ServerInfo { info: ServerInfo, raw: Value },
}

impl InboundMessage {
    /// Parse and classify a text frame.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(ref obj) = value else {
            return Err(Error::UnknownMessage {
                body: truncate(text),
            });
        };

        if obj.contains_key("message_id") {
            Ok(Self::Result(serde_json::from_value(value)?))
        } else if obj.contains_key("event") {
            Ok(Self::Event(serde_json::from_value(value)?))
        } else if obj.contains_key("server_version") {
            let info = ServerInfo::deserialize(&value)?;
            Ok(Self::ServerInfo { info, raw: value })
        } else {
            Err(Error::UnknownMessage {
                body: truncate(text),
            })
        }
    }
}

// ── Lenient field decoding ───────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(u64),
    Signed(i64),
    String(String),
}

fn message_id_from_any<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::Signed(n) => Err(serde::de::Error::custom(format!(
            "negative message_id {n}"
        ))),
        StringOrNumber::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("non-numeric message_id '{s}'"))),
    }
}

fn error_code_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|code| match code {
            StringOrNumber::Number(n) => n.to_string(),
            StringOrNumber::Signed(n) => n.to_string(),
            StringOrNumber::String(s) => s,
        }),
    )
}

fn truncate(text: &str) -> String {
    const MAX: usize = 256;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn command_omits_empty_args() {
        let msg = CommandMessage::new("players/all", 7, Args::new());
        assert_eq!(msg.to_json().unwrap(), r#"{"command":"players/all","message_id":7}"#);
    }

    #[test]
    fn command_serializes_args() {
        let args = Args::new()
            .arg("player_id", "kitchen")
            .opt("limit", None::<u32>)
            .opt("offset", Some(10));
        let msg = CommandMessage::new("player_queues/items", 1, args);
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "command": "player_queues/items",
                "message_id": 1,
                "args": { "player_id": "kitchen", "offset": 10 }
            })
        );
    }

    #[test]
    fn classifies_result_before_event() {
        // A frame carrying both keys is a result.
        let raw = r#"{"message_id": 3, "event": "player_updated", "result": [1]}"#;
        let InboundMessage::Result(msg) = InboundMessage::parse(raw).unwrap() else {
            panic!("expected result");
        };
        assert_eq!(msg.message_id, 3);
        assert_eq!(msg.result, json!([1]));
        assert!(!msg.partial);
        assert!(!msg.is_error());
    }

    #[test]
    fn classifies_event() {
        let raw = r#"{"event": "queue_time_updated", "object_id": "q1", "data": 42}"#;
        let InboundMessage::Event(evt) = InboundMessage::parse(raw).unwrap() else {
            panic!("expected event");
        };
        assert_eq!(evt.event, "queue_time_updated");
        assert_eq!(evt.object_id.as_deref(), Some("q1"));
        assert_eq!(evt.data, json!(42));
    }

    #[test]
    fn classifies_server_greeting() {
        let frame = r#"{"server_id": "abc", "server_version": "2.5.0", "schema_version": 27,
                      "min_supported_schema_version": 24, "base_url": "http://mass:8095",
                      "homeassistant_addon": false, "onboard_done": true, "new_field": [1]}"#;
        let InboundMessage::ServerInfo { info, raw } = InboundMessage::parse(frame).unwrap() else {
            panic!("expected greeting");
        };
        assert_eq!(info.server_version, "2.5.0");
        assert_eq!(info.schema_version, 27);
        assert!(info.onboard_done);
        assert_eq!(raw["new_field"], json!([1]));
    }

    #[test]
    fn error_code_accepts_numbers_and_strings() {
        let numeric: ResultMessage =
            serde_json::from_str(r#"{"message_id": 1, "error_code": 999, "details": "boom"}"#)
                .unwrap();
        assert_eq!(numeric.error_code.as_deref(), Some("999"));
        assert!(numeric.is_error());

        let text: ResultMessage =
            serde_json::from_str(r#"{"message_id": "2", "error_code": "invalid_command"}"#)
                .unwrap();
        assert_eq!(text.message_id, 2);
        assert_eq!(text.error_code.as_deref(), Some("invalid_command"));
        assert_eq!(text.details, None);
    }

    #[test]
    fn non_numeric_message_id_is_rejected() {
        assert!(InboundMessage::parse(r#"{"message_id": "abc", "result": null}"#).is_err());
    }

    #[test]
    fn unknown_frames_are_rejected() {
        assert!(matches!(
            InboundMessage::parse(r#"{"hello": "world"}"#),
            Err(Error::UnknownMessage { .. })
        ));
        assert!(matches!(
            InboundMessage::parse("[1, 2]"),
            Err(Error::UnknownMessage { .. })
        ));
        assert!(matches!(
            InboundMessage::parse("not json"),
            Err(Error::Serialization(_))
        ));
    }
}
