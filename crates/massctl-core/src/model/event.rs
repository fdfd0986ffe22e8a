// ── Event domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use massctl_api::EventMessage;

/// Object filter that matches every object id.
pub const ANY_OBJECT: &str = "*";

/// Class of a push event.
///
/// `Connected`, `Disconnected` and `Error` are produced locally by the client;
/// `All` only appears as a subscription filter. Unknown server event names
/// are preserved in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    PlayerAdded,
    PlayerUpdated,
    PlayerRemoved,
    PlayerSettingsUpdated,
    QueueAdded,
    QueueUpdated,
    QueueItemsUpdated,
    QueueTimeUpdated,
    QueueSettingsUpdated,
    Shutdown,
    MediaItemAdded,
    MediaItemUpdated,
    MediaItemDeleted,
    MediaItemPlayed,
    ProvidersUpdated,
    PlayerConfigUpdated,
    PlayerDspConfigUpdated,
    SyncTasksUpdated,
    AuthSession,
    BuiltinPlayer,
    Connected,
    Disconnected,
    Error,
    All,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PlayerAdded => "player_added",
            Self::PlayerUpdated => "player_updated",
            Self::PlayerRemoved => "player_removed",
            Self::PlayerSettingsUpdated => "player_settings_updated",
            Self::QueueAdded => "queue_added",
            Self::QueueUpdated => "queue_updated",
            Self::QueueItemsUpdated => "queue_items_updated",
            Self::QueueTimeUpdated => "queue_time_updated",
            Self::QueueSettingsUpdated => "queue_settings_updated",
            Self::Shutdown => "application_shutdown",
            Self::MediaItemAdded => "media_item_added",
            Self::MediaItemUpdated => "media_item_updated",
            Self::MediaItemDeleted => "media_item_deleted",
            Self::MediaItemPlayed => "media_item_played",
            Self::ProvidersUpdated => "providers_updated",
            Self::PlayerConfigUpdated => "player_config_updated",
            Self::PlayerDspConfigUpdated => "player_dsp_config_updated",
            Self::SyncTasksUpdated => "sync_tasks_updated",
            Self::AuthSession => "auth_session",
            Self::BuiltinPlayer => "builtin_player",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
            Self::All => "*",
            Self::Other(name) => name,
        }
    }

    /// Whether this filter accepts events of class `kind`.
    pub fn matches(&self, kind: &EventType) -> bool {
        matches!(self, Self::All) || self == kind
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s {
            "player_added" => Self::PlayerAdded,
            "player_updated" => Self::PlayerUpdated,
            "player_removed" => Self::PlayerRemoved,
            "player_settings_updated" => Self::PlayerSettingsUpdated,
            "queue_added" => Self::QueueAdded,
            "queue_updated" => Self::QueueUpdated,
            "queue_items_updated" => Self::QueueItemsUpdated,
            "queue_time_updated" => Self::QueueTimeUpdated,
            "queue_settings_updated" => Self::QueueSettingsUpdated,
            "application_shutdown" => Self::Shutdown,
            "media_item_added" => Self::MediaItemAdded,
            "media_item_updated" => Self::MediaItemUpdated,
            "media_item_deleted" => Self::MediaItemDeleted,
            "media_item_played" => Self::MediaItemPlayed,
            "providers_updated" => Self::ProvidersUpdated,
            "player_config_updated" => Self::PlayerConfigUpdated,
            "player_dsp_config_updated" => Self::PlayerDspConfigUpdated,
            "sync_tasks_updated" => Self::SyncTasksUpdated,
            "auth_session" => Self::AuthSession,
            "builtin_player" => Self::BuiltinPlayer,
            "connected" => Self::Connected,
            "disconnected" => Self::Disconnected,
            "error" => Self::Error,
            "*" => Self::All,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<EventType> for String {
    fn from(kind: EventType) -> Self {
        match kind {
            EventType::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A push event, either from the server or synthesized by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event: EventType,
    /// Id of the object the event concerns; empty when not applicable.
    #[serde(default)]
    pub object_id: String,
    #[serde(default)]
    pub data: Value,
}

impl Event {
    pub fn new(event: EventType, object_id: impl Into<String>, data: Value) -> Self {
        Self {
            event,
            object_id: object_id.into(),
            data,
        }
    }
}

impl From<EventMessage> for Event {
    fn from(msg: EventMessage) -> Self {
        Self {
            event: EventType::from(msg.event),
            object_id: msg.object_id.unwrap_or_default(),
            data: msg.data,
        }
    }
}
