// ── Typed request structs for Command payloads ──
//
// Each struct serializes to exactly the argument object its command sends.
// Optional fields left at `None` are omitted so the server applies its own
// defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{ConfigValues, MediaItem, MediaType, QueueOption};

/// A media reference: a URI string or a full item object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    Uri(String),
    Item(Box<MediaItem>),
}

impl From<&str> for MediaRef {
    fn from(uri: &str) -> Self {
        Self::Uri(uri.to_owned())
    }
}

impl From<String> for MediaRef {
    fn from(uri: String) -> Self {
        Self::Uri(uri)
    }
}

impl From<MediaItem> for MediaRef {
    fn from(item: MediaItem) -> Self {
        Self::Item(Box::new(item))
    }
}

/// Queue position: an index or a queue item id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueueIndex {
    Index(u32),
    ItemId(String),
}

// ── Playback ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayMediaRequest {
    pub media: Vec<MediaRef>,
    /// Target queue; the server picks the active one when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<QueueOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_item: Option<MediaRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePlayerGroupRequest {
    pub group_type: String,
    pub name: String,
    pub members: Vec<String>,
    pub dynamic: bool,
}

// ── Library ────────────────────────────────────────────────────────

/// Filters for `music/{media}/library_items`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub search_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Vec<MediaType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkPlayedRequest {
    pub media_item: MediaRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fully_played: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_played: Option<u64>,
}

/// Sync all providers and media types unless narrowed down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Vec<MediaType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
}

// ── Configuration ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveProviderConfigRequest {
    pub provider_domain: String,
    pub values: ConfigValues,
    /// Existing instance to update; a new instance is set up when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// Arguments for `config/providers/get_entries` and
/// `config/core/get_entries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntriesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<ConfigValues>,
}

/// Serialize a request into the JSON object sent as command arguments.
pub(crate) fn to_args<T: Serialize>(request: &T) -> Result<massctl_api::Args, serde_json::Error> {
    let value: Value = serde_json::to_value(request)?;
    Ok(massctl_api::Args::new().extend(value))
}
