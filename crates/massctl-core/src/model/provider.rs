// ── Provider domain types ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use super::media::MediaType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderType {
    #[default]
    Music,
    Player,
    Metadata,
    Plugin,
    #[serde(other)]
    Unknown,
}

/// A configured, running provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInstance {
    pub instance_id: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default, rename = "type")]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default_name: Option<String>,
    #[serde(default)]
    pub instance_name_postfix: Option<String>,
    #[serde(default)]
    pub lookup_key: Option<String>,
    #[serde(default)]
    pub supported_features: Vec<String>,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub is_streaming_provider: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Static description of a provider domain, whether or not an instance of
/// it is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProviderManifest {
    pub domain: String,
    #[serde(default, rename = "type")]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub codeowners: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub multi_instance: bool,
    #[serde(default)]
    pub builtin: bool,
    #[serde(default)]
    pub allow_disable: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub depends_on: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A running library sync job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncTask {
    pub provider_domain: String,
    pub provider_instance: String,
    #[serde(default)]
    pub media_types: Vec<MediaType>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_instance() {
        let prov: ProviderInstance = serde_json::from_value(json!({
            "type": "music",
            "domain": "spotify",
            "name": "Spotify (alice)",
            "instance_id": "spotify--abc",
            "supported_features": ["search", "browse"],
            "available": true,
            "is_streaming_provider": true
        }))
        .unwrap();
        assert_eq!(prov.provider_type, ProviderType::Music);
        assert_eq!(prov.is_streaming_provider, Some(true));
    }

    #[test]
    fn deserialize_sync_task() {
        let task: SyncTask = serde_json::from_value(json!({
            "provider_domain": "filesystem_local",
            "provider_instance": "filesystem_local--1",
            "media_types": ["track", "album"]
        }))
        .unwrap();
        assert_eq!(task.media_types, vec![MediaType::Track, MediaType::Album]);
    }
}
