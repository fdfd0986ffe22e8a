// ── Player domain types ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use super::media::MediaType;

/// Kind of output device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlayerType {
    #[default]
    Player,
    Group,
    StereoPair,
    #[serde(other)]
    Unknown,
}

/// Playback state reported for players and queues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlayerState {
    #[default]
    Idle,
    Paused,
    Playing,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
}

/// Media currently loaded on a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMedia {
    pub uri: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub queue_id: Option<String>,
    #[serde(default)]
    pub queue_item_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PlayerSource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub passive: bool,
    #[serde(default)]
    pub can_play_pause: bool,
    #[serde(default)]
    pub can_seek: bool,
    #[serde(default)]
    pub can_next_previous: bool,
}

/// An output device as mirrored from the server.
///
/// Fields the client does not model are kept in `extra` so nothing the
/// server sends is lost when the mirror re-serializes a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, rename = "type")]
    pub player_type: PlayerType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub device_info: Option<DeviceInfo>,
    #[serde(default)]
    pub supported_features: Vec<String>,
    #[serde(default)]
    pub can_group_with: Vec<String>,

    #[serde(default)]
    pub state: Option<PlayerState>,
    #[serde(default)]
    pub powered: Option<bool>,
    #[serde(default)]
    pub volume_level: Option<u32>,
    #[serde(default)]
    pub volume_muted: Option<bool>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub elapsed_time_last_updated: Option<f64>,
    #[serde(default)]
    pub current_media: Option<PlayerMedia>,

    #[serde(default)]
    pub group_childs: Vec<String>,
    #[serde(default)]
    pub group_volume: Option<u32>,
    #[serde(default)]
    pub active_source: Option<String>,
    #[serde(default)]
    pub source_list: Vec<PlayerSource>,
    #[serde(default)]
    pub active_group: Option<String>,
    #[serde(default)]
    pub synced_to: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    /// Name to show to humans: display name, then name, then id.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.name.as_str()).filter(|s| !s.is_empty()))
            .unwrap_or(&self.player_id)
    }

    pub fn is_playing(&self) -> bool {
        self.state == Some(PlayerState::Playing)
    }

    pub fn supports(&self, feature: &str) -> bool {
        self.supported_features.iter().any(|f| f == feature)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_player_keeps_unknown_fields() {
        let player: Player = serde_json::from_value(json!({
            "player_id": "kitchen",
            "provider": "sonos",
            "type": "player",
            "name": "Kitchen",
            "available": true,
            "state": "playing",
            "volume_level": 35,
            "hide_player_in_ui": ["never"],
            "power_control": "native"
        }))
        .unwrap();

        assert_eq!(player.player_id, "kitchen");
        assert_eq!(player.player_type, PlayerType::Player);
        assert!(player.is_playing());
        assert_eq!(player.volume_level, Some(35));
        assert_eq!(player.extra["power_control"], "native");
    }

    #[test]
    fn unknown_enum_values_fall_back() {
        let player: Player = serde_json::from_value(json!({
            "player_id": "x",
            "type": "sync_group",
            "state": "buffering"
        }))
        .unwrap();
        assert_eq!(player.player_type, PlayerType::Unknown);
        assert_eq!(player.state, Some(PlayerState::Unknown));
    }

    #[test]
    fn label_prefers_display_name() {
        let mut player: Player = serde_json::from_value(json!({"player_id": "id1"})).unwrap();
        assert_eq!(player.label(), "id1");
        player.name = "Den".into();
        assert_eq!(player.label(), "Den");
        player.display_name = Some("Den Speaker".into());
        assert_eq!(player.label(), "Den Speaker");
    }
}
