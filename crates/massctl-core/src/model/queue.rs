// ── Queue domain types ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use super::media::MediaItem;
use super::player::PlayerState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RepeatMode {
    #[default]
    Off,
    One,
    All,
}

impl RepeatMode {
    /// Cycle used by the repeat toggle: off -> one -> all -> off.
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::One,
            Self::One => Self::All,
            Self::All => Self::Off,
        }
    }
}

/// How `play_media` inserts items into a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueueOption {
    Play,
    Replace,
    Next,
    ReplaceNext,
    Add,
}

/// One entry of a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub queue_id: String,
    pub queue_item_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub sort_index: i64,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub media_item: Option<MediaItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A playback queue as mirrored from the server. Shares its id with the
/// player it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerQueue {
    pub queue_id: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub items: u64,
    #[serde(default)]
    pub shuffle_enabled: bool,
    #[serde(default)]
    pub dont_stop_the_music_enabled: bool,
    #[serde(default)]
    pub repeat_mode: RepeatMode,
    #[serde(default)]
    pub current_index: Option<i64>,
    #[serde(default)]
    pub elapsed_time: f64,
    #[serde(default)]
    pub elapsed_time_last_updated: Option<f64>,
    #[serde(default)]
    pub state: PlayerState,
    #[serde(default)]
    pub current_item: Option<QueueItem>,
    #[serde(default)]
    pub next_item: Option<QueueItem>,
    #[serde(default)]
    pub radio_source: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeat_cycle() {
        assert_eq!(RepeatMode::Off.next(), RepeatMode::One);
        assert_eq!(RepeatMode::One.next(), RepeatMode::All);
        assert_eq!(RepeatMode::All.next(), RepeatMode::Off);
    }

    #[test]
    fn repeat_mode_parses_from_cli_text() {
        assert_eq!("all".parse::<RepeatMode>().unwrap(), RepeatMode::All);
        assert_eq!(RepeatMode::One.to_string(), "one");
    }

    #[test]
    fn queue_option_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(QueueOption::ReplaceNext).unwrap(),
            json!("replace_next")
        );
    }

    #[test]
    fn deserialize_minimal_queue() {
        let queue: PlayerQueue = serde_json::from_value(json!({
            "queue_id": "kitchen",
            "items": 12,
            "repeat_mode": "all",
            "state": "paused",
            "elapsed_time": 31.5
        }))
        .unwrap();
        assert_eq!(queue.items, 12);
        assert_eq!(queue.repeat_mode, RepeatMode::All);
        assert_eq!(queue.state, PlayerState::Paused);
        assert!((queue.elapsed_time - 31.5).abs() < f64::EPSILON);
        assert!(queue.current_item.is_none());
    }
}
