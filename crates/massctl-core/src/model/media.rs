// ── Media item domain types ──
//
// Library objects are large and vary per media type; only the fields every
// item shares are typed, the rest is kept verbatim in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MediaType {
    Artist,
    Album,
    Track,
    Playlist,
    Radio,
    Audiobook,
    Podcast,
    PodcastEpisode,
    Folder,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MediaType {
    /// Path segment of the library endpoints (`music/{segment}/...`).
    pub fn library_segment(self) -> Option<&'static str> {
        match self {
            Self::Artist => Some("artists"),
            Self::Album => Some("albums"),
            Self::Track => Some("tracks"),
            Self::Playlist => Some("playlists"),
            Self::Radio => Some("radios"),
            Self::Audiobook => Some("audiobooks"),
            Self::Podcast => Some("podcasts"),
            Self::PodcastEpisode | Self::Folder | Self::Unknown => None,
        }
    }
}

/// A library or provider item (track, album, artist, playlist, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub item_id: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub is_playable: Option<bool>,
    #[serde(default)]
    pub favorite: Option<bool>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Results of `music/search`, one list per media type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub artists: Vec<MediaItem>,
    #[serde(default)]
    pub albums: Vec<MediaItem>,
    #[serde(default)]
    pub tracks: Vec<MediaItem>,
    #[serde(default)]
    pub playlists: Vec<MediaItem>,
    #[serde(default)]
    pub radio: Vec<MediaItem>,
    #[serde(default)]
    pub podcasts: Vec<MediaItem>,
    #[serde(default)]
    pub audiobooks: Vec<MediaItem>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.artists.len()
            + self.albums.len()
            + self.tracks.len()
            + self.playlists.len()
            + self.radio.len()
            + self.podcasts.len()
            + self.audiobooks.len()
    }
}
