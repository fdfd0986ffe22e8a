// ── Read-only server queries ──
//
// Thin typed wrappers around `send_command`. None of these touch the
// mirror; use the snapshot accessors for mirrored state.

use serde_json::Value;

use massctl_api::Args;

use super::requests::{ConfigEntriesRequest, LibraryQuery, SearchRequest, to_args};
use crate::client::MassClient;
use crate::error::CoreError;
use crate::model::{
    ConfigEntry, CoreConfig, MediaItem, MediaType, Player, PlayerConfig, PlayerQueue,
    ProviderConfig, ProviderType, QueueItem, SearchResults,
};

fn library_segment(media_type: MediaType) -> Result<&'static str, CoreError> {
    media_type
        .library_segment()
        .ok_or_else(|| CoreError::ValidationFailed {
            message: format!("'{media_type}' items are not kept in the library"),
        })
}

/// Noun used by the per-item endpoints (`get_track`, `track_versions`, ...).
fn item_noun(media_type: MediaType) -> Result<&'static str, CoreError> {
    match media_type {
        MediaType::Artist => Ok("artist"),
        MediaType::Album => Ok("album"),
        MediaType::Track => Ok("track"),
        MediaType::Playlist => Ok("playlist"),
        MediaType::Radio => Ok("radio"),
        MediaType::Audiobook => Ok("audiobook"),
        MediaType::Podcast => Ok("podcast"),
        other => Err(CoreError::ValidationFailed {
            message: format!("'{other}' items cannot be fetched by id"),
        }),
    }
}

fn item_args(item_id: &str, provider_instance_id_or_domain: &str) -> Args {
    Args::new()
        .arg("item_id", item_id)
        .arg("provider_instance_id_or_domain", provider_instance_id_or_domain)
}

fn encode(e: serde_json::Error) -> CoreError {
    CoreError::Internal(e.to_string())
}

impl MassClient {
    // ── Players and queues (fresh from the server) ───────────────

    pub async fn fetch_players(&self) -> Result<Vec<Player>, CoreError> {
        self.send_command("players/all", Args::new()).await
    }

    pub async fn fetch_player(&self, player_id: &str) -> Result<Player, CoreError> {
        self.send_command(
            "players/get",
            Args::new()
                .arg("player_id", player_id)
                .arg("raise_unavailable", true),
        )
        .await
    }

    pub async fn fetch_queues(&self) -> Result<Vec<PlayerQueue>, CoreError> {
        self.send_command("player_queues/all", Args::new()).await
    }

    pub async fn fetch_queue(&self, queue_id: &str) -> Result<PlayerQueue, CoreError> {
        self.send_command("player_queues/get", Args::new().arg("queue_id", queue_id))
            .await
    }

    pub async fn queue_items(
        &self,
        queue_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<QueueItem>, CoreError> {
        self.send_command(
            "player_queues/items",
            Args::new()
                .arg("queue_id", queue_id)
                .arg("limit", limit)
                .arg("offset", offset),
        )
        .await
    }

    // ── Library ──────────────────────────────────────────────────

    /// Library listing for one media type (`music/{type}s/library_items`).
    pub async fn library_items(
        &self,
        media_type: MediaType,
        query: &LibraryQuery,
    ) -> Result<Vec<MediaItem>, CoreError> {
        let segment = library_segment(media_type)?;
        let args = to_args(query).map_err(encode)?;
        self.send_command(&format!("music/{segment}/library_items"), args)
            .await
    }

    /// Number of library items of one media type.
    pub async fn library_count(
        &self,
        media_type: MediaType,
        favorite_only: bool,
    ) -> Result<u64, CoreError> {
        let segment = library_segment(media_type)?;
        self.send_command(
            &format!("music/{segment}/count"),
            Args::new().arg("favorite_only", favorite_only),
        )
        .await
    }

    /// One item by id via its type-specific endpoint (`music/tracks/get_track`, ...).
    pub async fn get_media_item(
        &self,
        media_type: MediaType,
        item_id: &str,
        provider_instance_id_or_domain: &str,
    ) -> Result<MediaItem, CoreError> {
        let segment = library_segment(media_type)?;
        let noun = item_noun(media_type)?;
        self.send_command(
            &format!("music/{segment}/get_{noun}"),
            item_args(item_id, provider_instance_id_or_domain),
        )
        .await
    }

    /// Other versions of the same item across providers.
    pub async fn item_versions(
        &self,
        media_type: MediaType,
        item_id: &str,
        provider_instance_id_or_domain: &str,
    ) -> Result<Vec<MediaItem>, CoreError> {
        let segment = library_segment(media_type)?;
        let noun = item_noun(media_type)?;
        self.send_command(
            &format!("music/{segment}/{noun}_versions"),
            item_args(item_id, provider_instance_id_or_domain),
        )
        .await
    }

    pub async fn artist_tracks(
        &self,
        item_id: &str,
        provider_instance_id_or_domain: &str,
        in_library_only: bool,
    ) -> Result<Vec<MediaItem>, CoreError> {
        self.send_command(
            "music/artists/artist_tracks",
            item_args(item_id, provider_instance_id_or_domain)
                .arg("in_library_only", in_library_only),
        )
        .await
    }

    pub async fn artist_albums(
        &self,
        item_id: &str,
        provider_instance_id_or_domain: &str,
        in_library_only: bool,
    ) -> Result<Vec<MediaItem>, CoreError> {
        self.send_command(
            "music/artists/artist_albums",
            item_args(item_id, provider_instance_id_or_domain)
                .arg("in_library_only", in_library_only),
        )
        .await
    }

    pub async fn album_tracks(
        &self,
        item_id: &str,
        provider_instance_id_or_domain: &str,
        in_library_only: bool,
    ) -> Result<Vec<MediaItem>, CoreError> {
        self.send_command(
            "music/albums/album_tracks",
            item_args(item_id, provider_instance_id_or_domain)
                .arg("in_library_only", in_library_only),
        )
        .await
    }

    pub async fn track_albums(
        &self,
        item_id: &str,
        provider_instance_id_or_domain: &str,
        in_library_only: bool,
    ) -> Result<Vec<MediaItem>, CoreError> {
        self.send_command(
            "music/tracks/track_albums",
            item_args(item_id, provider_instance_id_or_domain)
                .arg("in_library_only", in_library_only),
        )
        .await
    }

    /// Tracks of a playlist. Large playlists arrive as partial results and
    /// are returned concatenated.
    pub async fn playlist_tracks(
        &self,
        item_id: &str,
        provider_instance_id_or_domain: &str,
        force_refresh: Option<bool>,
    ) -> Result<Vec<MediaItem>, CoreError> {
        self.send_command(
            "music/playlists/playlist_tracks",
            item_args(item_id, provider_instance_id_or_domain).opt("force_refresh", force_refresh),
        )
        .await
    }

    pub async fn podcast_episodes(
        &self,
        item_id: &str,
        provider_instance_id_or_domain: &str,
    ) -> Result<Vec<MediaItem>, CoreError> {
        self.send_command(
            "music/podcasts/podcast_episodes",
            item_args(item_id, provider_instance_id_or_domain),
        )
        .await
    }

    pub async fn item_by_uri(&self, uri: &str) -> Result<MediaItem, CoreError> {
        self.send_command("music/item_by_uri", Args::new().arg("uri", uri))
            .await
    }

    pub async fn get_item(
        &self,
        media_type: MediaType,
        item_id: &str,
        provider_instance_id_or_domain: &str,
    ) -> Result<MediaItem, CoreError> {
        self.send_command(
            "music/item",
            item_args(item_id, provider_instance_id_or_domain)
                .arg("media_type", media_type.to_string()),
        )
        .await
    }

    /// The library copy of an item, if it is in the library.
    pub async fn get_library_item(
        &self,
        media_type: MediaType,
        item_id: &str,
        provider_instance_id_or_domain: &str,
    ) -> Result<Option<MediaItem>, CoreError> {
        self.send_command(
            "music/get_library_item",
            item_args(item_id, provider_instance_id_or_domain)
                .arg("media_type", media_type.to_string()),
        )
        .await
    }

    // ── Discovery ────────────────────────────────────────────────

    pub async fn browse(&self, path: Option<&str>) -> Result<Vec<MediaItem>, CoreError> {
        self.send_command("music/browse", Args::new().opt("path", path))
            .await
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults, CoreError> {
        self.send_command("music/search", to_args(request).map_err(encode)?)
            .await
    }

    pub async fn recently_played(
        &self,
        limit: u32,
        media_types: Option<&[MediaType]>,
    ) -> Result<Vec<MediaItem>, CoreError> {
        let media_types = media_types
            .map(|types| types.iter().map(ToString::to_string).collect::<Vec<_>>());
        self.send_command(
            "music/recently_played_items",
            Args::new().arg("limit", limit).opt("media_types", media_types),
        )
        .await
    }

    pub async fn in_progress_items(&self, limit: u32) -> Result<Vec<MediaItem>, CoreError> {
        self.send_command("music/in_progress_items", Args::new().arg("limit", limit))
            .await
    }

    /// Recommendation folders; their shape is provider-defined.
    pub async fn recommendations(&self) -> Result<Vec<Value>, CoreError> {
        self.send_command("music/recommendations", Args::new()).await
    }

    // ── Configuration ────────────────────────────────────────────

    pub async fn provider_configs(
        &self,
        provider_type: Option<ProviderType>,
        provider_domain: Option<&str>,
    ) -> Result<Vec<ProviderConfig>, CoreError> {
        self.send_command(
            "config/providers",
            Args::new()
                .opt("provider_type", provider_type.map(|t| t.to_string()))
                .opt("provider_domain", provider_domain),
        )
        .await
    }

    pub async fn provider_config(&self, instance_id: &str) -> Result<ProviderConfig, CoreError> {
        self.send_command(
            "config/providers/get",
            Args::new().arg("instance_id", instance_id),
        )
        .await
    }

    pub async fn provider_config_entries(
        &self,
        provider_domain: &str,
        instance_id: Option<&str>,
        request: &ConfigEntriesRequest,
    ) -> Result<Vec<ConfigEntry>, CoreError> {
        let args = to_args(request)
            .map_err(encode)?
            .arg("provider_domain", provider_domain)
            .opt("instance_id", instance_id);
        self.send_command("config/providers/get_entries", args).await
    }

    pub async fn player_configs(&self, provider: Option<&str>) -> Result<Vec<PlayerConfig>, CoreError> {
        self.send_command("config/players", Args::new().opt("provider", provider))
            .await
    }

    pub async fn player_config(&self, player_id: &str) -> Result<PlayerConfig, CoreError> {
        self.send_command("config/players/get", Args::new().arg("player_id", player_id))
            .await
    }

    pub async fn player_config_value(&self, player_id: &str, key: &str) -> Result<Value, CoreError> {
        self.send_command(
            "config/players/get_value",
            Args::new().arg("player_id", player_id).arg("key", key),
        )
        .await
    }

    /// DSP settings of a player; kept untyped.
    pub async fn dsp_config(&self, player_id: &str) -> Result<Value, CoreError> {
        self.send_command(
            "config/players/dsp/get",
            Args::new().arg("player_id", player_id),
        )
        .await
    }

    pub async fn core_configs(&self) -> Result<Vec<CoreConfig>, CoreError> {
        self.send_command("config/core", Args::new()).await
    }

    pub async fn core_config(&self, domain: &str) -> Result<CoreConfig, CoreError> {
        self.send_command("config/core/get", Args::new().arg("domain", domain))
            .await
    }

    pub async fn core_config_value(&self, domain: &str, key: &str) -> Result<Value, CoreError> {
        self.send_command(
            "config/core/get_value",
            Args::new().arg("domain", domain).arg("key", key),
        )
        .await
    }

    pub async fn core_config_entries(
        &self,
        domain: &str,
        request: &ConfigEntriesRequest,
    ) -> Result<Vec<ConfigEntry>, CoreError> {
        let args = to_args(request).map_err(encode)?.arg("domain", domain);
        self.send_command("config/core/get_entries", args).await
    }
}
