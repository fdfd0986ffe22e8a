// ── Command API ──
//
// All write operations flow through a unified `Command` enum. Each variant
// maps onto one server command name plus an argument object; a few player
// commands also update the mirror optimistically before the server answers.

pub mod queries;
pub mod requests;

use serde_json::{Map, Value, json};

use massctl_api::Args;

use crate::client::MassClient;
use crate::error::CoreError;
use crate::model::{MediaType, RepeatMode};

pub use requests::{
    ConfigEntriesRequest, CreatePlayerGroupRequest, LibraryQuery, MarkPlayedRequest, MediaRef,
    PlayMediaRequest, QueueIndex, SaveProviderConfigRequest, SearchRequest, SyncRequest,
};

/// Seconds skipped by [`MassClient::queue_skip_ahead`] and
/// [`MassClient::queue_skip_back`].
pub const SKIP_SECONDS: i64 = 10;

/// All write operations against a server.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Player operations ────────────────────────────────────────────
    Play {
        player_id: String,
    },
    Pause {
        player_id: String,
    },
    PlayPause {
        player_id: String,
    },
    Stop {
        player_id: String,
    },
    Next {
        player_id: String,
    },
    Previous {
        player_id: String,
    },
    Seek {
        player_id: String,
        position: u64,
    },
    Power {
        player_id: String,
        powered: bool,
    },
    /// Levels outside 0..=100 are clamped.
    VolumeSet {
        player_id: String,
        volume_level: i64,
    },
    VolumeUp {
        player_id: String,
    },
    VolumeDown {
        player_id: String,
    },
    VolumeMute {
        player_id: String,
        muted: bool,
    },
    SelectSource {
        player_id: String,
        source: String,
    },

    // ── Grouping ─────────────────────────────────────────────────────
    Group {
        player_id: String,
        target_player: String,
    },
    Ungroup {
        player_id: String,
    },
    GroupMany {
        target_player: String,
        child_player_ids: Vec<String>,
    },
    UngroupMany {
        player_ids: Vec<String>,
    },
    /// Levels outside 0..=100 are clamped.
    GroupVolume {
        player_id: String,
        volume_level: i64,
    },
    GroupVolumeUp {
        player_id: String,
    },
    GroupVolumeDown {
        player_id: String,
    },
    CreatePlayerGroup(CreatePlayerGroupRequest),

    // ── Builtin (client-hosted) players ──────────────────────────────
    RegisterBuiltinPlayer {
        player_name: String,
        player_id: Option<String>,
    },
    UnregisterBuiltinPlayer {
        player_id: String,
    },
    UpdateBuiltinPlayerState {
        player_id: String,
        state: Value,
    },

    // ── Queue operations ─────────────────────────────────────────────
    PlayMedia(PlayMediaRequest),
    QueueClear {
        queue_id: String,
    },
    QueuePlayIndex {
        queue_id: String,
        index: QueueIndex,
    },
    /// Positive shifts move down, negative up, zero makes the item next.
    QueueMoveItem {
        queue_id: String,
        queue_item_id: String,
        pos_shift: i32,
    },
    QueueDeleteItem {
        queue_id: String,
        item_id_or_index: QueueIndex,
    },
    QueueSeek {
        queue_id: String,
        position: u64,
    },
    /// Negative values skip back.
    QueueSkip {
        queue_id: String,
        seconds: i64,
    },
    QueueShuffle {
        queue_id: String,
        shuffle_enabled: bool,
    },
    QueueRepeat {
        queue_id: String,
        repeat_mode: RepeatMode,
    },
    QueueDontStopTheMusic {
        queue_id: String,
        dont_stop_the_music_enabled: bool,
    },
    QueueTransfer {
        source_queue_id: String,
        target_queue_id: String,
        auto_play: Option<bool>,
    },

    // ── Library operations ───────────────────────────────────────────
    AddToLibrary {
        item: MediaRef,
        overwrite_existing: bool,
    },
    RemoveFromLibrary {
        media_type: MediaType,
        library_item_id: String,
    },
    AddToFavorites {
        item: MediaRef,
    },
    RemoveFromFavorites {
        media_type: MediaType,
        library_item_id: String,
    },
    CreatePlaylist {
        name: String,
        provider_instance_or_domain: Option<String>,
    },
    AddPlaylistTracks {
        db_playlist_id: String,
        uris: Vec<String>,
    },
    RemovePlaylistTracks {
        db_playlist_id: String,
        positions_to_remove: Vec<u32>,
    },
    MarkPlayed(MarkPlayedRequest),
    MarkUnplayed {
        media_item: MediaRef,
    },
    RefreshItem {
        media_item: MediaRef,
    },
    UpdateMetadata {
        item: MediaRef,
        force_refresh: bool,
    },
    StartSync(SyncRequest),

    // ── Configuration ────────────────────────────────────────────────
    SaveProviderConfig(SaveProviderConfigRequest),
    RemoveProviderConfig {
        instance_id: String,
    },
    ReloadProvider {
        instance_id: String,
    },
    SavePlayerConfig {
        player_id: String,
        values: crate::model::ConfigValues,
    },
    RemovePlayerConfig {
        player_id: String,
    },
    SaveDspConfig {
        player_id: String,
        config: Value,
    },
    SaveCoreConfig {
        domain: String,
        values: crate::model::ConfigValues,
    },
    ReloadCoreController {
        domain: String,
    },
}

impl Command {
    /// Server command name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play { .. } => "players/cmd/play",
            Self::Pause { .. } => "players/cmd/pause",
            Self::PlayPause { .. } => "players/cmd/play_pause",
            Self::Stop { .. } => "players/cmd/stop",
            Self::Next { .. } => "players/cmd/next",
            Self::Previous { .. } => "players/cmd/previous",
            Self::Seek { .. } => "players/cmd/seek",
            Self::Power { .. } => "players/cmd/power",
            Self::VolumeSet { .. } => "players/cmd/volume_set",
            Self::VolumeUp { .. } => "players/cmd/volume_up",
            Self::VolumeDown { .. } => "players/cmd/volume_down",
            Self::VolumeMute { .. } => "players/cmd/volume_mute",
            Self::SelectSource { .. } => "players/cmd/select_source",
            Self::Group { .. } => "players/cmd/group",
            Self::Ungroup { .. } => "players/cmd/ungroup",
            Self::GroupMany { .. } => "players/cmd/group_many",
            Self::UngroupMany { .. } => "players/cmd/ungroup_many",
            Self::GroupVolume { .. } => "players/cmd/group_volume",
            Self::GroupVolumeUp { .. } => "players/cmd/group_volume_up",
            Self::GroupVolumeDown { .. } => "players/cmd/group_volume_down",
            Self::CreatePlayerGroup(_) => "player_group/create",
            Self::RegisterBuiltinPlayer { .. } => "builtin_player/register",
            Self::UnregisterBuiltinPlayer { .. } => "builtin_player/unregister",
            Self::UpdateBuiltinPlayerState { .. } => "builtin_player/update_state",
            Self::PlayMedia(_) => "player_queues/play_media",
            Self::QueueClear { .. } => "player_queues/clear",
            Self::QueuePlayIndex { .. } => "player_queues/play_index",
            Self::QueueMoveItem { .. } => "player_queues/move_item",
            Self::QueueDeleteItem { .. } => "player_queues/delete_item",
            Self::QueueSeek { .. } => "player_queues/seek",
            Self::QueueSkip { .. } => "player_queues/skip",
            Self::QueueShuffle { .. } => "player_queues/shuffle",
            Self::QueueRepeat { .. } => "player_queues/repeat",
            Self::QueueDontStopTheMusic { .. } => "player_queues/dont_stop_the_music",
            Self::QueueTransfer { .. } => "player_queues/transfer",
            Self::AddToLibrary { .. } => "music/library/add_item",
            Self::RemoveFromLibrary { .. } => "music/library/remove_item",
            Self::AddToFavorites { .. } => "music/favorites/add_item",
            Self::RemoveFromFavorites { .. } => "music/favorites/remove_item",
            Self::CreatePlaylist { .. } => "music/playlists/create_playlist",
            Self::AddPlaylistTracks { .. } => "music/playlists/add_playlist_tracks",
            Self::RemovePlaylistTracks { .. } => "music/playlists/remove_playlist_tracks",
            Self::MarkPlayed(_) => "music/mark_played",
            Self::MarkUnplayed { .. } => "music/mark_unplayed",
            Self::RefreshItem { .. } => "music/refresh_item",
            Self::UpdateMetadata { .. } => "metadata/update_metadata",
            Self::StartSync(_) => "music/sync",
            Self::SaveProviderConfig(_) => "config/providers/save",
            Self::RemoveProviderConfig { .. } => "config/providers/remove",
            Self::ReloadProvider { .. } => "config/providers/reload",
            Self::SavePlayerConfig { .. } => "config/players/save",
            Self::RemovePlayerConfig { .. } => "config/players/remove",
            Self::SaveDspConfig { .. } => "config/players/dsp/save",
            Self::SaveCoreConfig { .. } => "config/core/save",
            Self::ReloadCoreController { .. } => "config/core/reload",
        }
    }

    /// Argument object sent with the command.
    pub fn args(&self) -> Result<Args, CoreError> {
        let encode = |e: serde_json::Error| CoreError::Internal(e.to_string());
        let args = match self {
            Self::Play { player_id }
            | Self::Pause { player_id }
            | Self::PlayPause { player_id }
            | Self::Stop { player_id }
            | Self::Next { player_id }
            | Self::Previous { player_id }
            | Self::VolumeUp { player_id }
            | Self::VolumeDown { player_id }
            | Self::Ungroup { player_id }
            | Self::GroupVolumeUp { player_id }
            | Self::GroupVolumeDown { player_id }
            | Self::UnregisterBuiltinPlayer { player_id }
            | Self::RemovePlayerConfig { player_id } => Args::new().arg("player_id", player_id.as_str()),
            Self::Seek { player_id, position } => Args::new()
                .arg("player_id", player_id.as_str())
                .arg("position", *position),
            Self::Power { player_id, powered } => Args::new()
                .arg("player_id", player_id.as_str())
                .arg("powered", *powered),
            Self::VolumeSet {
                player_id,
                volume_level,
            }
            | Self::GroupVolume {
                player_id,
                volume_level,
            } => Args::new()
                .arg("player_id", player_id.as_str())
                .arg("volume_level", clamp_volume(*volume_level)),
            Self::VolumeMute { player_id, muted } => Args::new()
                .arg("player_id", player_id.as_str())
                .arg("muted", *muted),
            Self::SelectSource { player_id, source } => Args::new()
                .arg("player_id", player_id.as_str())
                .arg("source", source.as_str()),
            Self::Group {
                player_id,
                target_player,
            } => Args::new()
                .arg("player_id", player_id.as_str())
                .arg("target_player", target_player.as_str()),
            Self::GroupMany {
                target_player,
                child_player_ids,
            } => Args::new()
                .arg("target_player", target_player.as_str())
                .arg("child_player_ids", child_player_ids.clone()),
            Self::UngroupMany { player_ids } => Args::new().arg("player_ids", player_ids.clone()),
            Self::CreatePlayerGroup(req) => requests::to_args(req).map_err(encode)?,
            Self::RegisterBuiltinPlayer {
                player_name,
                player_id,
            } => Args::new()
                .arg("player_name", player_name.as_str())
                .opt("player_id", player_id.as_deref()),
            Self::UpdateBuiltinPlayerState { player_id, state } => Args::new()
                .arg("player_id", player_id.as_str())
                .arg("state", state.clone()),

            Self::PlayMedia(req) => requests::to_args(req).map_err(encode)?,
            Self::QueueClear { queue_id } => Args::new().arg("queue_id", queue_id.as_str()),
            Self::QueuePlayIndex { queue_id, index } => Args::new()
                .arg("queue_id", queue_id.as_str())
                .arg("index", serde_json::to_value(index).map_err(encode)?),
            Self::QueueMoveItem {
                queue_id,
                queue_item_id,
                pos_shift,
            } => Args::new()
                .arg("queue_id", queue_id.as_str())
                .arg("queue_item_id", queue_item_id.as_str())
                .arg("pos_shift", *pos_shift),
            Self::QueueDeleteItem {
                queue_id,
                item_id_or_index,
            } => Args::new().arg("queue_id", queue_id.as_str()).arg(
                "item_id_or_index",
                serde_json::to_value(item_id_or_index).map_err(encode)?,
            ),
            Self::QueueSeek { queue_id, position } => Args::new()
                .arg("queue_id", queue_id.as_str())
                .arg("position", *position),
            Self::QueueSkip { queue_id, seconds } => Args::new()
                .arg("queue_id", queue_id.as_str())
                .arg("seconds", *seconds),
            Self::QueueShuffle {
                queue_id,
                shuffle_enabled,
            } => Args::new()
                .arg("queue_id", queue_id.as_str())
                .arg("shuffle_enabled", *shuffle_enabled),
            Self::QueueRepeat {
                queue_id,
                repeat_mode,
            } => Args::new()
                .arg("queue_id", queue_id.as_str())
                .arg("repeat_mode", repeat_mode.to_string()),
            Self::QueueDontStopTheMusic {
                queue_id,
                dont_stop_the_music_enabled,
            } => Args::new()
                .arg("queue_id", queue_id.as_str())
                .arg("dont_stop_the_music_enabled", *dont_stop_the_music_enabled),
            Self::QueueTransfer {
                source_queue_id,
                target_queue_id,
                auto_play,
            } => Args::new()
                .arg("source_queue_id", source_queue_id.as_str())
                .arg("target_queue_id", target_queue_id.as_str())
                .opt("auto_play", *auto_play),

            Self::AddToLibrary {
                item,
                overwrite_existing,
            } => Args::new()
                .arg("item", media_value(item)?)
                .arg("overwrite_existing", *overwrite_existing),
            Self::RemoveFromLibrary {
                media_type,
                library_item_id,
            }
            | Self::RemoveFromFavorites {
                media_type,
                library_item_id,
            } => Args::new()
                .arg("media_type", media_type.to_string())
                .arg("library_item_id", library_item_id.as_str()),
            Self::AddToFavorites { item } => Args::new().arg("item", media_value(item)?),
            Self::CreatePlaylist {
                name,
                provider_instance_or_domain,
            } => Args::new()
                .arg("name", name.as_str())
                .opt("provider_instance_or_domain", provider_instance_or_domain.as_deref()),
            Self::AddPlaylistTracks {
                db_playlist_id,
                uris,
            } => Args::new()
                .arg("db_playlist_id", db_playlist_id.as_str())
                .arg("uris", uris.clone()),
            Self::RemovePlaylistTracks {
                db_playlist_id,
                positions_to_remove,
            } => Args::new()
                .arg("db_playlist_id", db_playlist_id.as_str())
                .arg("positions_to_remove", positions_to_remove.clone()),
            Self::MarkPlayed(req) => requests::to_args(req).map_err(encode)?,
            Self::MarkUnplayed { media_item } | Self::RefreshItem { media_item } => {
                Args::new().arg("media_item", media_value(media_item)?)
            }
            Self::UpdateMetadata {
                item,
                force_refresh,
            } => Args::new()
                .arg("item", media_value(item)?)
                .arg("force_refresh", *force_refresh),
            Self::StartSync(req) => requests::to_args(req).map_err(encode)?,

            Self::SaveProviderConfig(req) => requests::to_args(req).map_err(encode)?,
            Self::RemoveProviderConfig { instance_id } | Self::ReloadProvider { instance_id } => {
                Args::new().arg("instance_id", instance_id.as_str())
            }
            Self::SavePlayerConfig { player_id, values } => Args::new()
                .arg("player_id", player_id.as_str())
                .arg("values", serde_json::to_value(values).map_err(encode)?),
            Self::SaveDspConfig { player_id, config } => Args::new()
                .arg("player_id", player_id.as_str())
                .arg("config", config.clone()),
            Self::SaveCoreConfig { domain, values } => Args::new()
                .arg("domain", domain.as_str())
                .arg("values", serde_json::to_value(values).map_err(encode)?),
            Self::ReloadCoreController { domain } => Args::new().arg("domain", domain.as_str()),
        };
        Ok(args)
    }

    /// Player fields to set locally before the command settles.
    ///
    /// Applied even when the command later fails; the next player event
    /// corrects the mirror.
    pub fn optimistic_update(&self) -> Option<(&str, Map<String, Value>)> {
        let (player_id, field, value) = match self {
            Self::VolumeSet {
                player_id,
                volume_level,
            } => (player_id, "volume_level", json!(clamp_volume(*volume_level))),
            Self::VolumeMute { player_id, muted } => (player_id, "volume_muted", json!(muted)),
            Self::GroupVolume {
                player_id,
                volume_level,
            } => (player_id, "group_volume", json!(clamp_volume(*volume_level))),
            _ => return None,
        };
        let mut fields = Map::new();
        fields.insert(field.to_owned(), value);
        Some((player_id.as_str(), fields))
    }
}

fn clamp_volume(level: i64) -> i64 {
    level.clamp(0, 100)
}

fn media_value(media: &MediaRef) -> Result<Value, CoreError> {
    serde_json::to_value(media).map_err(|e| CoreError::Internal(e.to_string()))
}

// ── Execution ────────────────────────────────────────────────────────

impl MassClient {
    /// Execute a command and return its raw result.
    pub async fn execute(&self, cmd: Command) -> Result<Value, CoreError> {
        if !self.is_connected() {
            return Err(CoreError::ConnectionLost);
        }
        let args = cmd.args()?;

        if let Some((player_id, fields)) = cmd.optimistic_update() {
            if !self.inner.mirror.patch_player(player_id, fields) {
                tracing::debug!(player_id, "optimistic update skipped for unknown player");
            }
        }

        self.send_command_raw(cmd.name(), args).await
    }

    /// Send a command without awaiting its result.
    ///
    /// Optimistic updates still apply.
    pub fn execute_detached(&self, cmd: &Command) -> Result<(), CoreError> {
        if !self.is_connected() {
            return Err(CoreError::ConnectionLost);
        }
        let args = cmd.args()?;
        if let Some((player_id, fields)) = cmd.optimistic_update() {
            self.inner.mirror.patch_player(player_id, fields);
        }
        self.fire_command(cmd.name(), args)
    }

    // ── Toggles (read the mirror, then send the opposite) ────────

    pub async fn toggle_power(&self, player_id: &str) -> Result<(), CoreError> {
        let player = self.known_player(player_id)?;
        let powered = !player.powered.unwrap_or(false);
        self.execute(Command::Power {
            player_id: player_id.to_owned(),
            powered,
        })
        .await
        .map(drop)
    }

    pub async fn toggle_mute(&self, player_id: &str) -> Result<(), CoreError> {
        let player = self.known_player(player_id)?;
        let muted = !player.volume_muted.unwrap_or(false);
        self.execute(Command::VolumeMute {
            player_id: player_id.to_owned(),
            muted,
        })
        .await
        .map(drop)
    }

    pub async fn toggle_shuffle(&self, queue_id: &str) -> Result<(), CoreError> {
        let queue = self.known_queue(queue_id)?;
        self.execute(Command::QueueShuffle {
            queue_id: queue_id.to_owned(),
            shuffle_enabled: !queue.shuffle_enabled,
        })
        .await
        .map(drop)
    }

    /// Cycle repeat: off -> one -> all -> off.
    pub async fn toggle_repeat(&self, queue_id: &str) -> Result<RepeatMode, CoreError> {
        let queue = self.known_queue(queue_id)?;
        let repeat_mode = queue.repeat_mode.next();
        self.execute(Command::QueueRepeat {
            queue_id: queue_id.to_owned(),
            repeat_mode,
        })
        .await?;
        Ok(repeat_mode)
    }

    pub async fn toggle_dont_stop_the_music(&self, queue_id: &str) -> Result<(), CoreError> {
        let queue = self.known_queue(queue_id)?;
        self.execute(Command::QueueDontStopTheMusic {
            queue_id: queue_id.to_owned(),
            dont_stop_the_music_enabled: !queue.dont_stop_the_music_enabled,
        })
        .await
        .map(drop)
    }

    // ── Queue helpers ────────────────────────────────────────────

    pub async fn queue_move_up(&self, queue_id: &str, queue_item_id: &str) -> Result<(), CoreError> {
        self.queue_move(queue_id, queue_item_id, -1).await
    }

    pub async fn queue_move_down(&self, queue_id: &str, queue_item_id: &str) -> Result<(), CoreError> {
        self.queue_move(queue_id, queue_item_id, 1).await
    }

    /// Move an item to play right after the current one.
    pub async fn queue_move_next(&self, queue_id: &str, queue_item_id: &str) -> Result<(), CoreError> {
        self.queue_move(queue_id, queue_item_id, 0).await
    }

    pub async fn queue_skip_ahead(&self, queue_id: &str) -> Result<(), CoreError> {
        self.queue_skip(queue_id, SKIP_SECONDS).await
    }

    pub async fn queue_skip_back(&self, queue_id: &str) -> Result<(), CoreError> {
        self.queue_skip(queue_id, -SKIP_SECONDS).await
    }

    async fn queue_move(&self, queue_id: &str, queue_item_id: &str, pos_shift: i32) -> Result<(), CoreError> {
        self.execute(Command::QueueMoveItem {
            queue_id: queue_id.to_owned(),
            queue_item_id: queue_item_id.to_owned(),
            pos_shift,
        })
        .await
        .map(drop)
    }

    async fn queue_skip(&self, queue_id: &str, seconds: i64) -> Result<(), CoreError> {
        self.execute(Command::QueueSkip {
            queue_id: queue_id.to_owned(),
            seconds,
        })
        .await
        .map(drop)
    }

    fn known_player(&self, player_id: &str) -> Result<std::sync::Arc<crate::model::Player>, CoreError> {
        self.player(player_id)
            .ok_or_else(|| CoreError::not_found("player", player_id))
    }

    fn known_queue(&self, queue_id: &str) -> Result<std::sync::Arc<crate::model::PlayerQueue>, CoreError> {
        self.queue(queue_id)
            .ok_or_else(|| CoreError::not_found("queue", queue_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args_json(cmd: &Command) -> Value {
        serde_json::to_value(cmd.args().unwrap()).unwrap()
    }

    #[test]
    fn player_commands_carry_player_id() {
        let cmd = Command::Seek {
            player_id: "kitchen".into(),
            position: 90,
        };
        assert_eq!(cmd.name(), "players/cmd/seek");
        assert_eq!(args_json(&cmd), json!({"player_id": "kitchen", "position": 90}));
    }

    #[test]
    fn volume_is_clamped_on_the_wire_and_locally() {
        let cmd = Command::VolumeSet {
            player_id: "den".into(),
            volume_level: 140,
        };
        assert_eq!(args_json(&cmd), json!({"player_id": "den", "volume_level": 100}));
        let (id, fields) = cmd.optimistic_update().unwrap();
        assert_eq!(id, "den");
        assert_eq!(fields["volume_level"], json!(100));

        let low = Command::GroupVolume {
            player_id: "g".into(),
            volume_level: -5,
        };
        assert_eq!(low.optimistic_update().unwrap().1["group_volume"], json!(0));
    }

    #[test]
    fn only_volume_and_mute_are_optimistic() {
        let mute = Command::VolumeMute {
            player_id: "den".into(),
            muted: true,
        };
        assert_eq!(mute.optimistic_update().unwrap().1["volume_muted"], json!(true));
        assert!(Command::Play { player_id: "den".into() }.optimistic_update().is_none());
        assert!(Command::VolumeUp { player_id: "den".into() }.optimistic_update().is_none());
    }

    #[test]
    fn queue_commands_carry_queue_id() {
        let cmd = Command::QueueMoveItem {
            queue_id: "q".into(),
            queue_item_id: "item-1".into(),
            pos_shift: -1,
        };
        assert_eq!(cmd.name(), "player_queues/move_item");
        assert_eq!(
            args_json(&cmd),
            json!({"queue_id": "q", "queue_item_id": "item-1", "pos_shift": -1})
        );

        let repeat = Command::QueueRepeat {
            queue_id: "q".into(),
            repeat_mode: RepeatMode::One,
        };
        assert_eq!(args_json(&repeat)["repeat_mode"], json!("one"));
    }

    #[test]
    fn transfer_omits_unset_auto_play() {
        let cmd = Command::QueueTransfer {
            source_queue_id: "a".into(),
            target_queue_id: "b".into(),
            auto_play: None,
        };
        assert_eq!(
            args_json(&cmd),
            json!({"source_queue_id": "a", "target_queue_id": "b"})
        );
    }

    #[test]
    fn library_mutations() {
        let cmd = Command::RemoveFromFavorites {
            media_type: MediaType::Track,
            library_item_id: "42".into(),
        };
        assert_eq!(cmd.name(), "music/favorites/remove_item");
        assert_eq!(
            args_json(&cmd),
            json!({"media_type": "track", "library_item_id": "42"})
        );

        let add = Command::AddToLibrary {
            item: "spotify://track/abc".into(),
            overwrite_existing: false,
        };
        assert_eq!(
            args_json(&add),
            json!({"item": "spotify://track/abc", "overwrite_existing": false})
        );
    }

    #[test]
    fn sync_without_filters_sends_no_args() {
        let cmd = Command::StartSync(SyncRequest::default());
        assert_eq!(cmd.name(), "music/sync");
        assert!(cmd.args().unwrap().is_empty());
    }
}
