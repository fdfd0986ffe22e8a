// ── Domain model ──
//
// Canonical types for everything the client mirrors or returns. All of them
// deserialize leniently: missing fields take defaults and unknown fields are
// preserved, since the server schema evolves faster than the client.

pub mod config;
pub mod event;
pub mod media;
pub mod player;
pub mod provider;
pub mod queue;

pub use config::{ConfigEntry, ConfigValues, CoreConfig, PlayerConfig, ProviderConfig};
pub use event::{ANY_OBJECT, Event, EventType};
pub use media::{MediaItem, MediaType, SearchResults};
pub use player::{DeviceInfo, Player, PlayerMedia, PlayerSource, PlayerState, PlayerType};
pub use provider::{ProviderInstance, ProviderManifest, ProviderType, SyncTask};
pub use queue::{PlayerQueue, QueueItem, QueueOption, RepeatMode};

pub use massctl_api::ServerInfo;
