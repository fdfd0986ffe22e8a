// massctl-core: Session client between massctl-api and consumers (CLI, scripts).

pub mod client;
pub mod command;
pub mod config;
pub(crate) mod dispatch;
pub mod error;
pub mod model;
pub mod router;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{ConnectionState, MassClient};
pub use command::Command;
pub use command::requests::*;
pub use config::ClientConfig;
pub use error::CoreError;
pub use router::{EventRouter, Subscription};
pub use store::StateMirror;
pub use stream::EntityStream;

pub use massctl_api::{Args, ReconnectConfig};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Mirrored entities
    Player, PlayerQueue, ProviderInstance, ProviderManifest, SyncTask,
    // Events
    ANY_OBJECT, Event, EventType,
    // Supporting types
    MediaItem, MediaType, PlayerState, PlayerType, ProviderType, QueueItem, QueueOption,
    RepeatMode, SearchResults, ServerInfo,
    // Server-side configuration
    ConfigEntry, ConfigValues, CoreConfig, PlayerConfig, ProviderConfig,
};
