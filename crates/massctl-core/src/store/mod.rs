// ── State mirror ──
//
// In-memory copy of the server's entity collections, kept current by push
// events (see `events`) and re-seeded by a bulk refresh after every
// (re)connection (see `refresh`).

mod collection;
mod events;
mod refresh;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::model::{Player, PlayerQueue, ProviderInstance, ProviderManifest, SyncTask};
use crate::stream::EntityStream;

use collection::EntityCollection;

/// Mirrored players, queues, providers, provider manifests and sync tasks.
///
/// All reads are lock-free snapshots. Writes happen on the client's reader
/// task and through optimistic updates issued by commands.
pub struct StateMirror {
    pub(crate) players: EntityCollection<Player>,
    pub(crate) queues: EntityCollection<PlayerQueue>,
    pub(crate) providers: EntityCollection<ProviderInstance>,
    pub(crate) manifests: EntityCollection<ProviderManifest>,
    pub(crate) sync_tasks: watch::Sender<Arc<Vec<SyncTask>>>,
    pub(crate) last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl StateMirror {
    pub fn new() -> Self {
        let (sync_tasks, _) = watch::channel(Arc::new(Vec::new()));
        let (last_full_refresh, _) = watch::channel(None);

        Self {
            players: EntityCollection::new("player_id"),
            queues: EntityCollection::new("queue_id"),
            providers: EntityCollection::new("instance_id"),
            manifests: EntityCollection::new("domain"),
            sync_tasks,
            last_full_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn players_snapshot(&self) -> Arc<Vec<Arc<Player>>> {
        self.players.snapshot()
    }

    pub fn queues_snapshot(&self) -> Arc<Vec<Arc<PlayerQueue>>> {
        self.queues.snapshot()
    }

    pub fn providers_snapshot(&self) -> Arc<Vec<Arc<ProviderInstance>>> {
        self.providers.snapshot()
    }

    pub fn manifests_snapshot(&self) -> Arc<Vec<Arc<ProviderManifest>>> {
        self.manifests.snapshot()
    }

    pub fn sync_tasks(&self) -> Arc<Vec<SyncTask>> {
        self.sync_tasks.borrow().clone()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn player(&self, player_id: &str) -> Option<Arc<Player>> {
        self.players.get(player_id)
    }

    pub fn queue(&self, queue_id: &str) -> Option<Arc<PlayerQueue>> {
        self.queues.get(queue_id)
    }

    /// Raw wire object of a player, including fields the model does not type.
    pub fn player_raw(&self, player_id: &str) -> Option<Map<String, Value>> {
        self.players.raw(player_id)
    }

    /// Provider instance by instance id, else the first instance of that domain.
    pub fn provider(&self, instance_id_or_domain: &str) -> Option<Arc<ProviderInstance>> {
        self.providers
            .get(instance_id_or_domain)
            .or_else(|| self.providers.find(|p| p.domain == instance_id_or_domain))
    }

    /// Manifest by domain, else the manifest of the instance with that id.
    pub fn provider_manifest(&self, domain_or_instance_id: &str) -> Option<Arc<ProviderManifest>> {
        self.manifests.get(domain_or_instance_id).or_else(|| {
            let instance = self.providers.get(domain_or_instance_id)?;
            self.manifests.get(&instance.domain)
        })
    }

    /// Human-readable provider name.
    ///
    /// Instance name for an instance id, manifest name for a domain, and the
    /// input itself when neither is known.
    pub fn provider_name(&self, instance_id_or_domain: &str) -> String {
        if let Some(instance) = self.providers.get(instance_id_or_domain) {
            return instance.name.clone();
        }
        if let Some(manifest) = self.manifests.get(instance_id_or_domain) {
            return manifest.name.clone();
        }
        instance_id_or_domain.to_owned()
    }

    /// Whether any configured provider streams its content.
    pub fn has_streaming_providers(&self) -> bool {
        self.providers
            .find(|p| p.is_streaming_provider == Some(true))
            .is_some()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_players(&self) -> EntityStream<Player> {
        EntityStream::new(self.players.subscribe())
    }

    pub fn subscribe_queues(&self) -> EntityStream<PlayerQueue> {
        EntityStream::new(self.queues.subscribe())
    }

    pub fn subscribe_providers(&self) -> EntityStream<ProviderInstance> {
        EntityStream::new(self.providers.subscribe())
    }

    pub fn subscribe_sync_tasks(&self) -> watch::Receiver<Arc<Vec<SyncTask>>> {
        self.sync_tasks.subscribe()
    }

    // ── Optimistic updates ───────────────────────────────────────────

    /// Shallow-merge `fields` into a known player. Unknown players are left
    /// alone. Returns whether the player was updated.
    pub(crate) fn patch_player(&self, player_id: &str, fields: Map<String, Value>) -> bool {
        match self.players.patch(player_id, fields) {
            Ok(applied) => applied,
            Err(e) => {
                tracing::warn!(player_id, error = %e, "Rejected optimistic player update");
                false
            }
        }
    }

    /// Drop everything, e.g. before switching servers.
    pub fn clear(&self) {
        self.players.clear();
        self.queues.clear();
        self.providers.clear();
        self.manifests.clear();
        self.sync_tasks.send_modify(|t| *t = Arc::new(Vec::new()));
        self.last_full_refresh.send_modify(|t| *t = None);
    }
}

impl Default for StateMirror {
    fn default() -> Self {
        Self::new()
    }
}
