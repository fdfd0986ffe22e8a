// ── Bulk refresh ──
//
// After every transition to Connected the client fetches the full state of
// every mirrored collection and seeds the mirror with it. Each collection is
// applied as soon as its own fetch returns, so an event received while a
// later fetch is in flight is never overwritten by an older result.

use std::sync::Arc;

use serde_json::Value;

use super::StateMirror;
use crate::model::SyncTask;

impl StateMirror {
    /// Seed players from `players/all`.
    ///
    /// Fetched items replace same-keyed entries; entries absent from the
    /// fetch are kept. Players reporting `available: false` are skipped.
    pub(crate) fn refresh_players(&self, players: Vec<Value>) {
        let mut skipped = 0usize;
        for player in players {
            if player.get("available").and_then(Value::as_bool) != Some(true) {
                skipped += 1;
                continue;
            }
            if let Err(e) = self.players.replace(player) {
                tracing::warn!(error = %e, "Skipping malformed player");
            }
        }
        tracing::debug!(
            players = self.players.len(),
            unavailable_skipped = skipped,
            "Players refreshed"
        );
    }

    /// Seed queues from `player_queues/all`.
    pub(crate) fn refresh_queues(&self, queues: Vec<Value>) {
        apply_each("queue", queues, |v| self.queues.replace(v).map(drop));
    }

    /// Seed provider manifests from `providers/manifests`.
    pub(crate) fn refresh_manifests(&self, manifests: Vec<Value>) {
        apply_each("manifest", manifests, |v| self.manifests.replace(v).map(drop));
    }

    /// Seed provider instances from `providers`.
    pub(crate) fn refresh_providers(&self, providers: Vec<Value>) {
        apply_each("provider", providers, |v| self.providers.replace(v).map(drop));
    }

    /// Replace the sync task list with the decodable entries of
    /// `music/synctasks`.
    pub(crate) fn refresh_sync_tasks(&self, tasks: Vec<Value>) {
        let mut decoded = Vec::with_capacity(tasks.len());
        apply_each("sync_task", tasks, |v| {
            serde_json::from_value::<SyncTask>(v).map(|t| decoded.push(t))
        });
        self.sync_tasks.send_modify(|t| *t = Arc::new(decoded));
    }

    /// Stamp the end of a bulk refresh.
    pub(crate) fn finish_refresh(&self) {
        self.last_full_refresh
            .send_modify(|t| *t = Some(chrono::Utc::now()));

        tracing::info!(
            players = self.players.len(),
            queues = self.queues.len(),
            providers = self.providers.len(),
            manifests = self.manifests.len(),
            sync_tasks = self.sync_tasks.borrow().len(),
            "Mirror refreshed"
        );
    }
}

fn apply_each<E: std::fmt::Display>(
    kind: &str,
    items: Vec<Value>,
    mut apply: impl FnMut(Value) -> Result<(), E>,
) {
    for e in items.into_iter().filter_map(|v| apply(v).err()) {
        tracing::warn!(kind, error = %e, "Skipping malformed entry");
    }
}
