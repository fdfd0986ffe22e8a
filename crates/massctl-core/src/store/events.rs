// ── Incremental mirror updates from push events ──

use std::sync::Arc;

use serde_json::{Map, Value};

use super::StateMirror;
use super::collection::ApplyError;
use crate::model::{Event, EventType, SyncTask};

impl StateMirror {
    /// Apply one push event to the mirrored collections.
    ///
    /// Events that do not concern mirrored state are ignored. Malformed
    /// payloads are logged and leave the mirror unchanged.
    pub(crate) fn apply_event(&self, event: &Event) {
        let result = match event.event {
            EventType::PlayerAdded => {
                self.players.replace(keyed(&event.data, "player_id", &event.object_id)).map(drop)
            }
            EventType::PlayerUpdated => {
                self.players.merge(keyed(&event.data, "player_id", &event.object_id)).map(drop)
            }
            EventType::PlayerRemoved => {
                self.players.remove(&event.object_id);
                self.queues.remove(&event.object_id);
                Ok(())
            }
            EventType::QueueAdded => {
                self.queues.replace(keyed(&event.data, "queue_id", &event.object_id)).map(drop)
            }
            EventType::QueueUpdated => {
                self.queues.merge(keyed(&event.data, "queue_id", &event.object_id)).map(drop)
            }
            EventType::QueueTimeUpdated => self.apply_queue_time(event),
            EventType::ProvidersUpdated => self.apply_providers(&event.data),
            EventType::SyncTasksUpdated => self.apply_sync_tasks(&event.data),
            _ => Ok(()),
        };

        if let Err(e) = result {
            tracing::warn!(
                event = %event.event,
                object_id = %event.object_id,
                error = %e,
                "Ignoring malformed event payload"
            );
        }
    }

    fn apply_queue_time(&self, event: &Event) -> Result<(), ApplyError> {
        let mut fields = Map::new();
        fields.insert("elapsed_time".into(), event.data.clone());
        if !self.queues.patch(&event.object_id, fields)? {
            tracing::trace!(queue_id = %event.object_id, "Time update for unknown queue");
        }
        Ok(())
    }

    fn apply_providers(&self, data: &Value) -> Result<(), ApplyError> {
        let Value::Array(items) = data else {
            return Err(ApplyError::NotAnArray);
        };
        for e in self.providers.replace_all(items.clone()) {
            tracing::warn!(error = %e, "Skipping malformed provider");
        }
        Ok(())
    }

    fn apply_sync_tasks(&self, data: &Value) -> Result<(), ApplyError> {
        let tasks: Vec<SyncTask> = serde_json::from_value(data.clone())?;
        self.sync_tasks.send_modify(|t| *t = Arc::new(tasks));
        Ok(())
    }
}

/// Payload with its id field filled from the event's object id when absent.
fn keyed(data: &Value, key_field: &str, object_id: &str) -> Value {
    let mut data = data.clone();
    if let Value::Object(ref mut obj) = data {
        if !obj.contains_key(key_field) && !object_id.is_empty() {
            obj.insert(key_field.to_owned(), Value::String(object_id.to_owned()));
        }
    }
    data
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::RepeatMode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn event(kind: EventType, object_id: &str, data: Value) -> Event {
        Event::new(kind, object_id, data)
    }

    fn seeded() -> StateMirror {
        let mirror = StateMirror::new();
        mirror.apply_event(&event(
            EventType::PlayerAdded,
            "kitchen",
            json!({"player_id": "kitchen", "name": "Kitchen", "volume_level": 20, "powered": true}),
        ));
        mirror.apply_event(&event(
            EventType::QueueAdded,
            "kitchen",
            json!({"queue_id": "kitchen", "items": 3, "repeat_mode": "off", "elapsed_time": 0}),
        ));
        mirror
    }

    #[test]
    fn player_updated_merges_existing() {
        let mirror = seeded();
        mirror.apply_event(&event(
            EventType::PlayerUpdated,
            "kitchen",
            json!({"player_id": "kitchen", "volume_level": 55}),
        ));
        let player = mirror.player("kitchen").unwrap();
        assert_eq!(player.volume_level, Some(55));
        assert_eq!(player.name, "Kitchen");
        assert_eq!(player.powered, Some(true));
    }

    #[test]
    fn player_updated_inserts_unknown() {
        let mirror = seeded();
        mirror.apply_event(&event(
            EventType::PlayerUpdated,
            "den",
            json!({"name": "Den"}),
        ));
        assert_eq!(mirror.player("den").unwrap().name, "Den");
        assert_eq!(mirror.player_count(), 2);
    }

    #[test]
    fn player_added_replaces_wholesale() {
        let mirror = seeded();
        mirror.apply_event(&event(
            EventType::PlayerAdded,
            "kitchen",
            json!({"player_id": "kitchen", "name": "Kitchen 2"}),
        ));
        let player = mirror.player("kitchen").unwrap();
        assert_eq!(player.name, "Kitchen 2");
        assert_eq!(player.volume_level, None);
    }

    #[test]
    fn player_removed_also_removes_queue() {
        let mirror = seeded();
        mirror.apply_event(&event(EventType::PlayerRemoved, "kitchen", Value::Null));
        assert!(mirror.player("kitchen").is_none());
        assert!(mirror.queue("kitchen").is_none());
    }

    #[test]
    fn queue_updated_merges() {
        let mirror = seeded();
        mirror.apply_event(&event(
            EventType::QueueUpdated,
            "kitchen",
            json!({"queue_id": "kitchen", "repeat_mode": "all"}),
        ));
        let queue = mirror.queue("kitchen").unwrap();
        assert_eq!(queue.repeat_mode, RepeatMode::All);
        assert_eq!(queue.items, 3);
    }

    #[test]
    fn queue_time_updates_known_queue_only() {
        let mirror = seeded();
        mirror.apply_event(&event(EventType::QueueTimeUpdated, "kitchen", json!(42.5)));
        let queue = mirror.queue("kitchen").unwrap();
        assert!((queue.elapsed_time - 42.5).abs() < f64::EPSILON);
        assert_eq!(queue.items, 3);

        let before = mirror.queues_snapshot();
        mirror.apply_event(&event(EventType::QueueTimeUpdated, "ghost", json!(10)));
        assert!(mirror.queue("ghost").is_none());
        assert_eq!(*mirror.queues_snapshot(), *before);
    }

    #[test]
    fn providers_updated_replaces_map() {
        let mirror = StateMirror::new();
        mirror.apply_event(&event(
            EventType::ProvidersUpdated,
            "",
            json!([{"instance_id": "a", "domain": "x"}, {"instance_id": "b", "domain": "y"}]),
        ));
        assert_eq!(mirror.providers_snapshot().len(), 2);

        mirror.apply_event(&event(
            EventType::ProvidersUpdated,
            "",
            json!([{"instance_id": "c", "domain": "z"}]),
        ));
        let ids: Vec<_> = mirror
            .providers_snapshot()
            .iter()
            .map(|p| p.instance_id.clone())
            .collect();
        assert_eq!(ids, vec!["c".to_owned()]);
    }

    #[test]
    fn sync_tasks_updated_replaces_list() {
        let mirror = StateMirror::new();
        mirror.apply_event(&event(
            EventType::SyncTasksUpdated,
            "",
            json!([{"provider_domain": "fs", "provider_instance": "fs--1", "media_types": ["track"]}]),
        ));
        assert_eq!(mirror.sync_tasks().len(), 1);
        mirror.apply_event(&event(EventType::SyncTasksUpdated, "", json!([])));
        assert!(mirror.sync_tasks().is_empty());
    }

    #[test]
    fn malformed_payload_leaves_state_alone() {
        let mirror = seeded();
        mirror.apply_event(&event(
            EventType::PlayerUpdated,
            "kitchen",
            json!({"player_id": "kitchen", "volume_level": "very loud"}),
        ));
        assert_eq!(mirror.player("kitchen").unwrap().volume_level, Some(20));

        mirror.apply_event(&event(EventType::ProvidersUpdated, "", json!("nope")));
        mirror.apply_event(&event(EventType::SyncTasksUpdated, "", json!({"a": 1})));
        assert!(mirror.sync_tasks().is_empty());
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let mirror = seeded();
        mirror.apply_event(&event(EventType::MediaItemPlayed, "x", json!({})));
        mirror.apply_event(&event(EventType::Other("custom".into()), "x", json!({})));
        assert_eq!(mirror.player_count(), 1);
    }
}
