// ── Generic reactive entity collection ──
//
// Lock-free concurrent storage keyed by entity id, with push-based change
// notification via `watch` channels. The raw JSON object is the source of
// truth so that partial updates can be shallow-merged; the typed view is
// re-derived on every mutation.

use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::watch;

/// One stored entity: its wire object and the decoded view of it.
struct Record<T> {
    raw: Map<String, Value>,
    typed: Arc<T>,
}

/// Why a mutation was not applied.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ApplyError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("payload is not a JSON array")]
    NotAnArray,
    #[error("payload has no string '{0}' field")]
    MissingKey(&'static str),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

/// A lock-free, reactive collection for a single entity type.
///
/// Every mutation rebuilds the snapshot that subscribers receive. Snapshots
/// are ordered by key so consumers get stable output.
pub(crate) struct EntityCollection<T: DeserializeOwned + Send + Sync + 'static> {
    /// Field of the wire object holding the entity id.
    key_field: &'static str,

    /// Primary storage: id -> entity.
    by_key: DashMap<String, Record<T>>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: DeserializeOwned + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new(key_field: &'static str) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            key_field,
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Id of a wire object, read from the collection's key field.
    pub(crate) fn key_of(&self, value: &Value) -> Result<String, ApplyError> {
        let obj = value.as_object().ok_or(ApplyError::NotAnObject)?;
        obj.get(self.key_field)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(ApplyError::MissingKey(self.key_field))
    }

    /// Insert or wholly replace the entity carried by `value`.
    /// Returns `true` if the key was new.
    pub(crate) fn replace(&self, value: Value) -> Result<bool, ApplyError> {
        let key = self.key_of(&value)?;
        let is_new = self.store(key, value)?;
        self.rebuild_snapshot();
        Ok(is_new)
    }

    /// Shallow-merge `value` into the stored entity with the same id,
    /// inserting it when absent. Top-level fields missing from `value` keep
    /// their previous value. Returns `true` if the key was new.
    pub(crate) fn merge(&self, value: Value) -> Result<bool, ApplyError> {
        let key = self.key_of(&value)?;
        let Value::Object(patch) = value else {
            return Err(ApplyError::NotAnObject);
        };
        let is_new = self.merge_into(&key, patch, true)?;
        self.rebuild_snapshot();
        Ok(is_new.unwrap_or(false))
    }

    /// Shallow-merge `patch` into an existing entity only.
    /// Returns `Ok(false)` (and changes nothing) when `key` is unknown.
    pub(crate) fn patch(&self, key: &str, patch: Map<String, Value>) -> Result<bool, ApplyError> {
        let applied = self.merge_into(key, patch, false)?.is_some();
        if applied {
            self.rebuild_snapshot();
        }
        Ok(applied)
    }

    /// Replace the whole collection with `values`.
    ///
    /// Items that cannot be stored are returned alongside their error;
    /// everything else is kept.
    pub(crate) fn replace_all(&self, values: Vec<Value>) -> Vec<ApplyError> {
        self.by_key.clear();
        let errors = values
            .into_iter()
            .filter_map(|value| {
                let key = match self.key_of(&value) {
                    Ok(k) => k,
                    Err(e) => return Some(e),
                };
                self.store(key, value).err()
            })
            .collect();
        self.rebuild_snapshot();
        errors
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, r)| r.typed);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    /// Look up an entity by id.
    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(&r.typed))
    }

    /// Raw wire object of an entity.
    pub(crate) fn raw(&self, key: &str) -> Option<Map<String, Value>> {
        self.by_key.get(key).map(|r| r.raw.clone())
    }

    /// First entity matching `pred`, in key order.
    pub(crate) fn find(&self, pred: impl Fn(&T) -> bool) -> Option<Arc<T>> {
        self.snapshot().iter().find(|e| pred(e)).cloned()
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn clear(&self) {
        self.by_key.clear();
        self.rebuild_snapshot();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Decode and store without touching the snapshot.
    fn store(&self, key: String, value: Value) -> Result<bool, ApplyError> {
        let Value::Object(raw) = value else {
            return Err(ApplyError::NotAnObject);
        };
        let typed: T = serde_json::from_value(Value::Object(raw.clone()))?;
        Ok(self
            .by_key
            .insert(
                key,
                Record {
                    raw,
                    typed: Arc::new(typed),
                },
            )
            .is_none())
    }

    /// Merge under the entry lock so concurrent merges never lose fields.
    ///
    /// `Ok(None)` means the key was absent and `insert_missing` was false.
    /// A patch that would leave the entity undecodable is rejected whole.
    fn merge_into(
        &self,
        key: &str,
        patch: Map<String, Value>,
        insert_missing: bool,
    ) -> Result<Option<bool>, ApplyError> {
        use dashmap::mapref::entry::Entry;

        match self.by_key.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let mut raw = occupied.get().raw.clone();
                raw.extend(patch);
                let typed: T = serde_json::from_value(Value::Object(raw.clone()))?;
                occupied.insert(Record {
                    raw,
                    typed: Arc::new(typed),
                });
                Ok(Some(false))
            }
            Entry::Vacant(vacant) => {
                if !insert_missing {
                    return Ok(None);
                }
                let typed: T = serde_json::from_value(Value::Object(patch.clone()))?;
                vacant.insert(Record {
                    raw: patch,
                    typed: Arc::new(typed),
                });
                Ok(Some(true))
            }
        }
    }

    /// Collect all values into a key-ordered snapshot and broadcast it.
    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(String, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(&r.value().typed)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let values = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
