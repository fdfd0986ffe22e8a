// ── Event routing ──
//
// Registry of (event class, object id) subscriptions. Each inbound event is
// delivered synchronously, in registration order, to every matching
// callback, then fanned out on a broadcast channel for async consumers.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use tokio::sync::broadcast;

use crate::model::{ANY_OBJECT, Event, EventType};

/// Callback invoked for each matching event.
pub type EventCallback = Arc<dyn Fn(&Event) + Send + Sync>;

struct Registration {
    id: u64,
    filter: EventType,
    object_id: String,
    callback: EventCallback,
}

impl Registration {
    fn matches(&self, event: &Event) -> bool {
        self.filter.matches(&event.event)
            && (self.object_id == ANY_OBJECT || self.object_id == event.object_id)
    }
}

/// Subscription registry shared by a client and its handles.
pub struct EventRouter {
    registrations: ArcSwap<Vec<Arc<Registration>>>,
    next_id: AtomicU64,
    broadcast: broadcast::Sender<Arc<Event>>,
}

impl EventRouter {
    pub fn new(channel_capacity: usize) -> Arc<Self> {
        let (broadcast, _) = broadcast::channel(channel_capacity.max(1));
        Arc::new(Self {
            registrations: ArcSwap::from_pointee(Vec::new()),
            next_id: AtomicU64::new(1),
            broadcast,
        })
    }

    /// Register `callback` for events of class `filter` (or [`EventType::All`])
    /// concerning `object_id` (or [`ANY_OBJECT`]).
    pub fn subscribe(
        self: &Arc<Self>,
        filter: EventType,
        object_id: &str,
        callback: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe_multi(vec![filter], object_id, callback)
    }

    /// Register one callback for several event classes. The returned handle
    /// removes all of them at once.
    pub fn subscribe_multi(
        self: &Arc<Self>,
        filters: Vec<EventType>,
        object_id: &str,
        callback: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Subscription {
        let callback: EventCallback = Arc::new(callback);
        let new: Vec<Arc<Registration>> = filters
            .into_iter()
            .map(|filter| {
                Arc::new(Registration {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    filter,
                    object_id: object_id.to_owned(),
                    callback: Arc::clone(&callback),
                })
            })
            .collect();
        let ids = new.iter().map(|r| r.id).collect();

        self.registrations.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + new.len());
            next.extend(current.iter().cloned());
            next.extend(new.iter().cloned());
            next
        });

        Subscription {
            router: Arc::downgrade(self),
            ids,
            active: AtomicBool::new(true),
        }
    }

    /// Deliver `event` to every matching registration, then to broadcast
    /// receivers.
    ///
    /// A callback that panics is logged and skipped; the rest still run.
    /// Callbacks may subscribe or unsubscribe while being dispatched; such
    /// changes take effect from the next event.
    pub fn dispatch(&self, event: Event) {
        let registrations = self.registrations.load_full();
        for registration in registrations.iter().filter(|r| r.matches(&event)) {
            let callback = &registration.callback;
            if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                tracing::warn!(
                    event = %event.event,
                    object_id = %event.object_id,
                    subscription = registration.id,
                    "Event callback panicked"
                );
            }
        }

        // No receivers is fine.
        let _ = self.broadcast.send(Arc::new(event));
    }

    /// Receive every event asynchronously. Slow receivers observe
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn events(&self) -> broadcast::Receiver<Arc<Event>> {
        self.broadcast.subscribe()
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.registrations.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, ids: &[u64]) {
        self.registrations.rcu(|current| {
            current
                .iter()
                .filter(|r| !ids.contains(&r.id))
                .cloned()
                .collect::<Vec<_>>()
        });
    }
}

/// Handle returned by [`EventRouter::subscribe`].
///
/// Dropping the handle keeps the subscription alive; call
/// [`unsubscribe`](Self::unsubscribe) to end it.
pub struct Subscription {
    router: Weak<EventRouter>,
    ids: Vec<u64>,
    active: AtomicBool,
}

impl Subscription {
    /// Remove the registration(s). Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(router) = self.router.upgrade() {
            router.remove(&self.ids);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("ids", &self.ids)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn evt(kind: EventType, object_id: &str) -> Event {
        Event::new(kind, object_id, Value::Null)
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&Event) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        let make = move |tag: &str| -> Box<dyn Fn(&Event) + Send + Sync> {
            let log = Arc::clone(&log2);
            let tag = tag.to_owned();
            Box::new(move |e: &Event| {
                log.lock().unwrap().push(format!("{tag}:{}:{}", e.event, e.object_id));
            })
        };
        (log, make)
    }

    #[test]
    fn all_filter_and_specific_class() {
        let router = EventRouter::new(16);
        let (log, make) = recorder();
        let _all = router.subscribe(EventType::All, ANY_OBJECT, make("all"));
        let _upd = router.subscribe(EventType::PlayerUpdated, ANY_OBJECT, make("upd"));

        router.dispatch(evt(EventType::PlayerUpdated, "p1"));
        router.dispatch(evt(EventType::QueueAdded, "q1"));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "all:player_updated:p1".to_owned(),
                "upd:player_updated:p1".to_owned(),
                "all:queue_added:q1".to_owned(),
            ]
        );
    }

    #[test]
    fn object_filter_restricts_delivery() {
        let router = EventRouter::new(16);
        let (log, make) = recorder();
        let _s = router.subscribe(EventType::QueueUpdated, "kitchen", make("k"));

        router.dispatch(evt(EventType::QueueUpdated, "den"));
        router.dispatch(evt(EventType::QueueUpdated, "kitchen"));

        assert_eq!(*log.lock().unwrap(), vec!["k:queue_updated:kitchen".to_owned()]);
    }

    #[test]
    fn unsubscribe_is_idempotent_and_exact() {
        let router = EventRouter::new(16);
        let (log, make) = recorder();
        let a = router.subscribe(EventType::All, ANY_OBJECT, make("a"));
        let _b = router.subscribe(EventType::All, ANY_OBJECT, make("b"));

        a.unsubscribe();
        a.unsubscribe();
        assert!(!a.is_active());
        assert_eq!(router.len(), 1);

        router.dispatch(evt(EventType::Connected, ""));
        assert_eq!(*log.lock().unwrap(), vec!["b:connected:".to_owned()]);
    }

    #[test]
    fn panicking_callback_does_not_stop_others() {
        let router = EventRouter::new(16);
        let (log, make) = recorder();
        let _p = router.subscribe(EventType::All, ANY_OBJECT, |_e: &Event| panic!("boom"));
        let _ok = router.subscribe(EventType::All, ANY_OBJECT, make("ok"));

        router.dispatch(evt(EventType::Error, ""));
        assert_eq!(*log.lock().unwrap(), vec!["ok:error:".to_owned()]);
    }

    #[test]
    fn subscribe_multi_removes_all_at_once() {
        let router = EventRouter::new(16);
        let (log, make) = recorder();
        let sub = router.subscribe_multi(
            vec![EventType::PlayerAdded, EventType::PlayerRemoved],
            ANY_OBJECT,
            make("m"),
        );
        assert_eq!(router.len(), 2);

        router.dispatch(evt(EventType::PlayerAdded, "x"));
        router.dispatch(evt(EventType::PlayerRemoved, "x"));
        router.dispatch(evt(EventType::PlayerUpdated, "x"));
        assert_eq!(log.lock().unwrap().len(), 2);

        sub.unsubscribe();
        assert!(router.is_empty());
    }

    #[test]
    fn callbacks_may_unsubscribe_during_dispatch() {
        let router = EventRouter::new(16);
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot2 = Arc::clone(&slot);
        let sub = router.subscribe(EventType::All, ANY_OBJECT, move |_e: &Event| {
            if let Some(s) = slot2.lock().unwrap().as_ref() {
                s.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(sub);

        router.dispatch(evt(EventType::Connected, ""));
        assert!(router.is_empty());
    }

    #[tokio::test]
    async fn broadcast_receivers_get_every_event() {
        let router = EventRouter::new(16);
        let mut rx = router.events();
        router.dispatch(evt(EventType::Disconnected, ""));
        let got = rx.recv().await.unwrap();
        assert_eq!(got.event, EventType::Disconnected);
    }
}
