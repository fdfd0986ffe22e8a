// ── Command correlation ──
//
// Every outgoing command gets a session-unique id and a pending slot. The
// reader task settles the slot when the matching result arrives; results
// flagged `partial` are buffered until the final fragment shows up.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use tokio::sync::oneshot;

use massctl_api::ResultMessage;

use crate::error::CoreError;

/// Outcome delivered to the caller awaiting a command.
pub(crate) type Reply = Result<Value, CoreError>;

struct PendingCommand {
    command: String,
    reply: oneshot::Sender<Reply>,
}

/// Accumulated fragments of a partial result.
#[derive(Debug)]
enum PartialBuffer {
    Text(String),
    Items(Vec<Value>),
}

impl PartialBuffer {
    fn start(fragment: Value) -> Self {
        match fragment {
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Items(items),
            other => Self::Items(vec![other]),
        }
    }

    /// Append a fragment: strings join, arrays flatten, anything else
    /// becomes one more element.
    fn push(&mut self, fragment: Value) {
        match self {
            Self::Text(acc) => match fragment {
                Value::String(s) => acc.push_str(&s),
                other => {
                    let mut items = vec![Value::String(std::mem::take(acc))];
                    match other {
                        Value::Array(more) => items.extend(more),
                        single => items.push(single),
                    }
                    *self = Self::Items(items);
                }
            },
            Self::Items(acc) => match fragment {
                Value::Array(items) => acc.extend(items),
                other => acc.push(other),
            },
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Text(s) => Value::String(s),
            Self::Items(items) => Value::Array(items),
        }
    }
}

/// Pending-command registry for one client.
///
/// The id counter is never reset, so ids stay unique across reconnects.
pub(crate) struct CommandDispatcher {
    next_id: AtomicU64,
    pending: DashMap<u64, PendingCommand>,
    partials: DashMap<u64, PartialBuffer>,
}

impl CommandDispatcher {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: DashMap::new(),
            partials: DashMap::new(),
        }
    }

    /// Allocate the next message id.
    pub(crate) fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a pending slot for `message_id`.
    pub(crate) fn register(&self, message_id: u64, command: &str) -> oneshot::Receiver<Reply> {
        let (reply, rx) = oneshot::channel();
        self.pending.insert(
            message_id,
            PendingCommand {
                command: command.to_owned(),
                reply,
            },
        );
        rx
    }

    /// Drop a slot whose command never made it onto the wire.
    pub(crate) fn forget(&self, message_id: u64) {
        self.pending.remove(&message_id);
        self.partials.remove(&message_id);
    }

    /// Route an inbound result to its pending slot.
    pub(crate) fn handle_result(&self, msg: ResultMessage) {
        let ResultMessage {
            message_id,
            result,
            partial,
            error_code,
            details,
        } = msg;

        if let Some(code) = &error_code {
            tracing::warn!(message_id, error_code = %code, details = ?details, "Command returned an error");
        }

        if partial {
            match self.partials.entry(message_id) {
                Entry::Occupied(mut buffer) => buffer.get_mut().push(result),
                Entry::Vacant(slot) => {
                    slot.insert(PartialBuffer::start(result));
                }
            }
            return;
        }

        let result = match self.partials.remove(&message_id) {
            Some((_, mut buffer)) => {
                buffer.push(result);
                buffer.into_value()
            }
            None => result,
        };

        let Some((_, pending)) = self.pending.remove(&message_id) else {
            tracing::debug!(message_id, "Dropping result with no pending command");
            return;
        };

        let reply = match error_code {
            Some(code) => Err(CoreError::Command { code, details }),
            None => Ok(result),
        };
        tracing::debug!(message_id, command = %pending.command, ok = reply.is_ok(), "Command settled");

        // The caller may have stopped waiting; nothing to do then.
        let _ = pending.reply.send(reply);
    }

    /// Reject every pending command and discard partial buffers.
    pub(crate) fn fail_all(&self, err: &CoreError) {
        let ids: Vec<u64> = self.pending.iter().map(|r| *r.key()).collect();
        for id in ids {
            if let Some((_, pending)) = self.pending.remove(&id) {
                let _ = pending.reply.send(Err(err.clone()));
            }
        }
        self.partials.clear();
    }

    /// Discard partial buffers, keeping pending slots.
    pub(crate) fn clear_partials(&self) {
        self.partials.clear();
    }

    /// Ids of commands still awaiting a result, ascending.
    pub(crate) fn in_flight(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.pending.iter().map(|r| *r.key()).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn result(id: u64, value: Value, partial: bool) -> ResultMessage {
        ResultMessage {
            message_id: id,
            result: value,
            partial,
            error_code: None,
            details: None,
        }
    }

    #[test]
    fn ids_are_monotonic_and_unique() {
        let d = CommandDispatcher::new();
        let a = d.next_id();
        let b = d.next_id();
        let c = d.next_id();
        assert!(a > 0 && a < b && b < c);
    }

    #[tokio::test]
    async fn out_of_order_results_reach_their_callers() {
        let d = CommandDispatcher::new();
        let ids: Vec<u64> = (0..5).map(|_| d.next_id()).collect();
        let receivers: Vec<_> = ids.iter().map(|id| d.register(*id, "echo")).collect();

        for id in ids.iter().rev() {
            d.handle_result(result(*id, json!(id), false));
        }

        for (id, rx) in ids.iter().zip(receivers) {
            assert_eq!(rx.await.unwrap().unwrap(), json!(id));
        }
        assert!(d.in_flight().is_empty());
    }

    #[tokio::test]
    async fn partial_strings_concatenate() {
        let d = CommandDispatcher::new();
        let id = d.next_id();
        let mut rx = d.register(id, "music/lyrics");

        d.handle_result(result(id, json!("a"), true));
        d.handle_result(result(id, json!("b"), true));
        d.handle_result(result(id, json!("c"), true));
        assert!(rx.try_recv().is_err());

        d.handle_result(result(id, json!("d"), false));
        assert_eq!(rx.await.unwrap().unwrap(), json!("abcd"));
    }

    #[tokio::test]
    async fn partial_arrays_flatten_in_order() {
        let d = CommandDispatcher::new();
        let id = d.next_id();
        let rx = d.register(id, "music/tracks/library_items");

        d.handle_result(result(id, json!([1, 2]), true));
        d.handle_result(result(id, json!([3]), true));
        d.handle_result(result(id, json!([4, 5]), false));
        assert_eq!(rx.await.unwrap().unwrap(), json!([1, 2, 3, 4, 5]));
    }

    #[tokio::test]
    async fn scalar_final_after_array_fragments_is_appended() {
        let d = CommandDispatcher::new();
        let id = d.next_id();
        let rx = d.register(id, "x");

        d.handle_result(result(id, json!([1]), true));
        d.handle_result(result(id, json!({"done": true}), false));
        assert_eq!(rx.await.unwrap().unwrap(), json!([1, {"done": true}]));
    }

    #[tokio::test]
    async fn error_result_rejects_with_code_and_details() {
        let d = CommandDispatcher::new();
        let id = d.next_id();
        let rx = d.register(id, "players/cmd/play");

        d.handle_result(ResultMessage {
            message_id: id,
            result: Value::Null,
            partial: false,
            error_code: Some("999".into()),
            details: Some("Player kitchen is not available".into()),
        });

        let err = rx.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Command { ref code, details: Some(ref d) } if code == "999" && d.contains("kitchen")
        ));
    }

    #[test]
    fn unmatched_result_is_dropped() {
        let d = CommandDispatcher::new();
        d.handle_result(result(42, json!(1), false));
        assert!(d.in_flight().is_empty());
    }

    #[tokio::test]
    async fn fail_all_rejects_everything_pending() {
        let d = CommandDispatcher::new();
        let a = d.next_id();
        let b = d.next_id();
        let rx_a = d.register(a, "one");
        let rx_b = d.register(b, "two");
        d.handle_result(result(b, json!("half"), true));
        assert_eq!(d.in_flight(), vec![a, b]);

        d.fail_all(&CoreError::ConnectionLost);

        assert!(matches!(rx_a.await.unwrap(), Err(CoreError::ConnectionLost)));
        assert!(matches!(rx_b.await.unwrap(), Err(CoreError::ConnectionLost)));
        assert!(d.in_flight().is_empty());
        assert!(d.partials.is_empty());
    }

    #[tokio::test]
    async fn clear_partials_keeps_pending_slots() {
        let d = CommandDispatcher::new();
        let id = d.next_id();
        let rx = d.register(id, "music/lyrics");
        d.handle_result(result(id, json!("stale"), true));

        d.clear_partials();
        assert!(d.partials.is_empty());
        assert_eq!(d.in_flight(), vec![id]);

        d.handle_result(result(id, json!("fresh"), false));
        assert_eq!(rx.await.unwrap().unwrap(), json!("fresh"));
    }

    #[test]
    fn forget_removes_slot() {
        let d = CommandDispatcher::new();
        let id = d.next_id();
        let _rx = d.register(id, "x");
        d.forget(id);
        assert!(d.in_flight().is_empty());
    }
}
