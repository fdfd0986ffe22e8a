// In-process stand-in for a server: greets every connection (or waits for
// the test to do it), answers the bulk-refresh commands from canned replies
// and hands everything else to the test.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use massctl_core::{ClientConfig, ConnectionState, Event, EventType, MassClient};

const WAIT: Duration = Duration::from_secs(5);

enum Outbound {
    Text(String),
    Close,
}

pub struct FakeServer {
    /// HTTP base URL the client is configured with.
    pub url: Url,
    commands: mpsc::UnboundedReceiver<Value>,
    outbound: mpsc::UnboundedSender<Outbound>,
    replies: Arc<Mutex<HashMap<String, Value>>>,
    connections: Arc<Mutex<u32>>,
}

/// The greeting every connection gets. `server_name` is not modelled by
/// `ServerInfo`.
pub fn greeting() -> Value {
    json!({
        "server_version": "2.5.0",
        "server_id": "fake",
        "schema_version": 27,
        "min_supported_schema_version": 24,
        "base_url": "http://fake",
        "server_name": "Fake Assistant",
    })
}

impl FakeServer {
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Accept connections but send nothing until [`send_greeting`](Self::send_greeting).
    pub async fn start_holding_greeting() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(hold_greeting: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let url = Url::parse(&format!("http://{addr}")).unwrap();

        let replies: HashMap<String, Value> = [
            "players/all",
            "player_queues/all",
            "providers/manifests",
            "providers",
            "music/synctasks",
        ]
        .into_iter()
        .map(|cmd| (cmd.to_owned(), json!([])))
        .collect();
        let replies = Arc::new(Mutex::new(replies));
        let connections = Arc::new(Mutex::new(0));

        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(serve(
            listener,
            commands_tx,
            outbound_rx,
            Arc::clone(&replies),
            Arc::clone(&connections),
            hold_greeting,
        ));

        Self {
            url,
            commands,
            outbound,
            replies,
            connections,
        }
    }

    /// Answer `command` automatically with `result` from now on.
    pub fn set_reply(&self, command: &str, result: Value) {
        self.replies
            .lock()
            .unwrap()
            .insert(command.to_owned(), result);
    }

    /// Stop answering `command` automatically; it reaches
    /// [`next_command`](Self::next_command) instead.
    pub fn clear_reply(&self, command: &str) {
        self.replies.lock().unwrap().remove(command);
    }

    pub fn connection_count(&self) -> u32 {
        *self.connections.lock().unwrap()
    }

    /// Wait until `n` connections have been accepted.
    pub async fn wait_for_connections(&self, n: u32) {
        tokio::time::timeout(WAIT, async {
            while self.connection_count() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for a connection");
    }

    pub fn send_greeting(&self) {
        self.send(greeting());
    }

    /// Next command frame not answered automatically.
    pub async fn next_command(&mut self) -> Value {
        tokio::time::timeout(WAIT, self.commands.recv())
            .await
            .expect("timed out waiting for a command")
            .expect("server stopped")
    }

    pub fn send(&self, frame: Value) {
        let _ = self.outbound.send(Outbound::Text(frame.to_string()));
    }

    pub fn event(&self, event: &str, object_id: &str, data: Value) {
        self.send(json!({"event": event, "object_id": object_id, "data": data}));
    }

    pub fn reply(&self, message_id: &Value, result: Value) {
        self.send(json!({"message_id": message_id, "result": result}));
    }

    pub fn reply_partial(&self, message_id: &Value, result: Value) {
        self.send(json!({"message_id": message_id, "result": result, "partial": true}));
    }

    pub fn reply_error(&self, message_id: &Value, code: u32, details: &str) {
        self.send(json!({"message_id": message_id, "error_code": code, "details": details}));
    }

    /// Close the current connection. The server keeps accepting new ones.
    pub fn drop_connection(&self) {
        let _ = self.outbound.send(Outbound::Close);
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.url.clone()).with_connect_timeout(WAIT)
    }

    pub async fn connected_client(&self) -> MassClient {
        let client = MassClient::new(self.client_config()).unwrap();
        client.connect().await.unwrap();
        client
    }
}

async fn serve(
    listener: TcpListener,
    commands: mpsc::UnboundedSender<Value>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    replies: Arc<Mutex<HashMap<String, Value>>>,
    connections: Arc<Mutex<u32>>,
    hold_greeting: bool,
) {
    loop {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
            continue;
        };
        *connections.lock().unwrap() += 1;

        if !hold_greeting && ws.send(Message::Text(greeting().to_string().into())).await.is_err() {
            continue;
        }

        loop {
            tokio::select! {
                frame = ws.next() => {
                    let Some(Ok(Message::Text(text))) = frame else { break };
                    let cmd: Value = serde_json::from_str(text.as_str()).unwrap();
                    let name = cmd["command"].as_str().unwrap_or_default().to_owned();
                    let canned = replies.lock().unwrap().get(&name).cloned();
                    match canned {
                        Some(result) => {
                            let reply = json!({"message_id": cmd["message_id"], "result": result});
                            if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            let _ = commands.send(cmd);
                        }
                    }
                }
                out = outbound.recv() => match out {
                    Some(Outbound::Text(text)) => {
                        if ws.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Outbound::Close) => {
                        let _ = ws.close(None).await;
                        break;
                    }
                    None => return,
                },
            }
        }
    }
}

/// Wait for the next broadcast event of `kind`.
pub async fn wait_for_event(rx: &mut broadcast::Receiver<Arc<Event>>, kind: EventType) -> Arc<Event> {
    tokio::time::timeout(WAIT, async {
        loop {
            let event = rx.recv().await.unwrap();
            if event.event == kind {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Wait until the client reports `state`.
pub async fn wait_for_state(rx: &mut watch::Receiver<ConnectionState>, state: ConnectionState) {
    tokio::time::timeout(WAIT, rx.wait_for(|s| *s == state))
        .await
        .expect("timed out waiting for connection state")
        .unwrap();
}
