// ── Client abstraction ──
//
// Full lifecycle management for one server session: transport, greeting,
// bulk refresh, command correlation, event routing and the state mirror.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use massctl_api::{
    Args, CommandMessage, InboundMessage, ServerInfo, TransportEvent, WebSocketSession,
    websocket_url,
};

use crate::config::ClientConfig;
use crate::dispatch::CommandDispatcher;
use crate::error::CoreError;
use crate::model::{
    Event, EventType, Player, PlayerQueue, ProviderInstance, ProviderManifest, SyncTask,
};
use crate::router::{EventRouter, Subscription};
use crate::store::StateMirror;
use crate::stream::EntityStream;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
///
/// A dropped connection goes back to `Disconnected` while backing off, then
/// to `Connecting` when the next attempt starts. Running out of attempts
/// leaves the state at `Disconnected` and raises [`MassClient::failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not started, stopped by [`MassClient::disconnect`], closed and
    /// waiting to retry, or out of reconnection attempts.
    Disconnected,
    /// Socket opening, or open and waiting for the server greeting.
    Connecting,
    /// Greeting received; commands may be sent.
    Connected,
}

// ── MassClient ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ClientInner>`. One client owns one logical
/// session: message ids, pending commands, subscriptions and mirrored state
/// all survive reconnects.
#[derive(Clone)]
pub struct MassClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    config: ClientConfig,
    ws_url: Url,
    pub(crate) mirror: Arc<StateMirror>,
    dispatcher: CommandDispatcher,
    router: Arc<EventRouter>,
    connection_state: watch::Sender<ConnectionState>,
    synced: watch::Sender<bool>,
    failed: watch::Sender<bool>,
    server_info: ArcSwapOption<ServerInfo>,
    last_error: ArcSwapOption<String>,
    session: ArcSwapOption<WebSocketSession>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl MassClient {
    /// Create a client from configuration. Does NOT connect; call
    /// [`connect()`](Self::connect) or [`start()`](Self::start).
    ///
    /// Fails when no WebSocket endpoint can be derived from the URL.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let ws_url = websocket_url(&config.url)?;
        let router = EventRouter::new(config.event_channel_capacity);
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (synced, _) = watch::channel(false);
        let (failed, _) = watch::channel(false);

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                ws_url,
                mirror: Arc::new(StateMirror::new()),
                dispatcher: CommandDispatcher::new(),
                router,
                connection_state,
                synced,
                failed,
                server_info: ArcSwapOption::empty(),
                last_error: ArcSwapOption::empty(),
                session: ArcSwapOption::empty(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The WebSocket endpoint derived from the configured base URL.
    pub fn ws_url(&self) -> &Url {
        &self.inner.ws_url
    }

    /// Access the state mirror.
    pub fn mirror(&self) -> &Arc<StateMirror> {
        &self.inner.mirror
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Open the session and return immediately.
    ///
    /// The socket connects (and reconnects) in the background. Calling this
    /// on a started client is a no-op.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut handles = self.inner.task_handles.lock().await;
        if self.inner.session.load().is_some() {
            return Ok(());
        }

        self.inner.last_error.store(None);
        self.inner.failed.send_replace(false);
        self.inner.connection_state.send_replace(ConnectionState::Connecting);

        let (session, transport_rx) = WebSocketSession::connect(
            self.inner.ws_url.clone(),
            self.inner.config.reconnect.clone(),
            CancellationToken::new(),
        );
        self.inner.session.store(Some(Arc::new(session)));
        debug!(url = %self.inner.ws_url, "session started");

        let client = self.clone();
        handles.push(tokio::spawn(reader_task(client, transport_rx)));
        Ok(())
    }

    /// Open the session and wait until the greeting has arrived and the
    /// first bulk refresh has populated the mirror.
    ///
    /// On failure the session is torn down again.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let mut synced = self.inner.synced.subscribe();
        let mut failed = self.inner.failed.subscribe();
        self.start().await?;

        let wait = async {
            tokio::select! {
                r = synced.wait_for(|s| *s) => r.map(drop).map_err(|_| CoreError::ConnectionLost),
                _ = failed.wait_for(|f| *f) => Err(self.connect_failure()),
            }
        };

        let timeout = self.inner.config.connect_timeout;
        let result = match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) if self.inner.last_error.load().is_some() => Err(self.connect_failure()),
            Err(_) => Err(CoreError::Timeout {
                timeout_secs: timeout.as_secs(),
            }),
        };

        if result.is_err() {
            self.disconnect().await;
        } else {
            info!(url = %self.inner.config.url, "connected");
        }
        result
    }

    /// Close the socket, stop reconnecting and reject pending commands.
    pub async fn disconnect(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if let Some(session) = self.inner.session.swap(None) {
            session.shutdown();
        }
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        self.inner.dispatcher.fail_all(&CoreError::ConnectionLost);
        self.inner.synced.send_replace(false);
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: ClientConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(MassClient) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let client = MassClient::new(config)?;
        client.connect().await?;
        let result = f(client.clone()).await;
        client.disconnect().await;
        result
    }

    /// Fetch players, queues, provider manifests, providers and sync tasks
    /// in that order, seeding the mirror with each collection as soon as its
    /// fetch returns.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        let mirror = &self.inner.mirror;
        mirror.refresh_players(self.send_command("players/all", Args::new()).await?);
        mirror.refresh_queues(self.send_command("player_queues/all", Args::new()).await?);
        mirror.refresh_manifests(self.send_command("providers/manifests", Args::new()).await?);
        mirror.refresh_providers(self.send_command("providers", Args::new()).await?);
        mirror.refresh_sync_tasks(self.send_command("music/synctasks", Args::new()).await?);
        mirror.finish_refresh();

        self.inner.synced.send_replace(true);
        Ok(())
    }

    // ── Command execution ────────────────────────────────────────

    /// Send `command` and decode its result into `T`.
    ///
    /// Fails immediately with [`CoreError::ConnectionLost`] when not
    /// connected. There is no per-command timeout.
    pub async fn send_command<T: DeserializeOwned>(
        &self,
        command: &str,
        args: Args,
    ) -> Result<T, CoreError> {
        let value = self.send_command_raw(command, args).await?;
        serde_json::from_value(value).map_err(|e| CoreError::Deserialization {
            command: command.to_owned(),
            message: e.to_string(),
        })
    }

    /// Send `command` and return its raw JSON result.
    pub async fn send_command_raw(&self, command: &str, args: Args) -> Result<Value, CoreError> {
        let session = self.connected_session()?;
        let message_id = self.inner.dispatcher.next_id();
        let frame = CommandMessage::new(command, message_id, args).to_json()?;

        let reply = self.inner.dispatcher.register(message_id, command);
        if let Err(e) = session.send(frame) {
            self.inner.dispatcher.forget(message_id);
            return Err(e.into());
        }
        debug!(message_id, command, "command sent");

        reply.await.map_err(|_| CoreError::ConnectionLost)?
    }

    /// Send `command` without waiting for (or correlating) its result.
    ///
    /// Any result the server sends back is dropped as unmatched.
    pub fn fire_command(&self, command: &str, args: Args) -> Result<(), CoreError> {
        let session = self.connected_session()?;
        let message_id = self.inner.dispatcher.next_id();
        let frame = CommandMessage::new(command, message_id, args).to_json()?;
        session.send(frame)?;
        debug!(message_id, command, "command fired");
        Ok(())
    }

    /// Ids of commands still awaiting a result, ascending.
    pub fn in_flight(&self) -> Vec<u64> {
        self.inner.dispatcher.in_flight()
    }

    fn connected_session(&self) -> Result<Arc<WebSocketSession>, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::ConnectionLost);
        }
        self.inner.session.load_full().ok_or(CoreError::ConnectionLost)
    }

    fn connect_failure(&self) -> CoreError {
        CoreError::ConnectionFailed {
            url: self.inner.ws_url.to_string(),
            reason: self
                .inner
                .last_error
                .load_full()
                .map_or_else(|| "retries exhausted".to_owned(), |e| String::clone(&e)),
        }
    }

    // ── Events ───────────────────────────────────────────────────

    /// Register `callback` for `event` (or [`EventType::All`]) on
    /// `object_id` (or [`ANY_OBJECT`](crate::model::ANY_OBJECT)).
    pub fn subscribe(
        &self,
        event: EventType,
        object_id: &str,
        callback: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.router.subscribe(event, object_id, callback)
    }

    /// Register one callback for several event classes.
    pub fn subscribe_multi(
        &self,
        events: Vec<EventType>,
        object_id: &str,
        callback: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.router.subscribe_multi(events, object_id, callback)
    }

    /// Subscribe to the event broadcast stream.
    pub fn events(&self) -> broadcast::Receiver<Arc<Event>> {
        self.inner.router.events()
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        *self.inner.connection_state.borrow() == ConnectionState::Connected
    }

    /// Whether the session gave up after running out of reconnection
    /// attempts. Cleared by the next [`start()`](Self::start).
    pub fn failed(&self) -> bool {
        *self.inner.failed.borrow()
    }

    /// Subscribe to the retries-exhausted flag.
    pub fn failure(&self) -> watch::Receiver<bool> {
        self.inner.failed.subscribe()
    }

    /// Whether the bulk refresh for the current connection has completed.
    pub fn is_synced(&self) -> bool {
        *self.inner.synced.borrow()
    }

    /// Resolve once the mirror has been seeded for the current connection.
    pub async fn wait_until_synced(&self) -> Result<(), CoreError> {
        let mut rx = self.inner.synced.subscribe();
        rx.wait_for(|s| *s)
            .await
            .map(drop)
            .map_err(|_| CoreError::ConnectionLost)
    }

    /// Greeting of the current (or last) connection.
    pub fn server_info(&self) -> Option<Arc<ServerInfo>> {
        self.inner.server_info.load_full()
    }

    /// URL of a track preview clip served over HTTP.
    ///
    /// The item id is percent-encoded twice: the server decodes one layer
    /// while routing and one while parsing the query.
    pub fn track_preview_url(&self, provider_instance_id_or_domain: &str, item_id: &str) -> String {
        let once = urlencoding::encode(item_id);
        let twice = urlencoding::encode(&once);
        format!(
            "{}/preview?item_id={twice}&provider={provider_instance_id_or_domain}",
            self.inner.config.base_url()
        )
    }

    // ── Snapshot accessors (delegate to StateMirror) ─────────────

    pub fn players_snapshot(&self) -> Arc<Vec<Arc<Player>>> {
        self.inner.mirror.players_snapshot()
    }

    pub fn queues_snapshot(&self) -> Arc<Vec<Arc<PlayerQueue>>> {
        self.inner.mirror.queues_snapshot()
    }

    pub fn providers_snapshot(&self) -> Arc<Vec<Arc<ProviderInstance>>> {
        self.inner.mirror.providers_snapshot()
    }

    pub fn manifests_snapshot(&self) -> Arc<Vec<Arc<ProviderManifest>>> {
        self.inner.mirror.manifests_snapshot()
    }

    pub fn sync_tasks(&self) -> Arc<Vec<SyncTask>> {
        self.inner.mirror.sync_tasks()
    }

    pub fn player(&self, player_id: &str) -> Option<Arc<Player>> {
        self.inner.mirror.player(player_id)
    }

    pub fn queue(&self, queue_id: &str) -> Option<Arc<PlayerQueue>> {
        self.inner.mirror.queue(queue_id)
    }

    pub fn provider(&self, instance_id_or_domain: &str) -> Option<Arc<ProviderInstance>> {
        self.inner.mirror.provider(instance_id_or_domain)
    }

    pub fn provider_manifest(&self, domain_or_instance_id: &str) -> Option<Arc<ProviderManifest>> {
        self.inner.mirror.provider_manifest(domain_or_instance_id)
    }

    pub fn provider_name(&self, instance_id_or_domain: &str) -> String {
        self.inner.mirror.provider_name(instance_id_or_domain)
    }

    pub fn has_streaming_providers(&self) -> bool {
        self.inner.mirror.has_streaming_providers()
    }

    // ── Stream accessors (delegate to StateMirror) ───────────────

    pub fn players(&self) -> EntityStream<Player> {
        self.inner.mirror.subscribe_players()
    }

    pub fn queues(&self) -> EntityStream<PlayerQueue> {
        self.inner.mirror.subscribe_queues()
    }

    pub fn providers(&self) -> EntityStream<ProviderInstance> {
        self.inner.mirror.subscribe_providers()
    }

    // ── Inbound handling ─────────────────────────────────────────

    fn handle_frame(&self, text: &str) {
        match InboundMessage::parse(text) {
            Ok(InboundMessage::Result(result)) => self.inner.dispatcher.handle_result(result),
            Ok(InboundMessage::Event(msg)) => {
                let event = Event::from(msg);
                if event.event == EventType::QueueTimeUpdated {
                    trace!(object_id = %event.object_id, "queue time updated");
                } else {
                    debug!(event = %event.event, object_id = %event.object_id, "event received");
                }
                self.inner.mirror.apply_event(&event);
                self.inner.router.dispatch(event);
            }
            Ok(InboundMessage::ServerInfo { info, raw }) => self.handle_server_info(info, raw),
            Err(e) => warn!(error = %e, "ignoring unrecognised frame"),
        }
    }

    fn handle_server_info(&self, server_info: ServerInfo, greeting: Value) {
        info!(
            server_version = %server_info.server_version,
            schema_version = server_info.schema_version,
            "server greeting received"
        );
        self.inner.server_info.store(Some(Arc::new(server_info)));
        self.inner.last_error.store(None);
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);

        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.full_refresh().await {
                warn!(error = %e, "bulk refresh failed");
            }
        });

        self.inner
            .router
            .dispatch(Event::new(EventType::Connected, "", greeting));
    }

    fn handle_closed(&self, code: Option<u16>, reason: &str) {
        let was_connected = *self.inner.connection_state.borrow() == ConnectionState::Connected;
        self.inner.synced.send_replace(false);
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);

        // Fragments never continue on a new socket.
        self.inner.dispatcher.clear_partials();
        if self.inner.config.fail_pending_on_disconnect {
            self.inner.dispatcher.fail_all(&CoreError::ConnectionLost);
        }

        if was_connected {
            info!(?code, reason, "connection closed");
        } else {
            debug!(?code, reason, "socket closed before greeting");
        }
        self.inner.router.dispatch(Event::new(
            EventType::Disconnected,
            "",
            json!({ "code": code, "reason": reason }),
        ));
    }

    fn handle_transport_error(&self, reason: String) {
        warn!(error = %reason, "transport error");
        self.inner.last_error.store(Some(Arc::new(reason.clone())));
        self.inner
            .router
            .dispatch(Event::new(EventType::Error, "", Value::String(reason)));
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Drain transport events in socket order. Exits when the session stops.
async fn reader_task(client: MassClient, mut rx: mpsc::UnboundedReceiver<TransportEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            TransportEvent::Dialing => {
                client
                    .inner
                    .connection_state
                    .send_replace(ConnectionState::Connecting);
            }
            TransportEvent::Opened => debug!("socket open, awaiting greeting"),
            TransportEvent::Message(text) => client.handle_frame(&text),
            TransportEvent::Closed { code, reason } => client.handle_closed(code, &reason),
            TransportEvent::Error(reason) => client.handle_transport_error(reason),
            TransportEvent::Retrying { attempt, delay } => {
                debug!(attempt, delay_ms = duration_ms(delay), "reconnecting");
            }
            TransportEvent::Stopped => break,
        }
    }

    // A session still registered here stopped on its own: retries ran out.
    if client.inner.session.swap(None).is_some() {
        warn!("reconnection attempts exhausted");
        client.inner.dispatcher.fail_all(&CoreError::ConnectionLost);
        client.inner.synced.send_replace(false);
        client
            .inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        client.inner.failed.send_replace(true);
        client.inner.router.dispatch(Event::new(
            EventType::Error,
            "",
            Value::String("reconnection attempts exhausted".to_owned()),
        ));
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(url: &str) -> MassClient {
        MassClient::new(ClientConfig::new(url.parse().unwrap())).unwrap()
    }

    #[test]
    fn derives_websocket_endpoint() {
        assert_eq!(client("http://mass.local:8095").ws_url().as_str(), "ws://mass.local:8095/ws");
        assert_eq!(client("https://mass.example/").ws_url().as_str(), "wss://mass.example/ws");
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let result = MassClient::new(ClientConfig::new("ftp://mass.local".parse().unwrap()));
        assert!(matches!(result, Err(CoreError::Config { .. })));
    }

    #[test]
    fn preview_url_double_encodes_item_id() {
        let c = client("http://mass.local:8095/");
        assert_eq!(
            c.track_preview_url("spotify", "a b/c"),
            "http://mass.local:8095/preview?item_id=a%2520b%252Fc&provider=spotify"
        );
    }

    #[tokio::test]
    async fn commands_fail_fast_when_not_connected() {
        let c = client("http://127.0.0.1:1");
        let err = c.send_command_raw("players/all", Args::new()).await.unwrap_err();
        assert!(matches!(err, CoreError::ConnectionLost));
        assert!(matches!(
            c.fire_command("players/cmd/play", Args::new()),
            Err(CoreError::ConnectionLost)
        ));
        assert!(c.in_flight().is_empty());
    }
}
