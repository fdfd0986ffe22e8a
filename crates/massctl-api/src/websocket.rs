//! WebSocket session with auto-reconnect.
//!
//! Owns the single persistent socket to the server. Inbound text frames and
//! lifecycle changes are delivered in order as [`TransportEvent`]s through an
//! unbounded `mpsc` channel; outbound frames go through [`WebSocketSession::send`],
//! which fails fast while no socket is open. Reconnection uses a linear backoff.
//!
//! # Example
//!
//! ```rust,ignore
//! use massctl_api::websocket::{websocket_url, ReconnectConfig, TransportEvent, WebSocketSession};
//! use tokio_util::sync::CancellationToken;
//!
//! let url = websocket_url(&"http://mass.local:8095/".parse()?)?;
//! let (session, mut events) = WebSocketSession::connect(url, ReconnectConfig::default(), CancellationToken::new());
//!
//! while let Some(event) = events.recv().await {
//!     if let TransportEvent::Message(text) = event {
//!         println!("{text}");
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── URL derivation ───────────────────────────────────────────────────

/// Derive the WebSocket endpoint from the server's base address.
///
/// A trailing `/` is dropped, `http` becomes `ws` (`https` becomes `wss`)
/// and `/ws` is appended: `http://host:8095/` -> `ws://host:8095/ws`.
pub fn websocket_url(base: &Url) -> Result<Url, Error> {
    let trimmed = base.as_str().trim_end_matches('/');
    let rest = match base.scheme() {
        "http" | "ws" => trimmed.split_once("://").map(|(_, r)| format!("ws://{r}")),
        "https" | "wss" => trimmed.split_once("://").map(|(_, r)| format!("wss://{r}")),
        other => return Err(Error::UnsupportedScheme(other.to_owned())),
    };
    let rest = rest.ok_or_else(|| Error::UnsupportedScheme(base.scheme().to_owned()))?;
    Ok(Url::parse(&format!("{rest}/ws"))?)
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Linear backoff configuration for WebSocket reconnection.
///
/// `delay(n) = min(initial_delay + n * step, max_delay)` where `n` counts
/// failed attempts since the last successful open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 0.
    pub initial_delay: Duration,

    /// Amount added per failed attempt. Default: 1s.
    pub step: Duration,

    /// Upper bound on backoff delay. Default: 2s.
    pub max_delay: Duration,

    /// Maximum consecutive reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            step: Duration::from_secs(1),
            max_delay: Duration::from_secs(2),
            max_retries: None,
        }
    }
}

impl ReconnectConfig {
    /// Backoff before reconnection attempt number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.step
            .checked_mul(attempt)
            .and_then(|grown| self.initial_delay.checked_add(grown))
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

// ── TransportEvent ───────────────────────────────────────────────────

/// Lifecycle changes and inbound data, delivered in socket order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A connection attempt is starting.
    Dialing,
    /// The socket is open and [`WebSocketSession::send`] now succeeds.
    Opened,
    /// An inbound text frame.
    Message(String),
    /// The socket closed (or never opened). Sending fails from here on.
    Closed { code: Option<u16>, reason: String },
    /// A transport error; always followed by [`TransportEvent::Closed`].
    Error(String),
    /// A reconnection attempt is scheduled after `delay`.
    Retrying { attempt: u32, delay: Duration },
    /// The session stopped for good (cancelled or retries exhausted).
    Stopped,
}

// ── WebSocketSession ─────────────────────────────────────────────────

/// Handle to a running WebSocket session.
///
/// Cheaply cloneable. Call [`shutdown`](Self::shutdown) to close the socket
/// and stop reconnecting.
#[derive(Clone)]
pub struct WebSocketSession {
    outbound: Arc<ArcSwapOption<mpsc::UnboundedSender<Message>>>,
    cancel: CancellationToken,
}

impl WebSocketSession {
    /// Spawn the connect/reconnect loop.
    ///
    /// Returns immediately; the first connection attempt happens on the
    /// background task. Must be called from within a tokio runtime.
    pub fn connect(
        ws_url: Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let outbound = Arc::new(ArcSwapOption::empty());

        let task_outbound = Arc::clone(&outbound);
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            ws_loop(ws_url, event_tx, task_outbound, reconnect, task_cancel).await;
        });

        (Self { outbound, cancel }, event_rx)
    }

    /// Queue a text frame for the open socket.
    ///
    /// Fails with [`Error::ConnectionLost`] when no socket is open.
    pub fn send(&self, text: String) -> Result<(), Error> {
        let guard = self.outbound.load();
        let tx = guard.as_ref().ok_or(Error::ConnectionLost)?;
        tx.send(Message::Text(text.into()))
            .map_err(|_| Error::ConnectionLost)
    }

    /// Whether a socket is currently open.
    pub fn is_open(&self) -> bool {
        self.outbound.load().is_some()
    }

    /// Signal the background task to close the socket and exit.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect -> read -> on close, backoff -> reconnect.
async fn ws_loop(
    ws_url: Url,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
    outbound: Arc<ArcSwapOption<mpsc::UnboundedSender<Message>>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let _ = event_tx.send(TransportEvent::Dialing);
        let outcome = connect_and_read(&ws_url, &event_tx, &outbound, &cancel).await;

        outbound.store(None);

        match outcome {
            Ok(session) => {
                if session.opened {
                    attempt = 0;
                }
                let (code, reason) = session.close.unwrap_or((None, String::new()));
                tracing::info!(?code, %reason, "WebSocket closed");
                let _ = event_tx.send(TransportEvent::Closed { code, reason });
            }
            Err((opened, e)) => {
                if opened {
                    attempt = 0;
                }
                tracing::warn!(error = %e, attempt, "WebSocket error");
                let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                let _ = event_tx.send(TransportEvent::Closed {
                    code: None,
                    reason: e.to_string(),
                });
            }
        }

        if cancel.is_cancelled() {
            break;
        }

        if let Some(max) = reconnect.max_retries {
            if attempt >= max {
                tracing::error!(
                    max_retries = max,
                    "WebSocket reconnection limit reached, giving up"
                );
                break;
            }
        }

        let delay = reconnect.delay_for(attempt);
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "Waiting before reconnect"
        );
        let _ = event_tx.send(TransportEvent::Retrying { attempt, delay });

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        attempt = attempt.saturating_add(1);
    }

    outbound.store(None);
    let _ = event_tx.send(TransportEvent::Stopped);
    tracing::debug!("WebSocket loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// How a connection that did not fail ended.
struct SessionEnd {
    opened: bool,
    close: Option<(Option<u16>, String)>,
}

/// Establish a single WebSocket connection and pump frames until it drops.
///
/// The error half carries whether the socket had opened before failing.
async fn connect_and_read(
    url: &Url,
    event_tx: &mpsc::UnboundedSender<TransportEvent>,
    outbound: &ArcSwapOption<mpsc::UnboundedSender<Message>>,
    cancel: &CancellationToken,
) -> Result<SessionEnd, (bool, Error)> {
    tracing::info!(url = %url, "Connecting to WebSocket");

    let (ws_stream, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(SessionEnd { opened: false, close: None }),
        result = tokio_tungstenite::connect_async(url.as_str()) => {
            result.map_err(|e| (false, Error::WebSocketConnect(e.to_string())))?
        }
    };

    tracing::info!("WebSocket connected");

    let (mut write, mut read) = ws_stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
    outbound.store(Some(Arc::new(out_tx)));
    let _ = event_tx.send(TransportEvent::Opened);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                return Ok(SessionEnd { opened: true, close: Some((None, "client shutdown".into())) });
            }
            Some(frame) = out_rx.recv() => {
                if let Err(e) = write.send(frame).await {
                    return Err((true, Error::WebSocketConnect(e.to_string())));
                }
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        tracing::trace!(len = text.len(), "WebSocket frame");
                        let _ = event_tx.send(TransportEvent::Message(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // tungstenite queues the pong; flushed on the next write
                        tracing::trace!("WebSocket ping");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let close = frame.map_or((None, String::new()), |cf| {
                            (Some(u16::from(cf.code)), cf.reason.as_str().to_owned())
                        });
                        return Ok(SessionEnd { opened: true, close: Some(close) });
                    }
                    Some(Err(tungstenite::Error::ConnectionClosed)) | None => {
                        tracing::info!("WebSocket stream ended");
                        return Ok(SessionEnd { opened: true, close: None });
                    }
                    Some(Err(e)) => {
                        return Err((true, Error::WebSocketConnect(e.to_string())));
                    }
                    Some(Ok(_)) => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
