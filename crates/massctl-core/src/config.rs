// ── Runtime connection configuration ──
//
// Describes *how* to reach a server and how the session behaves. Never
// touches disk: the CLI (via massctl-config) builds a `ClientConfig` and
// hands it in.

use std::time::Duration;

use url::Url;

use massctl_api::ReconnectConfig;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for one [`MassClient`](crate::MassClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g. `http://192.168.1.20:8095`). The WebSocket
    /// endpoint is derived from it.
    pub url: Url,
    /// Reconnection backoff.
    pub reconnect: ReconnectConfig,
    /// How long [`MassClient::connect`](crate::MassClient::connect) waits
    /// for the greeting and the bulk refresh.
    pub connect_timeout: Duration,
    /// Capacity of the async event broadcast channel.
    pub event_channel_capacity: usize,
    /// Reject commands still awaiting a result when the socket closes.
    /// When `false` they stay pending until the caller gives up.
    pub fail_pending_on_disconnect: bool,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            reconnect: ReconnectConfig::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            fail_pending_on_disconnect: true,
        }
    }

    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Base URL without a trailing slash, used for HTTP resources such as
    /// track previews.
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_owned()
    }
}
