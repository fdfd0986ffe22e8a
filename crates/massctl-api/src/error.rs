use thiserror::Error;

/// Top-level error type for the `massctl-api` crate.
///
/// Covers the transport session and the wire protocol.
/// `massctl-core` maps these into its own `CoreError`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL uses a scheme that has no WebSocket counterpart.
    #[error("Unsupported URL scheme '{0}' (expected http, https, ws or wss)")]
    UnsupportedScheme(String),

    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed by the peer.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    /// No socket is currently open; the frame was not sent.
    #[error("Connection lost")]
    ConnectionLost,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A frame that is neither a result, an event, nor a server greeting.
    #[error("Unrecognized message: {body}")]
    UnknownMessage { body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::WebSocketConnect(_) | Self::WebSocketClosed { .. } | Self::ConnectionLost
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(Error::ConnectionLost.is_transient());
        assert!(Error::WebSocketConnect("refused".into()).is_transient());
        assert!(
            !Error::UnknownMessage {
                body: "{}".into()
            }
            .is_transient()
        );
    }
}
