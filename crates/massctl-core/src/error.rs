// ── Core error types ──
//
// User-facing errors from massctl-core. Consumers never see raw socket
// or JSON errors directly; the `From<massctl_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// Not connected, or the connection dropped before a result arrived.
    #[error("Connection lost")]
    ConnectionLost,

    #[error("Server did not become ready within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Command errors ───────────────────────────────────────────────
    /// The server answered a command with an error result.
    #[error("Command failed: {}", .details.as_deref().unwrap_or(.code))]
    Command {
        code: String,
        details: Option<String>,
    },

    #[error("Could not decode result of '{command}': {message}")]
    Deserialization { command: String, message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_owned(),
        }
    }

    /// Returns `true` if reconnecting may resolve this error.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::ConnectionLost | Self::Timeout { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<massctl_api::Error> for CoreError {
    fn from(err: massctl_api::Error) -> Self {
        match err {
            massctl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            massctl_api::Error::UnsupportedScheme(scheme) => CoreError::Config {
                message: format!("Unsupported URL scheme '{scheme}'"),
            },
            massctl_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason,
            },
            massctl_api::Error::WebSocketClosed { .. } | massctl_api::Error::ConnectionLost => {
                CoreError::ConnectionLost
            }
            massctl_api::Error::Serialization(e) => CoreError::Internal(e.to_string()),
            massctl_api::Error::UnknownMessage { body } => {
                CoreError::Internal(format!("unrecognized message: {body}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_prefers_details() {
        let err = CoreError::Command {
            code: "999".into(),
            details: Some("Player not found".into()),
        };
        assert_eq!(err.to_string(), "Command failed: Player not found");

        let err = CoreError::Command {
            code: "invalid_command".into(),
            details: None,
        };
        assert_eq!(err.to_string(), "Command failed: invalid_command");
    }

    #[test]
    fn transport_errors_map_to_connection_lost() {
        let err: CoreError = massctl_api::Error::ConnectionLost.into();
        assert!(matches!(err, CoreError::ConnectionLost));
        assert!(err.is_connection_error());
    }
}
