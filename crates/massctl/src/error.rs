//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use massctl_config::ConfigError;
use massctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const COMMAND: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to server at {url}")]
    #[diagnostic(
        code(massctl::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Connection to the server was lost")]
    #[diagnostic(code(massctl::connection_lost))]
    ConnectionLost,

    #[error("Server did not become ready within {seconds}s")]
    #[diagnostic(
        code(massctl::timeout),
        help("Increase the wait with --timeout or check the server's load.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(massctl::not_found),
        help("Run: massctl {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Server ───────────────────────────────────────────────────────
    #[error("Server rejected the command ({code}): {message}")]
    #[diagnostic(code(massctl::command_failed))]
    CommandFailed { code: String, message: String },

    #[error("Unexpected server response: {message}")]
    #[diagnostic(code(massctl::bad_response))]
    BadResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(massctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(massctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: massctl config init --server <url>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(massctl::no_config),
        help(
            "Pass --server <url>, or create a profile with: massctl config init --server <url>\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(massctl::config))]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    #[diagnostic(code(massctl::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(massctl::json), help("Arguments must be a JSON object."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ConnectionLost => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::CommandFailed { .. } => exit_code::COMMAND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::ConnectionLost => CliError::ConnectionLost,

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Command { code, details } => CliError::CommandFailed {
                message: details.unwrap_or_else(|| code.clone()),
                code,
            },

            CoreError::Deserialization { command, message } => CliError::BadResponse {
                message: format!("{command}: {message}"),
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "server".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_errors_keep_server_details() {
        let err = CliError::from(CoreError::Command {
            code: "999".into(),
            details: Some("Player ghost not found".into()),
        });
        assert_eq!(err.exit_code(), exit_code::COMMAND);
        assert_eq!(
            err.to_string(),
            "Server rejected the command (999): Player ghost not found"
        );
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "player".into(),
            identifier: "ghost".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(err, CliError::NotFound { ref list_command, .. } if list_command == "players list"));
    }

    #[test]
    fn connection_errors_share_an_exit_code() {
        assert_eq!(
            CliError::from(CoreError::ConnectionLost).exit_code(),
            exit_code::CONNECTION
        );
        assert_eq!(
            CliError::from(CoreError::Timeout { timeout_secs: 3 }).exit_code(),
            exit_code::TIMEOUT
        );
    }
}
