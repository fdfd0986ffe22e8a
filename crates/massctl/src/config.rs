//! CLI configuration: a thin wrapper around `massctl_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--server, --timeout).

use std::time::Duration;

use massctl_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use massctl_config::{
    Config, Profile, config_path, load_config, parse_server_url, profile_to_client_config,
    save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ClientConfig` from the config file, active profile and flags.
///
/// Flags take priority over profile values. Without a matching profile,
/// `--server` alone is enough.
pub fn resolve_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut client = match cfg.profiles.get(&profile_name) {
        Some(profile) => {
            let mut profile = profile.clone();
            if let Some(ref server) = global.server {
                profile.server.clone_from(server);
            }
            profile_to_client_config(&profile, &cfg.defaults)?
        }
        None => {
            // An explicitly named profile must exist.
            if global.profile.is_some() && global.server.is_none() {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }
            let server = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            profile_to_client_config(&Profile::new(server), &cfg.defaults)?
        }
    };

    if let Some(secs) = global.timeout {
        client.connect_timeout = Duration::from_secs(secs);
    }
    Ok(client)
}
