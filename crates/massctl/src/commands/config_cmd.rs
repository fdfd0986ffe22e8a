//! Config subcommand handlers.

use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display in TOML layout.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(retries) = p.max_retries {
            let _ = writeln!(out, "max_retries = {retries}");
        }
        if let Some(keep) = p.keep_pending_on_disconnect {
            let _ = writeln!(out, "keep_pending_on_disconnect = {keep}");
        }
    }

    out.trim_end().to_owned()
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Default")]
    default: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.default_profile.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { name, set_default } => {
            let server = global.server.clone().ok_or_else(|| CliError::Validation {
                field: "server".into(),
                reason: "config init needs --server <url>".into(),
            })?;
            config::parse_server_url(&server)?;

            let mut cfg = config::load_config()?;
            let name = name
                .or_else(|| global.profile.clone())
                .unwrap_or_else(|| "default".into());

            cfg.profiles
                .entry(name.clone())
                .and_modify(|p| p.server.clone_from(&server))
                .or_insert_with(|| Profile::new(server.clone()));

            let default_missing = cfg
                .default_profile
                .as_ref()
                .is_none_or(|d| !cfg.profiles.contains_key(d));
            if set_default || default_missing {
                cfg.default_profile = Some(name.clone());
            }

            let path = config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Profile '{name}' -> {server} saved to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let mut names: Vec<String> = cfg.profiles.keys().cloned().collect();
            names.sort();
            let out = output::render_list(
                &global.output,
                &names,
                |n| ProfileRow {
                    name: n.clone(),
                    server: cfg.profiles[n].server.clone(),
                    default: if cfg.default_profile.as_deref() == Some(n.as_str()) {
                        "*".into()
                    } else {
                        String::new()
                    },
                },
                String::clone,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
