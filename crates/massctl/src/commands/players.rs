//! Player command handlers.

use std::sync::Arc;

use tabled::Tabled;

use massctl_core::{MassClient, Player};

use crate::cli::{GlobalOpts, PlayersArgs, PlayersCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlayerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Available")]
    available: String,
}

impl PlayerRow {
    fn new(p: &Player, provider: String, color: bool) -> Self {
        let volume = match (p.volume_level, p.volume_muted) {
            (_, Some(true)) => "muted".into(),
            (Some(level), _) => level.to_string(),
            (None, _) => "-".into(),
        };
        Self {
            id: p.player_id.clone(),
            name: p.label().to_owned(),
            provider,
            state: output::paint_state(p.state, color),
            volume,
            available: output::paint_flag(p.available, color),
        }
    }
}

fn detail(p: &Player, provider: &str) -> String {
    let opt = |v: Option<String>| v.unwrap_or_else(|| "-".into());
    let mut pairs = vec![
        ("ID", p.player_id.clone()),
        ("Name", p.label().to_owned()),
        ("Type", p.player_type.to_string()),
        ("Provider", provider.to_owned()),
        ("Available", p.available.to_string()),
        ("Powered", opt(p.powered.map(|v| v.to_string()))),
        ("State", opt(p.state.map(|s| s.to_string()))),
        ("Volume", opt(p.volume_level.map(|v| v.to_string()))),
        ("Muted", opt(p.volume_muted.map(|v| v.to_string()))),
    ];
    if !p.group_childs.is_empty() {
        pairs.push(("Members", p.group_childs.join(", ")));
        pairs.push(("Group volume", opt(p.group_volume.map(|v| v.to_string()))));
    }
    if let Some(ref source) = p.active_source {
        pairs.push(("Source", source.clone()));
    }
    if let Some(ref media) = p.current_media {
        let title = media.title.as_deref().unwrap_or(&media.uri);
        let now = match media.artist.as_deref() {
            Some(artist) => format!("{artist} - {title}"),
            None => title.to_owned(),
        };
        pairs.push(("Now playing", now));
    }
    output::detail_lines(&pairs)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(client: &MassClient, args: PlayersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    match args.command {
        PlayersCommand::List { all } => {
            let snap: Vec<Arc<Player>> = client
                .players_snapshot()
                .iter()
                .filter(|p| all || p.available)
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &snap,
                |p| PlayerRow::new(p, client.provider_name(&p.provider), color),
                |p| p.player_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PlayersCommand::Get { player } => {
            let p = client.player(&player).ok_or_else(|| CliError::NotFound {
                resource_type: "player".into(),
                identifier: player.clone(),
                list_command: "players list".into(),
            })?;
            let provider = client.provider_name(&p.provider);
            let out = output::render_single(
                &global.output,
                p.as_ref(),
                |p| detail(p, &provider),
                |p| p.player_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
