//! Playback and volume command handlers.

use massctl_core::{Command as CoreCommand, MassClient};

use crate::cli::{GlobalOpts, MuteArgs, VolumeArgs};
use crate::error::CliError;

/// Fail early with a pointer to `players list` for unknown ids.
fn ensure_player(client: &MassClient, player_id: &str) -> Result<(), CliError> {
    if client.player(player_id).is_some() {
        return Ok(());
    }
    Err(CliError::NotFound {
        resource_type: "player".into(),
        identifier: player_id.into(),
        list_command: "players list".into(),
    })
}

fn target(cmd: &CoreCommand) -> &str {
    match cmd {
        CoreCommand::Play { player_id }
        | CoreCommand::Pause { player_id }
        | CoreCommand::PlayPause { player_id }
        | CoreCommand::Stop { player_id }
        | CoreCommand::Next { player_id }
        | CoreCommand::Previous { player_id } => player_id,
        _ => "",
    }
}

/// Play, pause, stop, next, previous.
pub async fn transport(
    client: &MassClient,
    cmd: CoreCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let player_id = target(&cmd).to_owned();
    ensure_player(client, &player_id)?;

    let name = cmd.name();
    client.execute(cmd).await?;
    if !global.quiet {
        eprintln!("{name}: {player_id}");
    }
    Ok(())
}

pub async fn volume(
    client: &MassClient,
    args: VolumeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    ensure_player(client, &args.player)?;

    let cmd = if args.group {
        CoreCommand::GroupVolume {
            player_id: args.player.clone(),
            volume_level: args.level,
        }
    } else {
        CoreCommand::VolumeSet {
            player_id: args.player.clone(),
            volume_level: args.level,
        }
    };
    client.execute(cmd).await?;

    if !global.quiet {
        let level = client.player(&args.player).and_then(|p| {
            if args.group {
                p.group_volume
            } else {
                p.volume_level
            }
        });
        match level {
            Some(level) => eprintln!("Volume of {} set to {level}", args.player),
            None => eprintln!("Volume of {} updated", args.player),
        }
    }
    Ok(())
}

pub async fn mute(client: &MassClient, args: MuteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    ensure_player(client, &args.player)?;

    let muted = !args.off;
    client
        .execute(CoreCommand::VolumeMute {
            player_id: args.player.clone(),
            muted,
        })
        .await?;
    if !global.quiet {
        let verb = if muted { "Muted" } else { "Unmuted" };
        eprintln!("{verb} {}", args.player);
    }
    Ok(())
}
