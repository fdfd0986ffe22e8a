//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod playback;
pub mod players;
pub mod providers;
pub mod queues;
pub mod send;
pub mod watch;

use massctl_core::{Command as CoreCommand, MassClient};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &MassClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Players(args) => players::handle(client, args, global),
        Command::Queues(args) => queues::handle(client, args, global),
        Command::Providers(args) => providers::handle(client, args, global),
        Command::Play(t) => {
            playback::transport(client, CoreCommand::Play { player_id: t.player }, global).await
        }
        Command::Pause(t) => {
            playback::transport(client, CoreCommand::Pause { player_id: t.player }, global).await
        }
        Command::PlayPause(t) => {
            let cmd = CoreCommand::PlayPause { player_id: t.player };
            playback::transport(client, cmd, global).await
        }
        Command::Stop(t) => {
            playback::transport(client, CoreCommand::Stop { player_id: t.player }, global).await
        }
        Command::Next(t) => {
            playback::transport(client, CoreCommand::Next { player_id: t.player }, global).await
        }
        Command::Previous(t) => {
            let cmd = CoreCommand::Previous { player_id: t.player };
            playback::transport(client, cmd, global).await
        }
        Command::Volume(args) => playback::volume(client, args, global).await,
        Command::Mute(args) => playback::mute(client, args, global).await,
        Command::Send(args) => send::handle(client, args, global).await,
        Command::Watch(args) => watch::handle(client, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command routed to server dispatch".into(),
        )),
    }
}
