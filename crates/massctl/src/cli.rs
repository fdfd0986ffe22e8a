//! Clap derive structures for the `massctl` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// massctl -- control a Music Assistant server from the command line
#[derive(Debug, Parser)]
#[command(
    name = "massctl",
    version,
    about = "Control Music Assistant players and queues from the command line",
    long_about = "Talks to a Music Assistant server over its WebSocket API.\n\n\
        Player, queue and provider listings come from the state mirrored\n\
        right after connecting; playback commands go straight to the server.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "MASSCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "MASSCTL_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MASSCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Seconds to wait for the server to become ready
    #[arg(long, env = "MASSCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect players
    #[command(alias = "p")]
    Players(PlayersArgs),

    /// Inspect player queues
    #[command(alias = "q")]
    Queues(QueuesArgs),

    /// Inspect provider instances
    Providers(ProvidersArgs),

    /// Start playback
    Play(PlayerTarget),

    /// Pause playback
    Pause(PlayerTarget),

    /// Toggle between play and pause
    PlayPause(PlayerTarget),

    /// Stop playback
    Stop(PlayerTarget),

    /// Skip to the next track
    Next(PlayerTarget),

    /// Go back to the previous track
    #[command(alias = "prev")]
    Previous(PlayerTarget),

    /// Set a player's volume (0-100)
    #[command(alias = "vol")]
    Volume(VolumeArgs),

    /// Mute or unmute a player
    Mute(MuteArgs),

    /// Send a raw command and print its result
    Send(SendArgs),

    /// Print events as they arrive until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Players ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlayersArgs {
    #[command(subcommand)]
    pub command: PlayersCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlayersCommand {
    /// List players
    #[command(alias = "ls")]
    List {
        /// Include players the server reports as unavailable
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Show one player
    Get {
        /// Player id
        player: String,
    },
}

// ── Queues ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct QueuesArgs {
    #[command(subcommand)]
    pub command: QueuesCommand,
}

#[derive(Debug, Subcommand)]
pub enum QueuesCommand {
    /// List queues
    #[command(alias = "ls")]
    List,

    /// Show one queue
    Get {
        /// Queue id (usually the player id)
        queue: String,
    },
}

// ── Providers ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProvidersArgs {
    #[command(subcommand)]
    pub command: ProvidersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProvidersCommand {
    /// List provider instances
    #[command(alias = "ls")]
    List,
}

// ── Playback ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlayerTarget {
    /// Player id
    pub player: String,
}

#[derive(Debug, Args)]
pub struct VolumeArgs {
    /// Player id
    pub player: String,

    /// Volume level; values outside 0-100 are clamped
    #[arg(allow_negative_numbers = true)]
    pub level: i64,

    /// Set the group volume instead of the player's own
    #[arg(long, short = 'g')]
    pub group: bool,
}

#[derive(Debug, Args)]
pub struct MuteArgs {
    /// Player id
    pub player: String,

    /// Unmute instead
    #[arg(long)]
    pub off: bool,
}

// ── Raw commands & events ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Command path (e.g. "players/all")
    pub command: String,

    /// Arguments as a JSON object
    #[arg(long, short = 'a')]
    pub args: Option<String>,

    /// Do not wait for the result
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Event tag to show (e.g. "player_updated"); all when omitted
    #[arg(long, short = 'e')]
    pub event: Vec<String>,

    /// Only events about this object id
    #[arg(long)]
    pub object: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration
    Show,

    /// Create or update a profile for the server given with --server
    Init {
        /// Profile name (defaults to --profile or "default")
        #[arg(long)]
        name: Option<String>,

        /// Make this the default profile
        #[arg(long)]
        set_default: bool,
    },

    /// List configured profiles
    Profiles,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
