//! Clap derive structures for the `pingwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Device tokens accepted by `--device`.
pub const DEVICE_NAMES: [&str; 3] = ["GSM-1", "GSM-2", "ESP"];

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pingwatch -- watch MQTT PING-WATCH sites from the command line
#[derive(Debug, Parser)]
#[command(
    name = "pingwatch",
    version,
    about = "Monitor PING-WATCH sites and manage the site registry",
    long_about = "Command-line client for a PingWatch monitoring server.\n\n\
        Streams live MQTT traffic and per-site alert levels over the server's\n\
        event channel, and manages the configured site registry over REST.",
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
    #[arg(long, short = 'p', env = "PINGWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "PINGWATCH_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PINGWATCH_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PINGWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PINGWATCH_TIMEOUT", global = true)]
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
    /// Manage the configured site registry
    #[command(alias = "site")]
    Sites(SitesArgs),

    /// Stream live messages, site status and notices
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Ask the server to connect to its MQTT broker
    Connect,

    /// Ask the server to disconnect from its MQTT broker
    Disconnect,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List configured sites
    #[command(alias = "ls")]
    List,

    /// Show one site
    Get {
        /// Site identifier, e.g. S01
        site_id: String,
    },

    /// Register a new site
    Create {
        /// Site identifier, e.g. S01
        site_id: String,

        /// Display name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        details: SiteDetailArgs,
    },

    /// Change an existing site; unspecified fields keep their values
    Update {
        site_id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        details: SiteDetailArgs,
    },

    /// Remove a site from the registry
    #[command(alias = "rm")]
    Delete { site_id: String },

    /// Register a site from an add-site handoff location
    Add {
        /// Location such as `/config?add=S14&devices=ESP,GSM-1`
        #[arg(long, value_name = "LOCATION")]
        from_handoff: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        details: SiteDetailArgs,
    },
}

#[derive(Debug, Default, Args)]
pub struct SiteDetailArgs {
    #[arg(long)]
    pub location: Option<String>,

    /// Person responsible for the site
    #[arg(long)]
    pub responsible: Option<String>,

    /// Contact e-mail
    #[arg(long)]
    pub email: Option<String>,

    /// Contact phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Enabled device (repeatable); replaces the current device list
    #[arg(long = "device", value_name = "DEVICE", value_parser = DEVICE_NAMES)]
    pub devices: Vec<String>,

    /// Mark the site active
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    /// Mark the site inactive
    #[arg(long)]
    pub inactive: bool,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many MQTT messages
    #[arg(long, short = 'n')]
    pub limit: Option<u64>,

    /// Only print MQTT messages
    #[arg(long)]
    pub messages_only: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// Set a value on the active profile (server, insecure, timeout, ca_cert)
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    SetDefault {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
