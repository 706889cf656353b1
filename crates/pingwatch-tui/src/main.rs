//! `pingwatch-tui` - terminal dashboard for PING-WATCH site monitoring.
//!
//! Three screens, switched with number keys: Monitor (site status grid,
//! countdown, unconfigured sites), Messages (the live MQTT message log) and
//! Sites (the site registry with add/edit/delete forms).
//!
//! Logs go to a file (default `/tmp/pingwatch-tui.log`) so they never
//! corrupt the terminal. A background data bridge forwards server events
//! from the Socket.IO channel into the action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use pingwatch_config::{Config, ConfigError, Profile, ServerConfig};
use pingwatch_core::{CONFIG_PATH, HandoffSlot};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

/// Terminal dashboard for PING-WATCH site monitoring.
#[derive(Parser, Debug)]
#[command(name = "pingwatch-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short, long, env = "PINGWATCH_PROFILE")]
    profile: Option<String>,

    /// Monitoring server URL (overrides the profile)
    #[arg(short, long, env = "PINGWATCH_SERVER")]
    server: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Open at this location, e.g. `/config?add=S07&devices=ESP`
    #[arg(long, value_name = "LOCATION")]
    handoff: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/pingwatch-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. The returned guard flushes on drop and must live as
/// long as the app.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pingwatch_tui={log_level},pingwatch_core={log_level},pingwatch_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("pingwatch-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Profile from the config file, then flag overrides on top.
fn resolve_server(cli: &Cli, config: &Config) -> Result<ServerConfig> {
    let name = cli
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned());

    let mut profile = match config.profile(&name) {
        Ok(profile) => profile,
        Err(ConfigError::UnknownProfile { .. }) if cli.server.is_some() => Profile::local(),
        Err(ConfigError::UnknownProfile { name }) => {
            bail!("profile '{name}' not found; run `pingwatch config init` or pass --server")
        }
        Err(other) => return Err(other.into()),
    };

    if let Some(ref server) = cli.server {
        profile.server.clone_from(server);
    }
    if cli.insecure {
        profile.insecure = Some(true);
    }
    if cli.timeout.is_some() {
        profile.timeout = cli.timeout;
    }

    Ok(profile.to_connection(&config.defaults)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal enters raw mode.
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = pingwatch_config::load_config()?;
    let server = resolve_server(&cli, &config)?;
    let handoff = HandoffSlot::load(cli.handoff.as_deref().unwrap_or(CONFIG_PATH));

    info!(
        server = %server.base_url,
        location = handoff.location(),
        "starting pingwatch-tui"
    );

    let mut app = App::new(&server, handoff)?;
    app.run().await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["pingwatch-tui"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn default_profile_targets_local_server() {
        let server = resolve_server(&cli(&[]), &Config::default()).unwrap();
        assert_eq!(server.base_url.as_str(), "http://localhost:5000/");
        assert_eq!(server.timeout, Duration::from_secs(30));
    }

    #[test]
    fn server_flag_covers_unknown_profile() {
        let server = resolve_server(
            &cli(&["-p", "depot", "-s", "http://monitor.lan:5000", "--timeout", "4"]),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(server.base_url.host_str(), Some("monitor.lan"));
        assert_eq!(server.timeout, Duration::from_secs(4));
    }

    #[test]
    fn unknown_profile_without_server_fails() {
        let err = resolve_server(&cli(&["-p", "depot"]), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("depot"));
    }

    #[test]
    fn handoff_flag_opens_add_form() {
        let args = cli(&["--handoff", "/config?add=S07&devices=ESP"]);
        let slot = HandoffSlot::load(args.handoff.as_deref().unwrap());
        assert!(slot.is_pending());
    }
}
