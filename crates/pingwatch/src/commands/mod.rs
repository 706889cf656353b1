//! Command dispatch: bridges CLI args -> core workflows -> output formatting.

pub mod config_cmd;
pub mod link;
pub mod sites;
pub mod util;
pub mod watch;

use pingwatch_config::ServerConfig;
use pingwatch_core::ClientCommand;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    server: &ServerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Sites(args) => sites::handle(server, args, global).await,
        Command::Watch(args) => watch::handle(server, &args, global).await,
        Command::Connect => link::handle(server, ClientCommand::ConnectMqtt, global).await,
        Command::Disconnect => link::handle(server, ClientCommand::DisconnectMqtt, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
