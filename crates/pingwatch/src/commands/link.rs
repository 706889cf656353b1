//! `connect` / `disconnect`: drive the server's MQTT broker link.
//!
//! Joins the event channel, emits the command, then waits for the
//! matching response event. Both waits share the configured timeout.

use std::time::Duration;

use pingwatch_api::socket_url;
use pingwatch_config::ServerConfig;
use pingwatch_core::{
    ClientCommand, Dashboard, EventSocket, NoticeLevel, ReconnectConfig, SocketEvent,
};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    server: &ServerConfig,
    command: ClientCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let url = socket_url(&server.base_url)?;
    let reconnect = ReconnectConfig {
        initial_delay: Duration::from_millis(250),
        ..ReconnectConfig::default()
    };
    let cancel = CancellationToken::new();
    let socket = EventSocket::connect(url, reconnect, cancel);
    let result = run(&socket, server, command, global).await;
    socket.shutdown();
    result
}

async fn run(
    socket: &EventSocket,
    server: &ServerConfig,
    command: ClientCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let deadline = Instant::now() + server.timeout;
    let timed_out = || CliError::Timeout {
        seconds: server.timeout.as_secs(),
    };
    let color = output::should_color(&global.color);
    let spinner = util::spinner(&format!("Joining {}", server.base_url), global.quiet);

    // Subscribe before joining so the response cannot slip past.
    let mut rx = socket.subscribe();
    let mut joined = socket.connection_state();
    if timeout_at(deadline, joined.wait_for(|up| *up)).await.is_err() {
        spinner.finish_and_clear();
        return Err(CliError::ConnectionFailed {
            url: server.base_url.to_string(),
            source: format!(
                "event channel not joined within {}s",
                server.timeout.as_secs()
            )
            .into(),
        });
    }

    socket.emit(command)?;
    tracing::debug!(command = command.event_name(), "command sent");
    if let Some(notice) = Dashboard::command_sent(command) {
        spinner.set_message(notice.message);
    }

    let mut dashboard = Dashboard::new();
    let notice = loop {
        let event = match timeout_at(deadline, rx.recv()).await {
            Err(_) => {
                spinner.finish_and_clear();
                return Err(timed_out());
            }
            Ok(Err(RecvError::Lagged(_))) => continue,
            Ok(Err(RecvError::Closed)) => {
                spinner.finish_and_clear();
                return Err(CliError::ConnectionFailed {
                    url: server.base_url.to_string(),
                    source: "event channel closed".into(),
                });
            }
            Ok(Ok(event)) => event,
        };

        let is_response = matches!(
            event.as_ref(),
            SocketEvent::Server(ev) if ev.name() == command.response_name()
        );
        let notice = dashboard.apply_socket(&event);
        if is_response {
            break notice;
        }
    };
    spinner.finish_and_clear();

    match notice {
        Some(notice) if notice.level == NoticeLevel::Error => Err(CliError::BrokerFailed {
            message: notice.message,
        }),
        Some(notice) => {
            if !global.quiet {
                eprintln!("{}", output::format_notice(&notice, color));
            }
            Ok(())
        }
        None => Ok(()),
    }
}
