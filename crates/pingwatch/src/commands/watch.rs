//! `watch`: stream the server's event channel through the dashboard.
//!
//! Every event goes through [`Dashboard::apply_socket`], then the view it
//! touched is printed as lines. Notices go to stderr.

use std::time::Duration;

use pingwatch_api::socket_url;
use pingwatch_config::ServerConfig;
use pingwatch_core::{
    Dashboard, EventSocket, LoggedMessage, ReconnectConfig, ServerEvent, SocketEvent,
    StatusBoardView, UnconfiguredView,
};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Prints dashboard updates in the selected output format.
struct WatchPrinter {
    format: OutputFormat,
    color: bool,
    messages_only: bool,
}

impl WatchPrinter {
    fn structured(&self) -> bool {
        !matches!(self.format, OutputFormat::Table | OutputFormat::Plain)
    }

    fn message(&self, logged: &LoggedMessage) -> Result<(), CliError> {
        let line = match self.format {
            OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
                serde_json::to_string(&logged.message)?
            }
            OutputFormat::Plain => logged.message.payload.clone(),
            OutputFormat::Table => {
                let body = logged.rendered.text().replace('\n', "\n    ");
                format!(
                    "[{}] {}  {body}",
                    logged.message.timestamp, logged.message.topic
                )
            }
        };
        println!("{line}");
        Ok(())
    }

    fn status(&self, dashboard: &Dashboard) -> Result<(), CliError> {
        if self.messages_only {
            return Ok(());
        }
        if self.structured() {
            println!("{}", serde_json::to_string(dashboard.status.sites())?);
            return Ok(());
        }
        match dashboard.status.view() {
            StatusBoardView::Placeholder(text) => println!("{text}"),
            StatusBoardView::Grid(cards) => {
                let [ok, one, two, three] = dashboard.status.level_counts();
                let at = dashboard
                    .status
                    .updated_at()
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                println!(
                    "Site status {at}  ok:{ok} alert1:{one} alert2:{two} alert3:{three}"
                );
                for card in cards {
                    let mut line = format!(
                        "  {:<8} {:<8} {}",
                        card.site_id,
                        output::paint_level(card.level, self.color),
                        card.fraction
                    );
                    if !card.missing.is_empty() {
                        line.push_str("  missing: ");
                        line.push_str(&card.missing.join(", "));
                    }
                    println!("{line}");
                }
            }
        }
        Ok(())
    }

    fn unconfigured(&self, dashboard: &Dashboard) {
        if self.messages_only || self.structured() {
            return;
        }
        if let UnconfiguredView::Shown { badge, rows } = dashboard.unconfigured.view() {
            println!("Unconfigured sites ({badge}):");
            for (index, site) in rows.iter().enumerate() {
                let hint = dashboard
                    .unconfigured
                    .configure(index)
                    .map(|h| format!("pingwatch sites add --from-handoff '{}'", h.to_location()))
                    .unwrap_or_default();
                println!(
                    "  {:<8} [{}] last seen {}  {hint}",
                    site.site_id,
                    site.devices.join(", "),
                    site.last_seen
                );
            }
        }
    }

    fn link(&self, dashboard: &Dashboard) {
        if !self.messages_only && !self.structured() {
            println!("MQTT: {}", dashboard.link.label());
        }
    }
}

pub async fn handle(
    server: &ServerConfig,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let url = socket_url(&server.base_url)?;
    let cancel = CancellationToken::new();
    let socket = EventSocket::connect(url, ReconnectConfig::default(), cancel.clone());
    let mut rx = socket.subscribe();

    let printer = WatchPrinter {
        format: global.output.clone(),
        color: output::should_color(&global.color),
        messages_only: args.messages_only,
    };
    let mut dashboard = Dashboard::new();
    let mut seen: u64 = 0;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        let event = tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            recv = rx.recv() => recv,
        };

        let event = match event {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "watch fell behind the event stream");
                continue;
            }
            Err(RecvError::Closed) => break Ok(()),
        };

        let notice = dashboard.apply_socket(&event);
        if let Some(ref notice) = notice {
            if !global.quiet {
                eprintln!("{}", output::format_notice(notice, printer.color));
            }
        }

        let SocketEvent::Server(server_event) = event.as_ref() else {
            continue;
        };
        debug!(event = server_event.name(), "server event");
        match server_event {
            ServerEvent::MqttMessage(_) => {
                if let Some(logged) = dashboard.messages.get(0) {
                    printer.message(logged)?;
                }
                seen += 1;
                if args.limit.is_some_and(|limit| seen >= limit) {
                    break Ok(());
                }
            }
            ServerEvent::SiteStatusUpdate(_) => printer.status(&dashboard)?,
            ServerEvent::UnconfiguredSitesUpdate(_) => printer.unconfigured(&dashboard),
            ServerEvent::MqttStatus(_) => printer.link(&dashboard),
            ServerEvent::ClearMessages
            | ServerEvent::ConnectResponse(_)
            | ServerEvent::DisconnectResponse
            | ServerEvent::Unrecognized { .. } => {}
        }
    };

    socket.shutdown();
    // Let the socket task close the link before the runtime goes away.
    tokio::time::sleep(Duration::from_millis(50)).await;
    result
}

