//! Live dashboard state and the dispatcher that feeds it.
//!
//! [`Dashboard::apply`] is the single place server events touch view
//! state. Each event updates exactly one view-model; the match is
//! exhaustive so a new event kind cannot be forgotten.

use pingwatch_api::{ClientCommand, ServerEvent, SocketEvent, TransportState};
use tracing::{debug, info, warn};

use crate::link::MqttLink;
use crate::message_log::MessageLog;
use crate::notice::Notice;
use crate::status_board::StatusBoard;
use crate::unconfigured::UnconfiguredPanel;

#[derive(Debug, Default)]
pub struct Dashboard {
    pub messages: MessageLog,
    pub status: StatusBoard,
    pub unconfigured: UnconfiguredPanel,
    pub link: MqttLink,
    server_connected: bool,
    unrecognized: u64,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the event channel to the server is currently joined.
    pub fn server_connected(&self) -> bool {
        self.server_connected
    }

    /// Events received that the dashboard could not interpret.
    pub fn unrecognized_count(&self) -> u64 {
        self.unrecognized
    }

    pub fn apply_socket(&mut self, event: &SocketEvent) -> Option<Notice> {
        match event {
            SocketEvent::Server(ev) => self.apply(ev),
            SocketEvent::Transport(TransportState::Connected) => {
                info!("connected to server");
                self.server_connected = true;
                None
            }
            SocketEvent::Transport(TransportState::Disconnected { reason }) => {
                warn!(reason, "lost connection to server");
                self.server_connected = false;
                self.link = MqttLink::Disconnected { error: None };
                Some(Notice::error(format!("Lost connection to server: {reason}")))
            }
        }
    }

    /// Apply one server event. Returns the notice to show, if any.
    pub fn apply(&mut self, event: &ServerEvent) -> Option<Notice> {
        match event {
            ServerEvent::MqttStatus(status) => {
                debug!(status = %status.status, "mqtt status");
                self.link = MqttLink::from_status(status);
                None
            }
            ServerEvent::MqttMessage(message) => {
                self.messages.on_message(message.clone());
                None
            }
            ServerEvent::SiteStatusUpdate(sites) => {
                self.status.on_status_update(sites.clone());
                None
            }
            ServerEvent::UnconfiguredSitesUpdate(sites) => {
                self.unconfigured.on_unconfigured_update(sites.clone());
                None
            }
            ServerEvent::ClearMessages => {
                self.messages.on_clear();
                None
            }
            ServerEvent::ConnectResponse(response) => Some(if response.success {
                Notice::success("Connected to MQTT broker")
            } else {
                Notice::error(format!(
                    "Failed to connect: {}",
                    response.error.as_deref().unwrap_or("unknown error")
                ))
            }),
            ServerEvent::DisconnectResponse => Some(Notice::info("Disconnected from MQTT broker")),
            ServerEvent::Unrecognized { name, payload } => {
                warn!(event = %name, %payload, "unrecognized server event");
                self.unrecognized += 1;
                Some(Notice::info(format!("Unrecognized server event: {name}")))
            }
        }
    }

    /// The user's clear action. Same state change as the server event.
    pub fn clear_messages(&mut self) -> Notice {
        self.messages.on_clear();
        Notice::info("Messages cleared")
    }

    /// Notice to show right after a command is sent, before its response.
    pub fn command_sent(command: ClientCommand) -> Option<Notice> {
        match command {
            ClientCommand::ConnectMqtt => Some(Notice::info("Connecting to MQTT broker...")),
            ClientCommand::DisconnectMqtt => None,
        }
    }

    /// One countdown second.
    pub fn tick(&mut self) -> u32 {
        self.status.countdown_mut().tick()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use crate::status_board::StatusBoardView;
    use crate::unconfigured::UnconfiguredView;
    use pingwatch_api::{ConnectResponse, MqttMessage, MqttStatus, SiteStatus};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn message(payload: &str) -> ServerEvent {
        ServerEvent::MqttMessage(MqttMessage {
            timestamp: "2026-10-19 09:00:00.000".into(),
            topic: "PING-WATCH".into(),
            payload: payload.into(),
        })
    }

    #[test]
    fn server_clear_matches_local_clear() {
        let mut a = Dashboard::new();
        let mut b = Dashboard::new();
        for d in [&mut a, &mut b] {
            d.apply(&message("S01/ESP"));
            d.apply(&message("S02/ESP"));
        }
        assert_eq!(a.apply(&ServerEvent::ClearMessages), None);
        assert_eq!(b.clear_messages(), Notice::info("Messages cleared"));
        assert_eq!(a.messages.count(), b.messages.count());
        assert_eq!(a.messages.len(), 0);
        assert_eq!(b.messages.len(), 0);
    }

    #[test]
    fn events_touch_only_their_own_view() {
        let mut d = Dashboard::new();
        d.status.countdown_mut().start();
        for _ in 0..10 {
            d.tick();
        }
        d.apply(&message("hello"));
        assert_eq!(d.status.countdown().value(), 50);
        assert_eq!(d.status.view(), StatusBoardView::Placeholder("No site data yet"));

        d.apply(&ServerEvent::SiteStatusUpdate(vec![SiteStatus {
            site_id: "S01".into(),
            alert_level: 2,
            color: "#f97316".into(),
            received: vec!["ESP".into()],
            missing: vec!["GSM-1".into(), "GSM-2".into()],
            total_received: 1,
            total_expected: 3,
        }]));
        assert_eq!(d.status.countdown().value(), 60);
        assert_eq!(d.messages.len(), 1);
        assert_eq!(d.unconfigured.view(), UnconfiguredView::Hidden);
    }

    #[test]
    fn connect_responses_produce_notices() {
        let mut d = Dashboard::new();
        let ok = d
            .apply(&ServerEvent::ConnectResponse(ConnectResponse {
                success: true,
                error: None,
            }))
            .unwrap();
        assert_eq!(ok.level, NoticeLevel::Success);

        let failed = d
            .apply(&ServerEvent::ConnectResponse(ConnectResponse {
                success: false,
                error: Some("timed out".into()),
            }))
            .unwrap();
        assert_eq!(failed, Notice::error("Failed to connect: timed out"));

        assert_eq!(
            d.apply(&ServerEvent::DisconnectResponse),
            Some(Notice::info("Disconnected from MQTT broker"))
        );
        assert_eq!(
            Dashboard::command_sent(ClientCommand::ConnectMqtt),
            Some(Notice::info("Connecting to MQTT broker..."))
        );
    }

    #[test]
    fn mqtt_status_drives_link_indicator() {
        let mut d = Dashboard::new();
        d.apply(&ServerEvent::MqttStatus(MqttStatus {
            status: "connected".into(),
            broker: Some("10.0.0.2:1883".into()),
            topic: Some("PING-WATCH".into()),
            error: None,
        }));
        assert_eq!(d.link.label(), "Connected | Topic: PING-WATCH");
    }

    #[test]
    fn transport_drop_marks_everything_disconnected() {
        let mut d = Dashboard::new();
        d.apply_socket(&SocketEvent::Transport(TransportState::Connected));
        assert!(d.server_connected());
        let notice = d
            .apply_socket(&SocketEvent::Transport(TransportState::Disconnected {
                reason: "reset by peer".into(),
            }))
            .unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(!d.server_connected());
        assert_eq!(d.link.label(), "Disconnected");
    }

    #[test]
    fn unrecognized_events_are_surfaced() {
        let mut d = Dashboard::new();
        let notice = d
            .apply(&ServerEvent::Unrecognized {
                name: "firmware_update".into(),
                payload: json!({"v": 2}),
            })
            .unwrap();
        assert_eq!(notice.message, "Unrecognized server event: firmware_update");
        assert_eq!(d.unrecognized_count(), 1);
    }
}
