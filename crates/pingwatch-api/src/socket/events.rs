//! Named events exchanged over the real-time channel.
//!
//! The server correlates nothing by request id: a `connect_mqtt` command is
//! answered by a `connect_response` event and that is the whole contract.
//! Every inbound event name is mapped onto [`ServerEvent`]; names we do not
//! know, and known names whose payload does not parse, become
//! [`ServerEvent::Unrecognized`] so callers can decide what to do with them.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::models::{
    ConnectResponse, MqttMessage, MqttStatus, SiteStatus, SitesPayload, UnconfiguredSite,
};

/// Every event the monitoring server pushes to clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    MqttStatus(MqttStatus),
    MqttMessage(MqttMessage),
    SiteStatusUpdate(Vec<SiteStatus>),
    UnconfiguredSitesUpdate(Vec<UnconfiguredSite>),
    ClearMessages,
    ConnectResponse(ConnectResponse),
    DisconnectResponse,
    Unrecognized { name: String, payload: Value },
}

impl ServerEvent {
    pub const MQTT_STATUS: &'static str = "mqtt_status";
    pub const MQTT_MESSAGE: &'static str = "mqtt_message";
    pub const SITE_STATUS_UPDATE: &'static str = "site_status_update";
    pub const UNCONFIGURED_SITES_UPDATE: &'static str = "unconfigured_sites_update";
    pub const CLEAR_MESSAGES: &'static str = "clear_messages";
    pub const CONNECT_RESPONSE: &'static str = "connect_response";
    pub const DISCONNECT_RESPONSE: &'static str = "disconnect_response";

    /// Build a typed event from its wire name and optional JSON payload.
    pub fn from_parts(name: &str, payload: Option<Value>) -> Self {
        let payload = payload.unwrap_or(Value::Null);

        let parsed = match name {
            Self::MQTT_STATUS => decode(&payload).map(Self::MqttStatus),
            Self::MQTT_MESSAGE => decode(&payload).map(Self::MqttMessage),
            Self::SITE_STATUS_UPDATE => {
                decode::<SitesPayload<SiteStatus>>(&payload).map(|p| Self::SiteStatusUpdate(p.sites))
            }
            Self::UNCONFIGURED_SITES_UPDATE => decode::<SitesPayload<UnconfiguredSite>>(&payload)
                .map(|p| Self::UnconfiguredSitesUpdate(p.sites)),
            Self::CLEAR_MESSAGES => Ok(Self::ClearMessages),
            Self::CONNECT_RESPONSE => decode(&payload).map(Self::ConnectResponse),
            Self::DISCONNECT_RESPONSE => Ok(Self::DisconnectResponse),
            _ => {
                return Self::Unrecognized {
                    name: name.to_owned(),
                    payload,
                };
            }
        };

        parsed.unwrap_or_else(|e| {
            debug!(event = name, error = %e, "event payload did not match its schema");
            Self::Unrecognized {
                name: name.to_owned(),
                payload,
            }
        })
    }

    /// Wire name of this event.
    pub fn name(&self) -> &str {
        match self {
            Self::MqttStatus(_) => Self::MQTT_STATUS,
            Self::MqttMessage(_) => Self::MQTT_MESSAGE,
            Self::SiteStatusUpdate(_) => Self::SITE_STATUS_UPDATE,
            Self::UnconfiguredSitesUpdate(_) => Self::UNCONFIGURED_SITES_UPDATE,
            Self::ClearMessages => Self::CLEAR_MESSAGES,
            Self::ConnectResponse(_) => Self::CONNECT_RESPONSE,
            Self::DisconnectResponse => Self::DISCONNECT_RESPONSE,
            Self::Unrecognized { name, .. } => name,
        }
    }
}

fn decode<T: DeserializeOwned>(payload: &Value) -> Result<T, serde_json::Error> {
    T::deserialize(payload)
}

/// Fire-and-forget commands a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientCommand {
    ConnectMqtt,
    DisconnectMqtt,
}

impl ClientCommand {
    pub fn event_name(self) -> &'static str {
        match self {
            Self::ConnectMqtt => "connect_mqtt",
            Self::DisconnectMqtt => "disconnect_mqtt",
        }
    }

    /// Name of the server event that answers this command.
    pub fn response_name(self) -> &'static str {
        match self {
            Self::ConnectMqtt => ServerEvent::CONNECT_RESPONSE,
            Self::DisconnectMqtt => ServerEvent::DISCONNECT_RESPONSE,
        }
    }
}

/// State of the WebSocket link itself (not the server's MQTT link).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportState {
    Connected,
    Disconnected { reason: String },
}

/// Everything the event socket broadcasts to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Transport(TransportState),
    Server(ServerEvent),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn maps_site_status_update() {
        let event = ServerEvent::from_parts(
            "site_status_update",
            Some(json!({"sites": [{
                "site_id": "S01", "alert_level": 0, "color": "#10b981",
                "received": ["GSM-1", "GSM-2", "ESP"], "missing": [],
                "total_expected": 3, "total_received": 3
            }]})),
        );
        let ServerEvent::SiteStatusUpdate(sites) = event else {
            panic!("expected site status update");
        };
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].site_id, "S01");
    }

    #[test]
    fn clear_messages_needs_no_payload() {
        assert_eq!(
            ServerEvent::from_parts("clear_messages", None),
            ServerEvent::ClearMessages
        );
    }

    #[test]
    fn unknown_name_is_kept_verbatim() {
        let event = ServerEvent::from_parts("server_restart", Some(json!({"in": 5})));
        assert_eq!(
            event,
            ServerEvent::Unrecognized {
                name: "server_restart".into(),
                payload: json!({"in": 5}),
            }
        );
        assert_eq!(event.name(), "server_restart");
    }

    #[test]
    fn malformed_known_payload_is_unrecognized() {
        let event = ServerEvent::from_parts("mqtt_message", Some(json!({"topic": 7})));
        assert!(matches!(event, ServerEvent::Unrecognized { ref name, .. } if name == "mqtt_message"));
    }

    #[test]
    fn commands_pair_with_responses() {
        assert_eq!(ClientCommand::ConnectMqtt.event_name(), "connect_mqtt");
        assert_eq!(ClientCommand::ConnectMqtt.response_name(), "connect_response");
        assert_eq!(ClientCommand::DisconnectMqtt.event_name(), "disconnect_mqtt");
        assert_eq!(
            ClientCommand::DisconnectMqtt.response_name(),
            "disconnect_response"
        );
    }
}
