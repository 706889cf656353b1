//! Engine.IO v4 / Socket.IO v4 text framing.
//!
//! Every WebSocket text frame is one Engine.IO packet: a single type digit
//! followed by its data. Engine.IO `message` packets (`4`) carry a
//! Socket.IO packet, which has the shape
//!
//! ```text
//! <type>[<attachments>-][/<namespace>,][<ack id>][<json>]
//! ```
//!
//! Only the text subset the monitoring server uses is supported: no binary
//! attachments, no acknowledgements from our side.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

/// Namespace every server event is published on.
pub const DEFAULT_NAMESPACE: &str = "/";

// ── Engine.IO ────────────────────────────────────────────────────────

/// Handshake data sent by the server in the `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// One Engine.IO packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(OpenInfo),
    Close,
    Ping,
    Pong,
    /// Payload is a Socket.IO packet in text form.
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, Error> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| Error::Protocol("empty Engine.IO frame".into()))?;
        let data = chars.as_str();

        match kind {
            '0' => serde_json::from_str(data)
                .map(Self::Open)
                .map_err(|e| Error::Protocol(format!("invalid open packet: {e}"))),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping),
            '3' => Ok(Self::Pong),
            '4' => Ok(Self::Message(data.to_owned())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(Error::Protocol(format!(
                "unknown Engine.IO packet type {other:?}"
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            // Clients never send `open`; encode it for completeness of the codec.
            Self::Open(info) => format!(
                "0{{\"sid\":{},\"pingInterval\":{},\"pingTimeout\":{}}}",
                Value::String(info.sid.clone()),
                info.ping_interval,
                info.ping_timeout
            ),
            Self::Close => "1".into(),
            Self::Ping => "2".into(),
            Self::Pong => "3".into(),
            Self::Message(body) => format!("4{body}"),
            Self::Upgrade => "5".into(),
            Self::Noop => "6".into(),
        }
    }
}

// ── Socket.IO ────────────────────────────────────────────────────────

/// One Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect { sid: Option<String> },
    Disconnect,
    Event { name: String, payload: Option<Value> },
    Ack { id: u64 },
    ConnectError { message: String },
}

/// A decoded Socket.IO packet together with the namespace it targets.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketMessage {
    pub namespace: String,
    pub packet: SocketPacket,
}

impl SocketMessage {
    pub fn is_default_namespace(&self) -> bool {
        self.namespace == DEFAULT_NAMESPACE
    }

    pub fn decode(text: &str) -> Result<Self, Error> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| Error::Protocol("empty Socket.IO packet".into()))?;
        let mut rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            return Err(Error::Protocol("binary Socket.IO packets are not supported".into()));
        }

        let namespace = if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or(rest.len());
            let nsp = &rest[..end];
            rest = rest.get(end + 1..).unwrap_or("");
            nsp.to_owned()
        } else {
            DEFAULT_NAMESPACE.to_owned()
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let ack_id = if digits > 0 {
            rest[..digits].parse::<u64>().ok()
        } else {
            None
        };
        rest = &rest[digits..];

        let packet = match kind {
            '0' => SocketPacket::Connect {
                sid: parse_json(rest)?
                    .and_then(|v| v.get("sid").and_then(Value::as_str).map(String::from)),
            },
            '1' => SocketPacket::Disconnect,
            '2' => decode_event(rest)?,
            '3' => SocketPacket::Ack {
                id: ack_id.ok_or_else(|| Error::Protocol("ack packet without id".into()))?,
            },
            '4' => SocketPacket::ConnectError {
                message: match parse_json(rest)? {
                    Some(Value::String(s)) => s,
                    Some(v) => v
                        .get("message")
                        .and_then(Value::as_str)
                        .map_or_else(|| v.to_string(), String::from),
                    None => "connection refused".into(),
                },
            },
            other => {
                return Err(Error::Protocol(format!(
                    "unknown Socket.IO packet type {other:?}"
                )));
            }
        };

        Ok(Self { namespace, packet })
    }
}

impl SocketPacket {
    /// Encode for the default namespace, without the Engine.IO prefix.
    pub fn encode(&self) -> String {
        match self {
            Self::Connect { .. } => "0".into(),
            Self::Disconnect => "1".into(),
            Self::Event { name, payload } => {
                let mut items = vec![Value::String(name.clone())];
                if let Some(payload) = payload {
                    items.push(payload.clone());
                }
                format!("2{}", Value::Array(items))
            }
            Self::Ack { id } => format!("3{id}[]"),
            Self::ConnectError { message } => {
                format!("4{}", serde_json::json!({ "message": message }))
            }
        }
    }
}

/// Frame text for emitting a named event on the default namespace.
pub fn encode_event(name: &str, payload: Option<Value>) -> String {
    EnginePacket::Message(
        SocketPacket::Event {
            name: name.to_owned(),
            payload,
        }
        .encode(),
    )
    .encode()
}

/// Frame text for joining the default namespace.
pub fn encode_connect() -> String {
    EnginePacket::Message(SocketPacket::Connect { sid: None }.encode()).encode()
}

fn parse_json(text: &str) -> Result<Option<Value>, Error> {
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|e| Error::Protocol(format!("invalid packet JSON: {e}")))
}

fn decode_event(text: &str) -> Result<SocketPacket, Error> {
    let Some(Value::Array(mut items)) = parse_json(text)? else {
        return Err(Error::Protocol("event packet is not a JSON array".into()));
    };
    if items.is_empty() {
        return Err(Error::Protocol("event packet without a name".into()));
    }
    let name = match items.remove(0) {
        Value::String(name) => name,
        other => {
            return Err(Error::Protocol(format!("event name is not a string: {other}")));
        }
    };
    let payload = if items.is_empty() {
        None
    } else {
        Some(items.remove(0))
    };
    Ok(SocketPacket::Event { name, payload })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_open_handshake() {
        let frame = r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let EnginePacket::Open(info) = EnginePacket::decode(frame).unwrap() else {
            panic!("expected open packet");
        };
        assert_eq!(info.sid, "abc");
        assert_eq!(info.ping_interval, 25_000);
        assert_eq!(info.ping_timeout, 20_000);
    }

    #[test]
    fn ping_is_answered_with_pong_frame() {
        assert_eq!(EnginePacket::decode("2").unwrap(), EnginePacket::Ping);
        assert_eq!(EnginePacket::Pong.encode(), "3");
    }

    #[test]
    fn decodes_named_event_with_payload() {
        let EnginePacket::Message(body) =
            EnginePacket::decode(r#"42["mqtt_message",{"topic":"PING-WATCH","payload":"S01/ESP","timestamp":"t"}]"#)
                .unwrap()
        else {
            panic!("expected message packet");
        };
        let msg = SocketMessage::decode(&body).unwrap();
        assert!(msg.is_default_namespace());
        assert_eq!(
            msg.packet,
            SocketPacket::Event {
                name: "mqtt_message".into(),
                payload: Some(json!({"topic":"PING-WATCH","payload":"S01/ESP","timestamp":"t"})),
            }
        );
    }

    #[test]
    fn decodes_event_without_payload() {
        let msg = SocketMessage::decode(r#"2["clear_messages"]"#).unwrap();
        assert_eq!(
            msg.packet,
            SocketPacket::Event {
                name: "clear_messages".into(),
                payload: None,
            }
        );
    }

    #[test]
    fn keeps_namespace_and_skips_ack_id() {
        let msg = SocketMessage::decode(r#"2/admin,12["stats",{"n":1}]"#).unwrap();
        assert_eq!(msg.namespace, "/admin");
        assert!(!msg.is_default_namespace());
        assert!(matches!(msg.packet, SocketPacket::Event { ref name, .. } if name == "stats"));
    }

    #[test]
    fn connect_ack_carries_sid() {
        let msg = SocketMessage::decode(r#"0{"sid":"xyz"}"#).unwrap();
        assert_eq!(msg.packet, SocketPacket::Connect { sid: Some("xyz".into()) });
    }

    #[test]
    fn connect_error_message_is_extracted() {
        let msg = SocketMessage::decode(r#"4{"message":"Not authorized"}"#).unwrap();
        assert_eq!(
            msg.packet,
            SocketPacket::ConnectError {
                message: "Not authorized".into()
            }
        );
    }

    #[test]
    fn encodes_client_frames() {
        assert_eq!(encode_connect(), "40");
        assert_eq!(encode_event("connect_mqtt", None), r#"42["connect_mqtt"]"#);
        assert_eq!(
            encode_event("note", Some(json!({"a": 1}))),
            r#"42["note",{"a":1}]"#
        );
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(EnginePacket::decode("").is_err());
        assert!(EnginePacket::decode("9").is_err());
        assert!(SocketMessage::decode("2not json").is_err());
        assert!(SocketMessage::decode(r#"2[42]"#).is_err());
        assert!(SocketMessage::decode("51-[\"bin\"]").is_err());
    }
}
